// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Per-region neuron dynamics
//!
//! Every pattern first integrates pending input and decay for all neurons,
//! then decides who fires:
//!
//! | Pattern                  | Firing rule                                            |
//! |--------------------------|--------------------------------------------------------|
//! | Asynchronous, Layered    | each neuron at or above threshold                      |
//! | Synchronous              | as above; if anyone fired, everyone at ≥ ½ threshold   |
//! | Oscillatory              | threshold × (1 + A·sin(ω·tick))                        |
//! | Competitive              | only the most active neuron at or above threshold      |
//! | Sparse                   | the top `SPARSE_FIRING_FRACTION` of candidates         |

use crate::region::Region;
use hyperbrain_npu_neural::ActivationPattern;

/// Fraction of a sparse region allowed to fire per tick (at least one neuron)
pub const SPARSE_FIRING_FRACTION: f32 = 0.1;

const OSCILLATION_AMPLITUDE: f32 = 0.25;
const OSCILLATION_RATE: f32 = 0.2;
const SYNCHRONY_RATIO: f32 = 0.5;

impl Region {
    /// Advance every neuron by one tick. Returns the number of neurons that fired.
    pub(crate) fn process(&mut self, tick: u64, delta_time: f32) -> usize {
        let pattern = self.activation_pattern();
        let neurons = self.neurons_mut();
        for neuron in neurons.iter_mut() {
            neuron.integrate(delta_time);
        }

        let mut fired = 0;
        match pattern {
            ActivationPattern::Asynchronous | ActivationPattern::Layered => {
                for neuron in neurons.iter_mut() {
                    if neuron.activation() >= neuron.threshold {
                        neuron.fire(tick);
                        fired += 1;
                    }
                }
            }
            ActivationPattern::Synchronous => {
                let any_above = neurons.iter().any(|n| n.activation() >= n.threshold);
                if any_above {
                    for neuron in neurons.iter_mut() {
                        if neuron.activation() >= neuron.threshold * SYNCHRONY_RATIO {
                            neuron.fire(tick);
                            fired += 1;
                        }
                    }
                }
            }
            ActivationPattern::Oscillatory => {
                let modulation =
                    1.0 + OSCILLATION_AMPLITUDE * (tick as f32 * OSCILLATION_RATE).sin();
                for neuron in neurons.iter_mut() {
                    if neuron.activation() >= neuron.threshold * modulation {
                        neuron.fire(tick);
                        fired += 1;
                    }
                }
            }
            ActivationPattern::Competitive => {
                let winner = neurons
                    .iter()
                    .enumerate()
                    .filter(|(_, n)| n.activation() >= n.threshold)
                    .max_by(|(_, a), (_, b)| a.activation().total_cmp(&b.activation()))
                    .map(|(i, _)| i);
                if let Some(i) = winner {
                    neurons[i].fire(tick);
                    fired = 1;
                }
            }
            ActivationPattern::Sparse => {
                let mut candidates: Vec<usize> = neurons
                    .iter()
                    .enumerate()
                    .filter(|(_, n)| n.activation() >= n.threshold)
                    .map(|(i, _)| i)
                    .collect();
                let budget = ((neurons.len() as f32 * SPARSE_FIRING_FRACTION).ceil() as usize).max(1);
                candidates.sort_by(|&a, &b| {
                    neurons[b].activation().total_cmp(&neurons[a].activation())
                });
                candidates.truncate(budget);
                for i in candidates {
                    neurons[i].fire(tick);
                    fired += 1;
                }
            }
        }
        fired
    }
}
