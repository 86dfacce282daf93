// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # Leaky activation neuron
//!
//! ```text
//! Per tick:
//!     A(t+1) = clamp(A(t) × (1 − decay × dt) + I_syn, 0, 1)
//!
//! Firing check:
//!     if A(t+1) ≥ threshold:
//!         FIRE, remember the tick, reset A to 0
//! ```
//!
//! A firing neuron outputs 1.0 for the tick it fired; otherwise it outputs its
//! (sub-threshold) activation.

use crate::types::{NeuralError, NeuronId, Result};
use serde::{Deserialize, Serialize};

/// Lower bound of neuron activation
pub const ACTIVATION_MIN: f32 = 0.0;
/// Upper bound of neuron activation
pub const ACTIVATION_MAX: f32 = 1.0;

/// Construction parameters shared by every neuron of a region
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NeuronParameters {
    /// Fraction of activation lost per unit of time
    pub decay_rate: f32,
    /// Activation at or above which the neuron fires
    pub threshold: f32,
}

impl NeuronParameters {
    pub fn validate(&self) -> Result<()> {
        if !self.decay_rate.is_finite() || self.decay_rate < 0.0 {
            return Err(NeuralError::InvalidParameter {
                name: "decay_rate".to_string(),
                reason: format!("must be finite and >= 0, got {}", self.decay_rate),
            });
        }
        if !self.threshold.is_finite() || self.threshold <= 0.0 {
            return Err(NeuralError::InvalidParameter {
                name: "threshold".to_string(),
                reason: format!("must be finite and > 0, got {}", self.threshold),
            });
        }
        Ok(())
    }
}

impl Default for NeuronParameters {
    fn default() -> Self {
        Self {
            decay_rate: 0.1,
            threshold: 0.5,
        }
    }
}

/// A single neuron-like unit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Neuron {
    id: NeuronId,
    activation: f32,
    pub decay_rate: f32,
    pub threshold: f32,
    firing: bool,
    last_spike_tick: Option<u64>,
    #[serde(skip)]
    pending_input: f32,
}

impl Neuron {
    pub fn new(id: NeuronId, params: NeuronParameters) -> Self {
        Self {
            id,
            activation: 0.0,
            decay_rate: params.decay_rate.max(0.0),
            threshold: params.threshold,
            firing: false,
            last_spike_tick: None,
            pending_input: 0.0,
        }
    }

    #[inline]
    pub fn id(&self) -> NeuronId {
        self.id
    }

    #[inline]
    pub fn activation(&self) -> f32 {
        self.activation
    }

    #[inline]
    pub fn is_firing(&self) -> bool {
        self.firing
    }

    #[inline]
    pub fn last_spike_tick(&self) -> Option<u64> {
        self.last_spike_tick
    }

    /// Signal seen by downstream synapses and by correlation learning
    #[inline]
    pub fn output(&self) -> f32 {
        if self.firing {
            ACTIVATION_MAX
        } else {
            self.activation
        }
    }

    pub fn set_activation(&mut self, value: f32) {
        self.activation = clamp_activation(value);
    }

    /// Accumulate input to be integrated on the next [`Neuron::update`]
    #[inline]
    pub fn receive(&mut self, input: f32) {
        if input.is_finite() {
            self.pending_input += input;
        }
    }

    #[inline]
    pub fn pending_input(&self) -> f32 {
        self.pending_input
    }

    /// Integrate pending input, decay, and check for firing. Returns whether it fired.
    pub fn update(&mut self, tick: u64, delta_time: f32) -> bool {
        if self.integrate(delta_time) >= self.threshold {
            self.fire(tick);
        }
        self.firing
    }

    /// Apply decay and pending input without a firing decision.
    ///
    /// Clears the firing flag; callers that implement their own firing policy
    /// follow up with [`Neuron::fire`].
    pub fn integrate(&mut self, delta_time: f32) -> f32 {
        let retention = (1.0 - self.decay_rate * delta_time.max(0.0)).clamp(0.0, 1.0);
        self.activation = clamp_activation(self.activation * retention + self.pending_input);
        self.pending_input = 0.0;
        self.firing = false;
        self.activation
    }

    /// Emit a spike at `tick` and return to rest
    pub fn fire(&mut self, tick: u64) {
        self.firing = true;
        self.last_spike_tick = Some(tick);
        self.activation = ACTIVATION_MIN;
    }

    /// Return to the resting state, keeping identity and parameters
    pub fn reset(&mut self) {
        self.activation = ACTIVATION_MIN;
        self.firing = false;
        self.pending_input = 0.0;
        self.last_spike_tick = None;
    }
}

#[inline]
fn clamp_activation(value: f32) -> f32 {
    if value.is_nan() {
        return ACTIVATION_MIN;
    }
    value.clamp(ACTIVATION_MIN, ACTIVATION_MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn neuron() -> Neuron {
        Neuron::new(NeuronId(1), NeuronParameters::default())
    }

    #[test]
    fn test_fires_above_threshold() {
        let mut n = neuron();
        n.receive(0.8);
        assert!(n.update(3, 0.1));
        assert!(n.is_firing());
        assert_eq!(n.last_spike_tick(), Some(3));
        assert_eq!(n.output(), ACTIVATION_MAX);
        assert_eq!(n.activation(), ACTIVATION_MIN);
    }

    #[test]
    fn test_subthreshold_decays() {
        let mut n = neuron();
        n.receive(0.3);
        assert!(!n.update(0, 0.1));
        let first = n.activation();
        n.update(1, 1.0);
        assert!(n.activation() < first);
        assert_eq!(n.last_spike_tick(), None);
    }

    #[test]
    fn test_integrate_then_fire() {
        let mut n = neuron();
        n.receive(0.2);
        assert!((n.integrate(0.1) - 0.2).abs() < 1e-6);
        assert!(!n.is_firing());
        n.fire(9);
        assert!(n.is_firing());
        assert_eq!(n.last_spike_tick(), Some(9));
    }

    #[test]
    fn test_activation_is_bounded() {
        let mut n = neuron();
        n.set_activation(7.0);
        assert_eq!(n.activation(), ACTIVATION_MAX);
        n.set_activation(-2.0);
        assert_eq!(n.activation(), ACTIVATION_MIN);
        n.receive(f32::NAN);
        assert_eq!(n.pending_input(), 0.0);
    }

    #[test]
    fn test_parameter_validation() {
        assert!(NeuronParameters::default().validate().is_ok());
        let bad = NeuronParameters {
            decay_rate: -1.0,
            threshold: 0.5,
        };
        assert!(matches!(
            bad.validate(),
            Err(NeuralError::InvalidParameter { .. })
        ));
    }

    #[test]
    fn test_reset() {
        let mut n = neuron();
        n.receive(1.0);
        n.update(0, 0.1);
        n.reset();
        assert!(!n.is_firing());
        assert_eq!(n.last_spike_tick(), None);
    }
}
