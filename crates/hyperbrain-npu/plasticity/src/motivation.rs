// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Intrinsic motivation
//!
//! A scalar computed from the substrate's own activity, with no external
//! reward:
//!
//! - prediction error: |firing fraction - running prediction|
//! - novelty: share of neurons whose firing state flipped since the last update
//! - uncertainty: binary entropy of the firing fraction (bits)

use ahash::AHashSet;
use hyperbrain_npu_neural::NeuronId;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MotivationConfig {
    pub enabled: bool,
    pub prediction_error_weight: f32,
    pub novelty_weight: f32,
    pub uncertainty_weight: f32,
    /// EMA factor of the firing-fraction prediction, in (0, 1]
    pub prediction_smoothing: f32,
}

impl Default for MotivationConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            prediction_error_weight: 0.5,
            novelty_weight: 0.3,
            uncertainty_weight: 0.2,
            prediction_smoothing: 0.1,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MotivationSignal {
    pub prediction_error: f32,
    pub novelty: f32,
    pub uncertainty: f32,
    pub value: f32,
}

#[derive(Debug, Default)]
pub(crate) struct MotivationTracker {
    prediction: Option<f32>,
    previous_firing: AHashSet<NeuronId>,
    last: MotivationSignal,
}

impl MotivationTracker {
    pub(crate) fn observe(
        &mut self,
        config: &MotivationConfig,
        firing: AHashSet<NeuronId>,
        neuron_count: usize,
    ) -> MotivationSignal {
        if neuron_count == 0 {
            self.previous_firing = firing;
            self.last = MotivationSignal::default();
            return self.last;
        }
        let fraction = firing.len() as f32 / neuron_count as f32;
        let predicted = self.prediction.unwrap_or(fraction);
        let prediction_error = (fraction - predicted).abs();
        let flipped = firing.symmetric_difference(&self.previous_firing).count();
        let novelty = (flipped as f32 / neuron_count as f32).min(1.0);
        let uncertainty = binary_entropy(fraction);

        let alpha = config.prediction_smoothing.clamp(f32::EPSILON, 1.0);
        self.prediction = Some(predicted + alpha * (fraction - predicted));
        self.previous_firing = firing;

        self.last = MotivationSignal {
            prediction_error,
            novelty,
            uncertainty,
            value: config.prediction_error_weight * prediction_error
                + config.novelty_weight * novelty
                + config.uncertainty_weight * uncertainty,
        };
        self.last
    }

    pub(crate) fn last(&self) -> MotivationSignal {
        self.last
    }
}

fn binary_entropy(p: f32) -> f32 {
    if p <= 0.0 || p >= 1.0 {
        return 0.0;
    }
    -(p * p.log2() + (1.0 - p) * (1.0 - p).log2())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(ids: &[u64]) -> AHashSet<NeuronId> {
        ids.iter().map(|&id| NeuronId(id)).collect()
    }

    #[test]
    fn test_entropy_peaks_at_half() {
        assert!((binary_entropy(0.5) - 1.0).abs() < 1e-6);
        assert_eq!(binary_entropy(0.0), 0.0);
        assert!(binary_entropy(0.1) < binary_entropy(0.4));
    }

    #[test]
    fn test_novelty_tracks_flips() {
        let config = MotivationConfig::default();
        let mut tracker = MotivationTracker::default();
        let first = tracker.observe(&config, set(&[1, 2]), 4);
        assert!((first.novelty - 0.5).abs() < 1e-6);
        assert_eq!(first.prediction_error, 0.0);

        let same = tracker.observe(&config, set(&[1, 2]), 4);
        assert_eq!(same.novelty, 0.0);

        let changed = tracker.observe(&config, set(&[3]), 4);
        assert!((changed.novelty - 0.75).abs() < 1e-6);
        assert!(changed.prediction_error > 0.0);
        assert!(changed.value > 0.0);
    }

    #[test]
    fn test_empty_substrate_is_quiet() {
        let mut tracker = MotivationTracker::default();
        let signal = tracker.observe(&MotivationConfig::default(), AHashSet::new(), 0);
        assert_eq!(signal, MotivationSignal::default());
    }
}
