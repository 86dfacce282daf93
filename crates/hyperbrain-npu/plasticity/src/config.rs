// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

use crate::hebbian::HebbianConfig;
use crate::motivation::MotivationConfig;
use crate::stdp::StdpConfig;
use serde::{Deserialize, Serialize};

#[derive(Debug, thiserror::Error)]
pub enum PlasticityError {
    #[error("Invalid learning parameter {name}: {reason}")]
    InvalidConfig { name: &'static str, reason: String },
}

pub type Result<T> = std::result::Result<T, PlasticityError>;

/// Learning system configuration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LearningConfig {
    pub hebbian: HebbianConfig,
    pub stdp: StdpConfig,
    pub motivation: MotivationConfig,
    /// Persist a statistics record every N update cycles (0 disables)
    pub persist_interval: u64,
}

impl Default for LearningConfig {
    fn default() -> Self {
        Self {
            hebbian: HebbianConfig::default(),
            stdp: StdpConfig::default(),
            motivation: MotivationConfig::default(),
            persist_interval: 100,
        }
    }
}

impl LearningConfig {
    pub fn validate(&self) -> Result<()> {
        let non_negative = [
            ("hebbian.rate", self.hebbian.rate),
            ("hebbian.depression_ratio", self.hebbian.depression_ratio),
            ("hebbian.activity_threshold", self.hebbian.activity_threshold),
            ("stdp.a_plus", self.stdp.a_plus),
            ("stdp.a_minus", self.stdp.a_minus),
            ("motivation.prediction_error_weight", self.motivation.prediction_error_weight),
            ("motivation.novelty_weight", self.motivation.novelty_weight),
            ("motivation.uncertainty_weight", self.motivation.uncertainty_weight),
        ];
        for (name, value) in non_negative {
            if !(value.is_finite() && value >= 0.0) {
                return Err(PlasticityError::InvalidConfig {
                    name,
                    reason: format!("must be finite and >= 0, got {}", value),
                });
            }
        }
        for (name, value) in [("stdp.tau_pre", self.stdp.tau_pre), ("stdp.tau_post", self.stdp.tau_post)] {
            if !(value.is_finite() && value > 0.0) {
                return Err(PlasticityError::InvalidConfig {
                    name,
                    reason: format!("must be > 0, got {}", value),
                });
            }
        }
        let smoothing = self.motivation.prediction_smoothing;
        if !(smoothing > 0.0 && smoothing <= 1.0) {
            return Err(PlasticityError::InvalidConfig {
                name: "motivation.prediction_smoothing",
                reason: format!("must be in (0, 1], got {}", smoothing),
            });
        }
        Ok(())
    }
}
