// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Correlation (Hebbian) rule
//!
//! Co-active pairs potentiate by `rate * pre * post`. A presynaptic neuron
//! that spikes while its target stays silent depresses the synapse by
//! `rate * depression_ratio * pre`.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HebbianConfig {
    pub rate: f32,
    pub depression_ratio: f32,
    /// Outputs below this count as silent
    pub activity_threshold: f32,
}

impl Default for HebbianConfig {
    fn default() -> Self {
        Self {
            rate: 0.05,
            depression_ratio: 0.1,
            activity_threshold: 0.05,
        }
    }
}

/// Weight change for one pre/post output pair
#[inline]
pub fn hebbian_weight_change(pre: f32, post: f32, config: &HebbianConfig) -> f32 {
    let pre_active = pre >= config.activity_threshold;
    let post_active = post >= config.activity_threshold;
    match (pre_active, post_active) {
        (true, true) => config.rate * pre * post,
        (true, false) => -config.rate * config.depression_ratio * pre,
        _ => 0.0,
    }
}
