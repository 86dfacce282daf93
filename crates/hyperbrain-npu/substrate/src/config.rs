// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

use hyperbrain_npu_neural::NeuronParameters;
use serde::{Deserialize, Serialize};

/// Runtime settings of one substrate instance
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SubstrateConfig {
    /// Parameters given to neurons of regions created without explicit ones
    pub neuron_params: NeuronParameters,
    /// Upper bound on neurons owned by one region
    pub max_neurons_per_region: usize,
}

impl Default for SubstrateConfig {
    fn default() -> Self {
        Self {
            neuron_params: NeuronParameters::default(),
            max_neurons_per_region: 1_000_000,
        }
    }
}
