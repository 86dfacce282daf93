// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Aggregate views over the substrate

use hyperbrain_npu_neural::RegionId;
use serde::{Deserialize, Serialize};

/// Whole-substrate summary
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BrainStatistics {
    pub region_count: usize,
    pub neuron_count: usize,
    pub synapse_count: usize,
    pub total_activation: f64,
    pub mean_activation: f32,
    pub firing_count: usize,
    pub mean_weight: f32,
    pub tick_count: u64,
}

/// Per-region summary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionStats {
    pub region_id: RegionId,
    pub name: String,
    pub neuron_count: usize,
    pub mean_activation: f32,
    pub firing_count: usize,
    pub outgoing_synapses: usize,
    pub incoming_synapses: usize,
    /// Outgoing synapses that land in another region
    pub inter_region_synapses: usize,
}

/// Result of one [`crate::HypergraphBrain::tick`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickReport {
    /// Tick index that was just processed
    pub tick: u64,
    /// Synaptic transmissions delivered during propagation
    pub transmissions: usize,
    /// Neurons that fired during dynamics
    pub fired: usize,
}
