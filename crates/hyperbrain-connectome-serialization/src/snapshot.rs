// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Serializable graph and checkpoint records

use ahash::AHashMap;
use hyperbrain_npu_neural::{ActivationPattern, Neuron, NeuronParameters, RegionId, RegionKind, Synapse};
use serde::{Deserialize, Serialize};

/// One region with the neurons it owns
///
/// Adjacency views are not stored: they are rebuilt from the synapse list on
/// import.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionRecord {
    pub id: RegionId,
    pub name: String,
    pub kind: RegionKind,
    pub activation_pattern: ActivationPattern,
    pub neuron_params: NeuronParameters,
    pub neurons: Vec<Neuron>,
}

/// The bare graph: regions, neurons, synapses and the id allocators
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphSnapshot {
    pub regions: Vec<RegionRecord>,
    pub synapses: Vec<Synapse>,
    pub tick_count: u64,
    pub next_region_id: u32,
    pub next_neuron_id: u64,
    pub next_synapse_id: u64,
}

impl GraphSnapshot {
    pub fn neuron_count(&self) -> usize {
        self.regions.iter().map(|r| r.neurons.len()).sum()
    }

    pub fn synapse_count(&self) -> usize {
        self.synapses.len()
    }
}

/// Graph plus provenance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckpointSnapshot {
    /// Format version the checkpoint was written with
    pub format_version: u32,

    /// When this checkpoint was created (unix milliseconds)
    pub created_at: u64,

    /// Who produced it (tool, run label, host)
    pub creator: String,

    /// Human-readable description
    pub description: String,

    pub graph: GraphSnapshot,

    /// Custom tags for organization
    pub metadata: AHashMap<String, String>,
}

impl CheckpointSnapshot {
    pub fn new(graph: GraphSnapshot, creator: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            format_version: crate::CHECKPOINT_FORMAT_VERSION,
            created_at: std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .map(|d| d.as_millis() as u64)
                .unwrap_or(0),
            creator: creator.into(),
            description: description.into(),
            graph,
            metadata: AHashMap::new(),
        }
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}
