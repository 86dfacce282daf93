// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # Checkpoint glue
//!
//! Export is a pure snapshot of the graph. Import always decodes into a fresh
//! substrate first and only swaps it in once the whole snapshot has been
//! validated, so a failed import leaves the current graph untouched.
//!
//! Region behaviors are not serialized. On import, behaviors whose region id
//! and name both survive are kept; the rest are dropped.

use crate::brain::HypergraphBrain;
use crate::config::SubstrateConfig;
use crate::error::{BrainError, Result};
use crate::region::Region;
use ahash::{AHashMap, AHashSet};
use hyperbrain_connectome_serialization::{
    decode_checkpoint, decode_graph, encode_checkpoint, encode_graph, CheckpointSnapshot,
    ConnectomeError, GraphSnapshot, RegionRecord,
};
use hyperbrain_npu_neural::{clamp_weight, Synapse};
use std::path::Path;
use tracing::{info, warn};

/// Provenance of an imported checkpoint
#[derive(Debug, Clone, PartialEq)]
pub struct CheckpointInfo {
    pub format_version: u32,
    pub created_at: u64,
    pub creator: String,
    pub description: String,
    pub metadata: AHashMap<String, String>,
}

impl HypergraphBrain {
    /// Snapshot regions, neurons and synapses
    pub fn export_graph(&self) -> GraphSnapshot {
        let regions = self
            .regions
            .values()
            .map(|region| RegionRecord {
                id: region.id(),
                name: region.name().to_string(),
                kind: region.kind(),
                activation_pattern: region.activation_pattern(),
                neuron_params: region.neuron_params(),
                neurons: region.neurons().to_vec(),
            })
            .collect();

        let mut synapses: Vec<Synapse> = self.synapses.values().cloned().collect();
        synapses.sort_unstable_by_key(|s| s.id);

        GraphSnapshot {
            regions,
            synapses,
            tick_count: self.tick_count,
            next_region_id: self.next_region_id,
            next_neuron_id: self.next_neuron_id,
            next_synapse_id: self.next_synapse_id,
        }
    }

    /// Raw graph buffer (no provenance, never compressed)
    pub fn export_graph_bytes(&self) -> Result<Vec<u8>> {
        Ok(encode_graph(&self.export_graph())?)
    }

    /// Replace the graph with one decoded from [`HypergraphBrain::export_graph_bytes`] output
    pub fn import_graph_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        let graph = decode_graph(bytes)?;
        let fresh = Self::from_graph(self.config, graph)?;
        self.replace_with(fresh);
        Ok(())
    }

    /// Build a checkpoint record of the current graph
    pub fn create_checkpoint(&self, creator: &str, description: &str) -> CheckpointSnapshot {
        CheckpointSnapshot::new(self.export_graph(), creator, description)
    }

    /// Versioned checkpoint buffer with provenance and metadata
    pub fn export_checkpoint(
        &self,
        creator: &str,
        description: &str,
        metadata: &[(&str, &str)],
    ) -> Result<Vec<u8>> {
        let mut checkpoint = self.create_checkpoint(creator, description);
        for (key, value) in metadata {
            checkpoint.metadata.insert(key.to_string(), value.to_string());
        }
        Ok(encode_checkpoint(&checkpoint)?)
    }

    /// Replace the graph with the one in a checkpoint buffer
    pub fn import_checkpoint(&mut self, bytes: &[u8]) -> Result<CheckpointInfo> {
        let checkpoint = decode_checkpoint(bytes)?;
        self.restore_checkpoint(checkpoint)
    }

    pub fn save_checkpoint<P: AsRef<Path>>(
        &self,
        path: P,
        creator: &str,
        description: &str,
    ) -> Result<()> {
        let bytes = self.export_checkpoint(creator, description, &[])?;
        std::fs::write(path.as_ref(), bytes).map_err(ConnectomeError::from)?;
        info!(
            target: "hyperbrain-substrate",
            "Saved checkpoint to {} ({} regions, {} synapses)",
            path.as_ref().display(),
            self.regions.len(),
            self.synapses.len()
        );
        Ok(())
    }

    pub fn load_checkpoint<P: AsRef<Path>>(&mut self, path: P) -> Result<CheckpointInfo> {
        let bytes = std::fs::read(path.as_ref()).map_err(ConnectomeError::from)?;
        let info = self.import_checkpoint(&bytes)?;
        info!(
            target: "hyperbrain-substrate",
            "Loaded checkpoint from {} (created by '{}')",
            path.as_ref().display(),
            info.creator
        );
        Ok(info)
    }

    fn restore_checkpoint(&mut self, checkpoint: CheckpointSnapshot) -> Result<CheckpointInfo> {
        let CheckpointSnapshot {
            format_version,
            created_at,
            creator,
            description,
            graph,
            metadata,
        } = checkpoint;
        let fresh = Self::from_graph(self.config, graph)?;
        self.replace_with(fresh);
        Ok(CheckpointInfo {
            format_version,
            created_at,
            creator,
            description,
            metadata,
        })
    }

    /// Construct a new substrate from a graph snapshot, validating every reference
    pub fn from_graph(config: SubstrateConfig, graph: GraphSnapshot) -> Result<Self> {
        let corrupt = |msg: String| BrainError::CorruptSnapshot(msg);
        let mut brain = HypergraphBrain::new(config);

        for record in graph.regions {
            if record.name.trim().is_empty() {
                return Err(corrupt(format!("{} has an empty name", record.id)));
            }
            if brain.regions.contains_key(&record.id) {
                return Err(corrupt(format!("duplicate {}", record.id)));
            }
            if brain.region_names.contains_key(&record.name) {
                return Err(corrupt(format!("duplicate region name '{}'", record.name)));
            }
            let mut region = Region::new(
                record.id,
                record.name.clone(),
                record.kind,
                record.activation_pattern,
                record.neuron_params,
            );
            for mut neuron in record.neurons {
                let id = neuron.id();
                if brain.neuron_owner.insert(id, record.id).is_some() {
                    return Err(corrupt(format!("{} owned by more than one region", id)));
                }
                neuron.set_activation(neuron.activation());
                brain.next_neuron_id = brain.next_neuron_id.max(id.0 + 1);
                region.push_neuron(neuron);
            }
            brain.next_region_id = brain.next_region_id.max(record.id.0 + 1);
            brain.region_names.insert(record.name, record.id);
            brain.regions.insert(record.id, region);
        }

        let mut seen = AHashSet::with_capacity(graph.synapses.len());
        let mut synapses = graph.synapses;
        synapses.sort_unstable_by_key(|s| s.id);
        for mut synapse in synapses {
            if !seen.insert(synapse.id) {
                return Err(corrupt(format!("duplicate {}", synapse.id)));
            }
            if synapse.source == synapse.target {
                return Err(corrupt(format!("{} is a self-connection", synapse.id)));
            }
            if brain.pair_index.contains_key(&(synapse.source, synapse.target)) {
                return Err(corrupt(format!(
                    "{} duplicates the pair {} → {}",
                    synapse.id, synapse.source, synapse.target
                )));
            }
            let source_region = brain.neuron_region(synapse.source).ok_or_else(|| {
                corrupt(format!("{} references missing {}", synapse.id, synapse.source))
            })?;
            let target_region = brain.neuron_region(synapse.target).ok_or_else(|| {
                corrupt(format!("{} references missing {}", synapse.id, synapse.target))
            })?;
            synapse.weight = clamp_weight(synapse.weight);
            brain.next_synapse_id = brain.next_synapse_id.max(synapse.id.0 + 1);
            brain.insert_synapse(synapse, source_region, target_region);
        }

        brain.tick_count = graph.tick_count;
        brain.next_region_id = brain.next_region_id.max(graph.next_region_id);
        brain.next_neuron_id = brain.next_neuron_id.max(graph.next_neuron_id);
        brain.next_synapse_id = brain.next_synapse_id.max(graph.next_synapse_id);
        Ok(brain)
    }

    /// Swap in a freshly built graph, keeping config and compatible behaviors
    fn replace_with(&mut self, mut fresh: HypergraphBrain) {
        let behaviors = std::mem::take(&mut self.behaviors);
        let mut dropped = 0;
        for (id, behavior) in behaviors {
            let old_name = self.regions.get(&id).map(|r| r.name().to_string());
            let same_region = fresh
                .regions
                .get(&id)
                .map(|r| Some(r.name().to_string()) == old_name)
                .unwrap_or(false);
            if same_region {
                fresh.behaviors.insert(id, behavior);
            } else {
                dropped += 1;
            }
        }
        if dropped > 0 {
            warn!(
                target: "hyperbrain-substrate",
                "Dropped {} region behaviors whose region is absent from the imported graph",
                dropped
            );
        }
        fresh.config = self.config;
        *self = fresh;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::brain::SynapseSpec;
    use hyperbrain_npu_neural::{ActivationPattern, NeuronId, RegionKind, SynapseType};

    fn small_brain() -> HypergraphBrain {
        let mut brain = HypergraphBrain::default();
        let a = brain
            .create_region("a", RegionKind::Cortical, ActivationPattern::Asynchronous, 2)
            .unwrap();
        let b = brain
            .create_region("b", RegionKind::Subcortical, ActivationPattern::Sparse, 2)
            .unwrap();
        let src = brain.region(a).unwrap().neuron_ids();
        let dst = brain.region(b).unwrap().neuron_ids();
        brain
            .connect_neurons(src[0], dst[1], SynapseSpec::new(0.25, SynapseType::Inhibitory))
            .unwrap();
        brain
    }

    #[test]
    fn test_graph_bytes_roundtrip() {
        let brain = small_brain();
        let bytes = brain.export_graph_bytes().unwrap();
        let mut restored = HypergraphBrain::default();
        restored.import_graph_bytes(&bytes).unwrap();
        assert_eq!(restored.export_graph(), brain.export_graph());
    }

    #[test]
    fn test_ids_continue_after_import() {
        let brain = small_brain();
        let bytes = brain.export_checkpoint("test", "ids", &[]).unwrap();
        let mut restored = HypergraphBrain::default();
        restored.import_checkpoint(&bytes).unwrap();
        let c = restored
            .create_region("c", RegionKind::Special, ActivationPattern::Layered, 1)
            .unwrap();
        assert_eq!(c.0, 2);
        assert_eq!(restored.region(c).unwrap().neurons()[0].id(), NeuronId(4));
    }

    #[test]
    fn test_dangling_synapse_rejected() {
        let mut graph = small_brain().export_graph();
        graph.synapses[0].target = NeuronId(77);
        let result = HypergraphBrain::from_graph(SubstrateConfig::default(), graph);
        assert!(matches!(result, Err(BrainError::CorruptSnapshot(_))));
    }

    #[test]
    fn test_failed_import_leaves_target_untouched() {
        let mut brain = small_brain();
        let before = brain.export_graph();
        assert!(brain.import_checkpoint(b"definitely not a checkpoint").is_err());
        assert_eq!(brain.export_graph(), before);
    }
}
