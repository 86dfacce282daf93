// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # HypergraphBrain
//!
//! Owns every region, the synapse store and the id allocators.
//!
//! ```text
//! regions:      RegionId  → Region (neurons + adjacency views)
//! synapses:     SynapseId → Synapse
//! pair_index:   (source, target) → SynapseId      at most one synapse per ordered pair
//! neuron_owner: NeuronId  → RegionId              resolves synapse endpoints
//! ```
//!
//! Synapses refer to neurons by id; a lookup through `neuron_owner` either
//! resolves the neuron or reports it gone.

use crate::behavior::RegionBehavior;
use crate::config::SubstrateConfig;
use crate::error::{BrainError, Result};
use crate::region::Region;
use crate::statistics::{BrainStatistics, RegionStats};
use ahash::AHashMap;
use hyperbrain_npu_neural::{
    ActivationPattern, Neuron, NeuronId, NeuronParameters, PlasticityRule, RegionId,
    RegionKind, Synapse, SynapseId, SynapseType,
};
use hyperbrain_state_manager::{PersistenceHandle, RunId};
use std::collections::BTreeMap;
use tracing::{debug, info};

/// Properties of a synapse to create
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SynapseSpec {
    pub weight: f32,
    pub synapse_type: SynapseType,
    pub plasticity_rule: PlasticityRule,
    pub learning_rate: f32,
}

impl SynapseSpec {
    pub fn new(weight: f32, synapse_type: SynapseType) -> Self {
        Self {
            weight,
            synapse_type,
            ..Default::default()
        }
    }

    pub fn with_plasticity(mut self, rule: PlasticityRule, learning_rate: f32) -> Self {
        self.plasticity_rule = rule;
        self.learning_rate = learning_rate;
        self
    }
}

impl Default for SynapseSpec {
    fn default() -> Self {
        Self {
            weight: 0.5,
            synapse_type: SynapseType::Excitatory,
            plasticity_rule: PlasticityRule::default(),
            learning_rate: 1.0,
        }
    }
}

/// Outcome of an idempotent connect request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectOutcome {
    Created(SynapseId),
    /// The ordered pair was already connected; nothing changed
    Existing(SynapseId),
}

impl ConnectOutcome {
    pub fn synapse_id(self) -> SynapseId {
        match self {
            ConnectOutcome::Created(id) | ConnectOutcome::Existing(id) => id,
        }
    }

    pub fn is_new(self) -> bool {
        matches!(self, ConnectOutcome::Created(_))
    }
}

pub struct HypergraphBrain {
    pub(crate) config: SubstrateConfig,
    pub(crate) regions: BTreeMap<RegionId, Region>,
    pub(crate) region_names: AHashMap<String, RegionId>,
    pub(crate) behaviors: BTreeMap<RegionId, Box<dyn RegionBehavior>>,
    pub(crate) synapses: AHashMap<SynapseId, Synapse>,
    pub(crate) pair_index: AHashMap<(NeuronId, NeuronId), SynapseId>,
    pub(crate) neuron_owner: AHashMap<NeuronId, RegionId>,
    pub(crate) next_region_id: u32,
    pub(crate) next_neuron_id: u64,
    pub(crate) next_synapse_id: u64,
    pub(crate) tick_count: u64,
}

impl Default for HypergraphBrain {
    fn default() -> Self {
        Self::new(SubstrateConfig::default())
    }
}

impl std::fmt::Debug for HypergraphBrain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HypergraphBrain")
            .field("regions", &self.regions.len())
            .field("neurons", &self.neuron_owner.len())
            .field("synapses", &self.synapses.len())
            .field("behaviors", &self.behaviors.len())
            .field("tick_count", &self.tick_count)
            .finish()
    }
}

impl HypergraphBrain {
    pub fn new(config: SubstrateConfig) -> Self {
        Self {
            config,
            regions: BTreeMap::new(),
            region_names: AHashMap::new(),
            behaviors: BTreeMap::new(),
            synapses: AHashMap::new(),
            pair_index: AHashMap::new(),
            neuron_owner: AHashMap::new(),
            next_region_id: 0,
            next_neuron_id: 0,
            next_synapse_id: 0,
            tick_count: 0,
        }
    }

    pub fn config(&self) -> &SubstrateConfig {
        &self.config
    }

    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    // ---------------------------------------------------------------------
    // Regions
    // ---------------------------------------------------------------------

    /// Create a region populated with `neuron_count` neurons using the default parameters
    pub fn create_region(
        &mut self,
        name: &str,
        kind: RegionKind,
        pattern: ActivationPattern,
        neuron_count: usize,
    ) -> Result<RegionId> {
        let params = self.config.neuron_params;
        self.create_region_with_params(name, kind, pattern, neuron_count, params)
    }

    pub fn create_region_with_params(
        &mut self,
        name: &str,
        kind: RegionKind,
        pattern: ActivationPattern,
        neuron_count: usize,
        params: NeuronParameters,
    ) -> Result<RegionId> {
        if name.trim().is_empty() {
            return Err(BrainError::InvalidParameter {
                name: "name",
                reason: "region name must not be empty".to_string(),
            });
        }
        if self.region_names.contains_key(name) {
            return Err(BrainError::DuplicateRegionName(name.to_string()));
        }
        self.check_capacity(0, neuron_count)?;
        params.validate()?;

        let id = RegionId(self.next_region_id);
        self.next_region_id += 1;

        let mut region = Region::new(id, name.to_string(), kind, pattern, params);
        for _ in 0..neuron_count {
            let neuron_id = self.allocate_neuron_id();
            region.push_neuron(Neuron::new(neuron_id, params));
            self.neuron_owner.insert(neuron_id, id);
        }
        self.regions.insert(id, region);
        self.region_names.insert(name.to_string(), id);

        info!(
            target: "hyperbrain-substrate",
            "Created region '{}' ({}, {:?}, {} neurons)",
            name,
            id,
            pattern,
            neuron_count
        );
        Ok(id)
    }

    /// Grow a region by `count` neurons, returning the new ids
    pub fn add_neurons(&mut self, region_id: RegionId, count: usize) -> Result<Vec<NeuronId>> {
        let current = self
            .regions
            .get(&region_id)
            .ok_or(BrainError::RegionNotFound(region_id))?
            .neuron_count();
        self.check_capacity(current, count)?;

        let ids: Vec<NeuronId> = (0..count).map(|_| self.allocate_neuron_id()).collect();
        let region = self
            .regions
            .get_mut(&region_id)
            .ok_or(BrainError::RegionNotFound(region_id))?;
        let params = region.neuron_params();
        for &id in &ids {
            region.push_neuron(Neuron::new(id, params));
            self.neuron_owner.insert(id, region_id);
        }
        Ok(ids)
    }

    fn check_capacity(&self, current: usize, additional: usize) -> Result<()> {
        let limit = self.config.max_neurons_per_region;
        if current.saturating_add(additional) > limit {
            return Err(BrainError::InvalidParameter {
                name: "neuron_count",
                reason: format!(
                    "{} + {} exceeds the per-region limit of {}",
                    current, additional, limit
                ),
            });
        }
        Ok(())
    }

    fn allocate_neuron_id(&mut self) -> NeuronId {
        let id = NeuronId(self.next_neuron_id);
        self.next_neuron_id += 1;
        id
    }

    pub fn region(&self, id: RegionId) -> Option<&Region> {
        self.regions.get(&id)
    }

    pub fn region_by_name(&self, name: &str) -> Option<&Region> {
        self.region_names
            .get(name)
            .and_then(|id| self.regions.get(id))
    }

    pub fn region_id(&self, name: &str) -> Option<RegionId> {
        self.region_names.get(name).copied()
    }

    /// Regions in id order
    pub fn regions(&self) -> impl Iterator<Item = &Region> {
        self.regions.values()
    }

    pub fn region_count(&self) -> usize {
        self.regions.len()
    }

    /// Mutable access to the neurons of one region
    pub fn region_neurons_mut(&mut self, id: RegionId) -> Option<&mut [Neuron]> {
        self.regions.get_mut(&id).map(Region::neurons_mut)
    }

    /// Remove a region, its neurons, its behavior and every synapse touching it.
    /// Returns the number of synapses removed.
    pub fn remove_region(&mut self, id: RegionId) -> Result<usize> {
        let region = self
            .regions
            .remove(&id)
            .ok_or(BrainError::RegionNotFound(id))?;

        let mut removed = 0;
        for synapse_id in region.touching_synapses() {
            if let Some(synapse) = self.synapses.remove(&synapse_id) {
                self.pair_index.remove(&(synapse.source, synapse.target));
                // The removed region's own views go with it; only the other side needs unlinking
                self.unlink_views(&synapse);
                removed += 1;
            }
        }
        for neuron in region.neurons() {
            self.neuron_owner.remove(&neuron.id());
        }
        self.region_names.remove(region.name());
        self.behaviors.remove(&id);

        info!(
            target: "hyperbrain-substrate",
            "Removed region '{}' ({} neurons, {} synapses)",
            region.name(),
            region.neuron_count(),
            removed
        );
        Ok(removed)
    }

    /// Attach a behavior to a region, returning the one it replaces
    pub fn set_region_behavior(
        &mut self,
        id: RegionId,
        behavior: Box<dyn RegionBehavior>,
    ) -> Result<Option<Box<dyn RegionBehavior>>> {
        if !self.regions.contains_key(&id) {
            return Err(BrainError::RegionNotFound(id));
        }
        Ok(self.behaviors.insert(id, behavior))
    }

    pub fn take_region_behavior(&mut self, id: RegionId) -> Option<Box<dyn RegionBehavior>> {
        self.behaviors.remove(&id)
    }

    pub fn has_region_behavior(&self, id: RegionId) -> bool {
        self.behaviors.contains_key(&id)
    }

    /// Hand a persistence handle to every attached behavior
    pub fn attach_persistence(&mut self, handle: &PersistenceHandle, run: RunId) {
        for behavior in self.behaviors.values_mut() {
            behavior.attach_persistence(handle.clone(), run);
        }
        debug!(
            target: "hyperbrain-substrate",
            "Attached persistence for {} to {} region behaviors",
            run,
            self.behaviors.len()
        );
    }

    // ---------------------------------------------------------------------
    // Neurons
    // ---------------------------------------------------------------------

    pub fn neuron(&self, id: NeuronId) -> Option<&Neuron> {
        let region = self.neuron_owner.get(&id)?;
        self.regions.get(region)?.neuron(id)
    }

    pub fn neuron_mut(&mut self, id: NeuronId) -> Option<&mut Neuron> {
        let region = self.neuron_owner.get(&id)?;
        self.regions.get_mut(region)?.neuron_mut(id)
    }

    pub fn neuron_region(&self, id: NeuronId) -> Option<RegionId> {
        self.neuron_owner.get(&id).copied()
    }

    pub fn neuron_count(&self) -> usize {
        self.neuron_owner.len()
    }

    /// Queue external input on one neuron; it is integrated on the next tick
    pub fn inject(&mut self, neuron: NeuronId, amount: f32) -> Result<()> {
        if !amount.is_finite() {
            return Err(BrainError::InvalidParameter {
                name: "amount",
                reason: format!("must be finite, got {}", amount),
            });
        }
        self.neuron_mut(neuron)
            .ok_or(BrainError::NeuronNotFound(neuron))?
            .receive(amount);
        Ok(())
    }

    /// Queue the same input on every neuron of a region. Returns the neuron count.
    pub fn stimulate_region(&mut self, region: RegionId, amount: f32) -> Result<usize> {
        if !amount.is_finite() {
            return Err(BrainError::InvalidParameter {
                name: "amount",
                reason: format!("must be finite, got {}", amount),
            });
        }
        let neurons = self
            .region_neurons_mut(region)
            .ok_or(BrainError::RegionNotFound(region))?;
        for neuron in neurons.iter_mut() {
            neuron.receive(amount);
        }
        Ok(neurons.len())
    }

    /// Return every neuron to rest; the graph is untouched
    pub fn reset_activity(&mut self) {
        for region in self.regions.values_mut() {
            for neuron in region.neurons_mut() {
                neuron.reset();
            }
        }
    }

    // ---------------------------------------------------------------------
    // Synapses
    // ---------------------------------------------------------------------

    /// Connect `source` to `target`.
    ///
    /// Idempotent per ordered pair: if the pair is already connected the
    /// existing synapse is returned unchanged and no adjacency view grows.
    pub fn connect_neurons(
        &mut self,
        source: NeuronId,
        target: NeuronId,
        spec: SynapseSpec,
    ) -> Result<ConnectOutcome> {
        if let Some(&existing) = self.pair_index.get(&(source, target)) {
            return Ok(ConnectOutcome::Existing(existing));
        }
        if source == target {
            return Err(BrainError::SelfConnection(source));
        }
        if !spec.weight.is_finite() || !spec.learning_rate.is_finite() || spec.learning_rate < 0.0 {
            return Err(BrainError::InvalidParameter {
                name: "synapse",
                reason: format!(
                    "weight {} / learning rate {} must be finite, rate >= 0",
                    spec.weight, spec.learning_rate
                ),
            });
        }
        let source_region = self
            .neuron_region(source)
            .ok_or(BrainError::NeuronNotFound(source))?;
        let target_region = self
            .neuron_region(target)
            .ok_or(BrainError::NeuronNotFound(target))?;

        let id = SynapseId(self.next_synapse_id);
        self.next_synapse_id += 1;
        let synapse = Synapse::new(id, source, target, spec.weight, spec.synapse_type)
            .with_plasticity(spec.plasticity_rule, spec.learning_rate);
        self.insert_synapse(synapse, source_region, target_region);
        Ok(ConnectOutcome::Created(id))
    }

    /// Store a synapse and record it in all three views. Endpoints must be resolved.
    pub(crate) fn insert_synapse(
        &mut self,
        synapse: Synapse,
        source_region: RegionId,
        target_region: RegionId,
    ) {
        let (id, source, target) = (synapse.id, synapse.source, synapse.target);
        if let Some(region) = self.regions.get_mut(&source_region) {
            region.link_outgoing(source, id, target_region);
        }
        if let Some(region) = self.regions.get_mut(&target_region) {
            region.link_incoming(target, id);
        }
        self.pair_index.insert((source, target), id);
        self.synapses.insert(id, synapse);
    }

    /// Remove a synapse from the views of whichever endpoint regions still exist
    fn unlink_views(&mut self, synapse: &Synapse) {
        let source_region = self.neuron_owner.get(&synapse.source).copied();
        let target_region = self.neuron_owner.get(&synapse.target).copied();
        if let (Some(src), Some(dst)) = (source_region, target_region) {
            if let Some(region) = self.regions.get_mut(&src) {
                region.unlink_outgoing(synapse.source, synapse.id, dst);
            }
        } else if let Some(src) = source_region {
            // Target already gone: its region id is only known through the source's views
            if let Some(region) = self.regions.get_mut(&src) {
                let dests: Vec<RegionId> = region.destinations().map(|(d, _)| d).collect();
                for dest in dests {
                    region.unlink_outgoing(synapse.source, synapse.id, dest);
                }
            }
        }
        if let Some(dst) = target_region {
            if let Some(region) = self.regions.get_mut(&dst) {
                region.unlink_incoming(synapse.target, synapse.id);
            }
        }
    }

    pub fn remove_synapse(&mut self, id: SynapseId) -> Result<Synapse> {
        let synapse = self
            .synapses
            .remove(&id)
            .ok_or(BrainError::SynapseNotFound(id))?;
        self.pair_index.remove(&(synapse.source, synapse.target));
        self.unlink_views(&synapse);
        Ok(synapse)
    }

    /// Remove every synapse whose weight is below `min_weight`. Returns the count.
    pub fn prune_synapses(&mut self, min_weight: f32) -> usize {
        let mut weak: Vec<SynapseId> = self
            .synapses
            .values()
            .filter(|s| s.weight < min_weight)
            .map(|s| s.id)
            .collect();
        weak.sort_unstable();
        let pruned = weak
            .into_iter()
            .filter(|&id| self.remove_synapse(id).is_ok())
            .count();
        if pruned > 0 {
            info!(
                target: "hyperbrain-substrate",
                "Pruned {} synapses below weight {}",
                pruned,
                min_weight
            );
        }
        pruned
    }

    pub fn synapse(&self, id: SynapseId) -> Option<&Synapse> {
        self.synapses.get(&id)
    }

    pub fn synapse_between(&self, source: NeuronId, target: NeuronId) -> Option<&Synapse> {
        self.pair_index
            .get(&(source, target))
            .and_then(|id| self.synapses.get(id))
    }

    pub fn synapses(&self) -> impl Iterator<Item = &Synapse> {
        self.synapses.values()
    }

    pub fn synapse_count(&self) -> usize {
        self.synapses.len()
    }

    /// Visit every synapse mutably together with its resolved endpoints.
    /// Synapses with a missing endpoint are skipped.
    pub fn visit_synapses_mut<F>(&mut self, mut visit: F)
    where
        F: FnMut(&mut Synapse, &Neuron, &Neuron),
    {
        let regions = &self.regions;
        let owners = &self.neuron_owner;
        let resolve = |id: NeuronId| owners.get(&id).and_then(|r| regions.get(r)?.neuron(id));
        for synapse in self.synapses.values_mut() {
            if let (Some(pre), Some(post)) = (resolve(synapse.source), resolve(synapse.target)) {
                visit(synapse, pre, post);
            }
        }
    }

    // ---------------------------------------------------------------------
    // Capacity reservation
    // ---------------------------------------------------------------------

    pub fn reserve_outgoing(&mut self, neuron: NeuronId, additional: usize) -> Result<()> {
        let region = self.owner_region_mut(neuron)?;
        region.reserve_outgoing(neuron, additional);
        Ok(())
    }

    pub fn reserve_incoming(&mut self, neuron: NeuronId, additional: usize) -> Result<()> {
        let region = self.owner_region_mut(neuron)?;
        region.reserve_incoming(neuron, additional);
        Ok(())
    }

    pub fn reserve_inter_region(
        &mut self,
        source: RegionId,
        destination: RegionId,
        additional: usize,
    ) -> Result<()> {
        if !self.regions.contains_key(&destination) {
            return Err(BrainError::RegionNotFound(destination));
        }
        self.regions
            .get_mut(&source)
            .ok_or(BrainError::RegionNotFound(source))?
            .reserve_inter_region(destination, additional);
        Ok(())
    }

    fn owner_region_mut(&mut self, neuron: NeuronId) -> Result<&mut Region> {
        let region = self
            .neuron_owner
            .get(&neuron)
            .copied()
            .ok_or(BrainError::NeuronNotFound(neuron))?;
        self.regions
            .get_mut(&region)
            .ok_or(BrainError::RegionNotFound(region))
    }

    // ---------------------------------------------------------------------
    // Statistics
    // ---------------------------------------------------------------------

    pub fn statistics(&self) -> BrainStatistics {
        let neuron_count = self.neuron_owner.len();
        let total_activation: f64 = self
            .regions
            .values()
            .flat_map(|r| r.neurons())
            .map(|n| n.activation() as f64)
            .sum();
        let firing_count = self.regions.values().map(Region::firing_count).sum();
        let mean_weight = if self.synapses.is_empty() {
            0.0
        } else {
            self.synapses.values().map(|s| s.weight as f64).sum::<f64>()
                / self.synapses.len() as f64
        };

        BrainStatistics {
            region_count: self.regions.len(),
            neuron_count,
            synapse_count: self.synapses.len(),
            total_activation,
            mean_activation: if neuron_count == 0 {
                0.0
            } else {
                (total_activation / neuron_count as f64) as f32
            },
            firing_count,
            mean_weight: mean_weight as f32,
            tick_count: self.tick_count,
        }
    }

    pub fn region_statistics(&self, id: RegionId) -> Option<RegionStats> {
        let region = self.regions.get(&id)?;
        Some(RegionStats {
            region_id: id,
            name: region.name().to_string(),
            neuron_count: region.neuron_count(),
            mean_activation: region.mean_activation(),
            firing_count: region.firing_count(),
            outgoing_synapses: region.outgoing_synapse_count(),
            incoming_synapses: region.incoming_synapse_count(),
            inter_region_synapses: region.inter_region_synapse_count(),
        })
    }

    /// Synapse counts per (source region, destination region), self pairs included
    pub fn inter_region_edge_counts(&self) -> BTreeMap<(RegionId, RegionId), usize> {
        self.regions
            .values()
            .flat_map(|r| r.destinations().map(move |(dest, n)| ((r.id(), dest), n)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn brain_with_two_regions() -> (HypergraphBrain, RegionId, RegionId) {
        let mut brain = HypergraphBrain::default();
        let a = brain
            .create_region("a", RegionKind::Cortical, ActivationPattern::Asynchronous, 3)
            .unwrap();
        let b = brain
            .create_region("b", RegionKind::Limbic, ActivationPattern::Asynchronous, 2)
            .unwrap();
        (brain, a, b)
    }

    fn first_neuron(brain: &HypergraphBrain, region: RegionId) -> NeuronId {
        brain.region(region).unwrap().neurons()[0].id()
    }

    #[test]
    fn test_duplicate_region_name_rejected() {
        let (mut brain, _, _) = brain_with_two_regions();
        let result = brain.create_region("a", RegionKind::Special, ActivationPattern::Sparse, 1);
        assert!(matches!(result, Err(BrainError::DuplicateRegionName(_))));
        assert_eq!(brain.region_count(), 2);
    }

    #[test]
    fn test_neuron_ids_unique_across_regions() {
        let (brain, a, b) = brain_with_two_regions();
        let mut ids = brain.region(a).unwrap().neuron_ids();
        ids.extend(brain.region(b).unwrap().neuron_ids());
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 5);
        assert_eq!(brain.neuron_count(), 5);
    }

    #[test]
    fn test_connect_is_idempotent() {
        let (mut brain, a, b) = brain_with_two_regions();
        let src = first_neuron(&brain, a);
        let dst = first_neuron(&brain, b);
        let first = brain
            .connect_neurons(src, dst, SynapseSpec::new(0.3, SynapseType::Excitatory))
            .unwrap();
        let second = brain
            .connect_neurons(src, dst, SynapseSpec::new(0.9, SynapseType::Inhibitory))
            .unwrap();

        assert!(first.is_new());
        assert_eq!(second, ConnectOutcome::Existing(first.synapse_id()));
        assert_eq!(brain.region(a).unwrap().outgoing_synapses(src).len(), 1);
        assert_eq!(brain.region(b).unwrap().incoming_synapses(dst).len(), 1);
        assert_eq!(brain.region(a).unwrap().inter_region_synapses(b).len(), 1);
        assert!((brain.synapse(first.synapse_id()).unwrap().weight - 0.3).abs() < 1e-6);
    }

    #[test]
    fn test_unknown_neuron_rejected_without_mutation() {
        let (mut brain, a, _) = brain_with_two_regions();
        let src = first_neuron(&brain, a);
        let result = brain.connect_neurons(src, NeuronId(999), SynapseSpec::default());
        assert!(matches!(result, Err(BrainError::NeuronNotFound(NeuronId(999)))));
        assert_eq!(brain.synapse_count(), 0);
        assert!(brain.region(a).unwrap().outgoing_synapses(src).is_empty());
    }

    #[test]
    fn test_remove_region_detaches_synapses() {
        let (mut brain, a, b) = brain_with_two_regions();
        let src = first_neuron(&brain, a);
        let dst = first_neuron(&brain, b);
        brain.connect_neurons(src, dst, SynapseSpec::default()).unwrap();
        brain.connect_neurons(dst, src, SynapseSpec::default()).unwrap();

        assert_eq!(brain.remove_region(b).unwrap(), 2);
        assert_eq!(brain.synapse_count(), 0);
        assert!(brain.neuron(dst).is_none());
        assert!(brain.region_id("b").is_none());
        let region_a = brain.region(a).unwrap();
        assert!(region_a.outgoing_synapses(src).is_empty());
        assert!(region_a.incoming_synapses(src).is_empty());
        assert!(region_a.inter_region_synapses(b).is_empty());
    }

    #[test]
    fn test_prune_removes_weak_synapses() {
        let (mut brain, a, b) = brain_with_two_regions();
        let sources = brain.region(a).unwrap().neuron_ids();
        let dst = first_neuron(&brain, b);
        brain
            .connect_neurons(sources[0], dst, SynapseSpec::new(0.05, SynapseType::Excitatory))
            .unwrap();
        brain
            .connect_neurons(sources[1], dst, SynapseSpec::new(0.8, SynapseType::Excitatory))
            .unwrap();

        assert_eq!(brain.prune_synapses(0.1), 1);
        assert_eq!(brain.region(b).unwrap().incoming_synapses(dst).len(), 1);
        assert!(brain.synapse_between(sources[0], dst).is_none());
    }

    #[test]
    fn test_stimulate_region_and_statistics() {
        let (mut brain, a, _) = brain_with_two_regions();
        assert_eq!(brain.stimulate_region(a, 0.2).unwrap(), 3);
        assert!(brain.inject(NeuronId(42), 1.0).is_err());
        let stats = brain.statistics();
        assert_eq!(stats.region_count, 2);
        assert_eq!(stats.neuron_count, 5);
        assert_eq!(stats.synapse_count, 0);
    }

    #[test]
    fn test_capacity_limit_enforced() {
        let mut brain = HypergraphBrain::new(SubstrateConfig {
            max_neurons_per_region: 4,
            ..Default::default()
        });
        let id = brain
            .create_region("small", RegionKind::Brainstem, ActivationPattern::Layered, 4)
            .unwrap();
        assert!(brain.add_neurons(id, 1).is_err());
        assert_eq!(brain.region(id).unwrap().neuron_count(), 4);
    }
}
