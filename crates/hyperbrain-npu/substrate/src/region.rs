// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # Region
//!
//! A region owns a bounded set of neurons and three adjacency views over the
//! synapse store:
//!
//! ```text
//! outgoing[source neuron]       synapses leaving a neuron of this region
//! incoming[target neuron]       synapses arriving at a neuron of this region
//! inter_region[dest region]     synapses leaving this region, grouped by destination
//! ```
//!
//! The views hold `SynapseId`s only; the synapses themselves live in the
//! substrate's store. Views are mutated by the substrate alone so the three of
//! them never disagree.

use ahash::AHashMap;
use hyperbrain_npu_neural::{
    ActivationPattern, Neuron, NeuronId, NeuronParameters, RegionId, RegionKind, SynapseId,
};

#[derive(Debug, Clone)]
pub struct Region {
    id: RegionId,
    name: String,
    kind: RegionKind,
    activation_pattern: ActivationPattern,
    neuron_params: NeuronParameters,
    neurons: Vec<Neuron>,
    index: AHashMap<NeuronId, usize>,
    outgoing: AHashMap<NeuronId, Vec<SynapseId>>,
    incoming: AHashMap<NeuronId, Vec<SynapseId>>,
    inter_region: AHashMap<RegionId, Vec<SynapseId>>,
}

impl Region {
    pub(crate) fn new(
        id: RegionId,
        name: String,
        kind: RegionKind,
        activation_pattern: ActivationPattern,
        neuron_params: NeuronParameters,
    ) -> Self {
        Self {
            id,
            name,
            kind,
            activation_pattern,
            neuron_params,
            neurons: Vec::new(),
            index: AHashMap::new(),
            outgoing: AHashMap::new(),
            incoming: AHashMap::new(),
            inter_region: AHashMap::new(),
        }
    }

    pub fn id(&self) -> RegionId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> RegionKind {
        self.kind
    }

    pub fn activation_pattern(&self) -> ActivationPattern {
        self.activation_pattern
    }

    pub fn neuron_params(&self) -> NeuronParameters {
        self.neuron_params
    }

    // ---------------------------------------------------------------------
    // Neurons
    // ---------------------------------------------------------------------

    pub(crate) fn push_neuron(&mut self, neuron: Neuron) {
        self.index.insert(neuron.id(), self.neurons.len());
        self.neurons.push(neuron);
    }

    pub fn neuron_count(&self) -> usize {
        self.neurons.len()
    }

    pub fn contains_neuron(&self, id: NeuronId) -> bool {
        self.index.contains_key(&id)
    }

    pub fn neuron(&self, id: NeuronId) -> Option<&Neuron> {
        self.index.get(&id).map(|&i| &self.neurons[i])
    }

    pub fn neuron_mut(&mut self, id: NeuronId) -> Option<&mut Neuron> {
        let i = *self.index.get(&id)?;
        self.neurons.get_mut(i)
    }

    /// Neurons in allocation order
    pub fn neurons(&self) -> &[Neuron] {
        &self.neurons
    }

    pub fn neurons_mut(&mut self) -> &mut [Neuron] {
        &mut self.neurons
    }

    /// Neuron ids in allocation order (the index space used by connectivity sampling)
    pub fn neuron_ids(&self) -> Vec<NeuronId> {
        self.neurons.iter().map(Neuron::id).collect()
    }

    // ---------------------------------------------------------------------
    // Adjacency views
    // ---------------------------------------------------------------------

    pub fn outgoing_synapses(&self, neuron: NeuronId) -> &[SynapseId] {
        self.outgoing.get(&neuron).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn incoming_synapses(&self, neuron: NeuronId) -> &[SynapseId] {
        self.incoming.get(&neuron).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Synapses leaving this region towards `destination` (which may be this region)
    pub fn inter_region_synapses(&self, destination: RegionId) -> &[SynapseId] {
        self.inter_region
            .get(&destination)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Destination regions with at least one synapse from this region
    pub fn destinations(&self) -> impl Iterator<Item = (RegionId, usize)> + '_ {
        self.inter_region
            .iter()
            .filter(|(_, ids)| !ids.is_empty())
            .map(|(&dest, ids)| (dest, ids.len()))
    }

    pub fn outgoing_capacity(&self, neuron: NeuronId) -> usize {
        self.outgoing.get(&neuron).map(Vec::capacity).unwrap_or(0)
    }

    pub fn incoming_capacity(&self, neuron: NeuronId) -> usize {
        self.incoming.get(&neuron).map(Vec::capacity).unwrap_or(0)
    }

    pub fn inter_region_capacity(&self, destination: RegionId) -> usize {
        self.inter_region
            .get(&destination)
            .map(Vec::capacity)
            .unwrap_or(0)
    }

    /// Ensure room for `additional` more outgoing synapses of `neuron`
    pub(crate) fn reserve_outgoing(&mut self, neuron: NeuronId, additional: usize) {
        self.outgoing.entry(neuron).or_default().reserve(additional);
    }

    pub(crate) fn reserve_incoming(&mut self, neuron: NeuronId, additional: usize) {
        self.incoming.entry(neuron).or_default().reserve(additional);
    }

    pub(crate) fn reserve_inter_region(&mut self, destination: RegionId, additional: usize) {
        self.inter_region
            .entry(destination)
            .or_default()
            .reserve(additional);
    }

    pub(crate) fn link_outgoing(
        &mut self,
        source: NeuronId,
        synapse: SynapseId,
        destination: RegionId,
    ) {
        self.outgoing.entry(source).or_default().push(synapse);
        self.inter_region
            .entry(destination)
            .or_default()
            .push(synapse);
    }

    pub(crate) fn link_incoming(&mut self, target: NeuronId, synapse: SynapseId) {
        self.incoming.entry(target).or_default().push(synapse);
    }

    pub(crate) fn unlink_outgoing(
        &mut self,
        source: NeuronId,
        synapse: SynapseId,
        destination: RegionId,
    ) {
        if let Some(ids) = self.outgoing.get_mut(&source) {
            ids.retain(|&s| s != synapse);
        }
        if let Some(ids) = self.inter_region.get_mut(&destination) {
            ids.retain(|&s| s != synapse);
        }
    }

    pub(crate) fn unlink_incoming(&mut self, target: NeuronId, synapse: SynapseId) {
        if let Some(ids) = self.incoming.get_mut(&target) {
            ids.retain(|&s| s != synapse);
        }
    }

    /// Every synapse id touching this region (outgoing or incoming), deduplicated
    pub(crate) fn touching_synapses(&self) -> Vec<SynapseId> {
        let mut ids: Vec<SynapseId> = self
            .outgoing
            .values()
            .chain(self.incoming.values())
            .flatten()
            .copied()
            .collect();
        ids.sort_unstable();
        ids.dedup();
        ids
    }

    pub fn outgoing_synapse_count(&self) -> usize {
        self.outgoing.values().map(Vec::len).sum()
    }

    pub fn incoming_synapse_count(&self) -> usize {
        self.incoming.values().map(Vec::len).sum()
    }

    /// Outgoing synapses whose destination is another region
    pub fn inter_region_synapse_count(&self) -> usize {
        self.inter_region
            .iter()
            .filter(|(dest, _)| **dest != self.id)
            .map(|(_, ids)| ids.len())
            .sum()
    }

    pub fn mean_activation(&self) -> f32 {
        if self.neurons.is_empty() {
            return 0.0;
        }
        self.neurons.iter().map(Neuron::activation).sum::<f32>() / self.neurons.len() as f32
    }

    pub fn firing_count(&self) -> usize {
        self.neurons.iter().filter(|n| n.is_firing()).count()
    }
}
