// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*!
ConnectivityManager - probabilistic region-to-region wiring.

The manager keeps a registry of region names, a library of named connection
patterns and a record per wired region pair. The neurons and synapses live in
the [`HypergraphBrain`]; every wiring call borrows it mutably, so wiring and
ticking can never overlap on the same substrate.

## Wiring a region pair

```text
validate params ─► resolve both regions ─► plan (source, target, weight) pairs
      ─► reserve adjacency capacity ─► connect_neurons per pair
      ─► append/update RegionConnection ─► bump synapse counter
```

Everything that can be rejected is rejected before the first synapse is
created. Pairs that are already connected are skipped and not counted.
*/

use super::connection::{strength, ConnectivityStatistics, RegionConnection};
use super::parameters::{default_patterns, ConnectionParameters};
use super::sampling::{sample_targets, sample_weight};
use crate::rng::make_rng;
use crate::types::{BduError, BduResult};
use ahash::AHashMap;
use hyperbrain_npu_neural::{NeuronId, RegionId};
use hyperbrain_npu_substrate::{ConnectOutcome, HypergraphBrain, SynapseSpec};
use parking_lot::{Mutex, RwLock};
use rand::rngs::StdRng;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, info};

/// A planned synapse: source, target, weight
type PlannedPair = (NeuronId, NeuronId, f32);

pub struct ConnectivityManager {
    pub(crate) regions: RwLock<AHashMap<String, RegionId>>,
    pub(crate) patterns: RwLock<AHashMap<String, ConnectionParameters>>,
    pub(crate) connections: Mutex<Vec<RegionConnection>>,
    pub(crate) total_synapses: AtomicU64,
    pub(crate) next_connection_id: AtomicU64,
    rng: Mutex<StdRng>,
}

impl std::fmt::Debug for ConnectivityManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectivityManager")
            .field("regions", &self.regions.read().len())
            .field("patterns", &self.patterns.read().len())
            .field("connections", &self.connections.lock().len())
            .field("total_synapses", &self.total_synapses())
            .finish()
    }
}

impl Default for ConnectivityManager {
    fn default() -> Self {
        Self::new()
    }
}

impl ConnectivityManager {
    pub fn new() -> Self {
        Self::build(None)
    }

    /// Reproducible wiring: identical calls on identical substrates yield identical graphs
    pub fn with_seed(seed: u64) -> Self {
        Self::build(Some(seed))
    }

    /// Manager preloaded with the named presets from [`default_patterns`]
    pub fn with_default_patterns(seed: Option<u64>) -> Self {
        let manager = Self::build(seed);
        {
            let mut patterns = manager.patterns.write();
            for (name, params) in default_patterns() {
                patterns.insert(name.to_string(), params);
            }
        }
        manager
    }

    fn build(seed: Option<u64>) -> Self {
        Self {
            regions: RwLock::new(AHashMap::new()),
            patterns: RwLock::new(AHashMap::new()),
            connections: Mutex::new(Vec::new()),
            total_synapses: AtomicU64::new(0),
            next_connection_id: AtomicU64::new(0),
            rng: Mutex::new(make_rng(seed)),
        }
    }

    // ---------------------------------------------------------------------
    // Region registry
    // ---------------------------------------------------------------------

    /// Register (or re-point) a region name
    pub fn register_region(&self, name: &str, id: RegionId) {
        self.regions.write().insert(name.to_string(), id);
    }

    /// Register every region currently in the substrate. Returns how many were registered.
    pub fn register_regions_from(&self, brain: &HypergraphBrain) -> usize {
        let mut regions = self.regions.write();
        let mut count = 0;
        for region in brain.regions() {
            regions.insert(region.name().to_string(), region.id());
            count += 1;
        }
        count
    }

    pub fn unregister_region(&self, name: &str) -> Option<RegionId> {
        self.regions.write().remove(name)
    }

    pub fn registered_region(&self, name: &str) -> Option<RegionId> {
        self.regions.read().get(name).copied()
    }

    pub fn registered_regions(&self) -> Vec<(String, RegionId)> {
        let mut regions: Vec<_> = self
            .regions
            .read()
            .iter()
            .map(|(name, id)| (name.clone(), *id))
            .collect();
        regions.sort_by_key(|(_, id)| *id);
        regions
    }

    // ---------------------------------------------------------------------
    // Patterns
    // ---------------------------------------------------------------------

    pub fn register_pattern(&self, name: &str, params: ConnectionParameters) -> BduResult<()> {
        params.validate()?;
        self.patterns.write().insert(name.to_string(), params);
        Ok(())
    }

    pub fn pattern(&self, name: &str) -> Option<ConnectionParameters> {
        self.patterns.read().get(name).cloned()
    }

    pub fn pattern_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.patterns.read().keys().cloned().collect();
        names.sort();
        names
    }

    // ---------------------------------------------------------------------
    // Wiring
    // ---------------------------------------------------------------------

    /// Wire `source` onto `target`. Returns the number of newly created synapses.
    pub fn connect_regions(
        &self,
        brain: &mut HypergraphBrain,
        source: &str,
        target: &str,
        params: &ConnectionParameters,
    ) -> BduResult<usize> {
        params.validate()?;
        let source_id = self.resolve(brain, source)?;
        let target_id = self.resolve(brain, target)?;

        let source_neurons = region_neurons(brain, source_id, source)?;
        let target_neurons = region_neurons(brain, target_id, target)?;
        let plan = self.plan(params, source_id == target_id, &source_neurons, &target_neurons);

        reserve_capacity(brain, &plan, source_id, target_id)?;

        let spec = SynapseSpec::new(0.0, params.synapse_type)
            .with_plasticity(params.plasticity_rule, params.plasticity_rate);
        let mut created = 0usize;
        let mut weight_sum = 0.0f64;
        for &(pre, post, weight) in &plan {
            let outcome = brain.connect_neurons(pre, post, SynapseSpec { weight, ..spec })?;
            if let ConnectOutcome::Created(_) = outcome {
                created += 1;
                weight_sum += weight as f64;
            }
        }
        let batch_mean = if created > 0 {
            (weight_sum / created as f64) as f32
        } else {
            0.0
        };

        let pair_space = source_neurons.len() * target_neurons.len();
        self.record_connection(
            params, source, target, source_id, target_id, created, batch_mean, pair_space,
        );
        self.total_synapses.fetch_add(created as u64, Ordering::Relaxed);

        info!(
            target: "hyperbrain-bdu",
            "Connected {} -> {} ({:?}): {} new synapses, {} planned",
            source,
            target,
            params.topology,
            created,
            plan.len()
        );
        Ok(created)
    }

    /// Wire using a registered pattern
    pub fn connect_regions_with_pattern(
        &self,
        brain: &mut HypergraphBrain,
        source: &str,
        target: &str,
        pattern: &str,
    ) -> BduResult<usize> {
        let params = self
            .pattern(pattern)
            .ok_or_else(|| BduError::UnknownPattern(pattern.to_string()))?;
        self.connect_regions(brain, source, target, &params)
    }

    fn resolve(&self, brain: &HypergraphBrain, name: &str) -> BduResult<RegionId> {
        let id = self
            .registered_region(name)
            .ok_or_else(|| BduError::UnknownRegion(name.to_string()))?;
        match brain.region(id) {
            Some(region) if region.name() == name => Ok(id),
            _ => Err(BduError::RegionNotPresent(name.to_string())),
        }
    }

    fn plan(
        &self,
        params: &ConnectionParameters,
        same_region: bool,
        sources: &[NeuronId],
        targets: &[NeuronId],
    ) -> Vec<PlannedPair> {
        let mut rng = self.rng.lock();
        let mut plan = Vec::new();
        for (index, &pre) in sources.iter().enumerate() {
            let exclude = same_region.then_some(index);
            let picks = sample_targets(
                &mut *rng,
                params,
                index,
                sources.len(),
                targets.len(),
                exclude,
            );
            for target_index in picks {
                let post = targets[target_index];
                plan.push((pre, post, sample_weight(&mut *rng, params)));
                if params.wires_both_directions() {
                    plan.push((post, pre, sample_weight(&mut *rng, params)));
                }
            }
        }
        debug!(
            target: "hyperbrain-bdu",
            "Planned {} synapses over {} sources",
            plan.len(),
            sources.len()
        );
        plan
    }

    #[allow(clippy::too_many_arguments)]
    fn record_connection(
        &self,
        params: &ConnectionParameters,
        source: &str,
        target: &str,
        source_id: RegionId,
        target_id: RegionId,
        created: usize,
        batch_mean: f32,
        pair_space: usize,
    ) {
        let mut connections = self.connections.lock();
        if let Some(existing) = connections
            .iter_mut()
            .find(|c| c.key() == (source, target, params.topology))
        {
            existing.source_id = source_id;
            existing.target_id = target_id;
            existing.absorb(created, batch_mean, pair_space);
            return;
        }
        connections.push(RegionConnection {
            id: self.next_connection_id.fetch_add(1, Ordering::Relaxed),
            source: source.to_string(),
            target: target.to_string(),
            source_id,
            target_id,
            topology: params.topology,
            synapse_count: created,
            average_weight: batch_mean,
            connection_strength: strength(created, batch_mean, pair_space),
            active: true,
            created_at: chrono::Utc::now().timestamp_millis(),
            plasticity_rate: params.plasticity_rate,
            plasticity_rule: params.plasticity_rule,
        });
    }

    // ---------------------------------------------------------------------
    // Queries
    // ---------------------------------------------------------------------

    pub fn connections(&self) -> Vec<RegionConnection> {
        self.connections.lock().clone()
    }

    pub fn connection_count(&self) -> usize {
        self.connections.lock().len()
    }

    /// Returns false when no record has this id
    pub fn set_connection_active(&self, id: u64, active: bool) -> bool {
        match self.connections.lock().iter_mut().find(|c| c.id == id) {
            Some(connection) => {
                connection.active = active;
                true
            }
            None => false,
        }
    }

    /// Synapses created through this manager
    pub fn total_synapses(&self) -> u64 {
        self.total_synapses.load(Ordering::Relaxed)
    }

    pub fn statistics(&self) -> ConnectivityStatistics {
        let connections = self.connections.lock();
        let mut stats = ConnectivityStatistics {
            total_connections: connections.len(),
            total_synapses: self.total_synapses(),
            ..Default::default()
        };
        let mut weighted = 0.0f64;
        let mut counted = 0usize;
        for connection in connections.iter() {
            if connection.active {
                stats.active_connections += 1;
            }
            *stats.by_topology.entry(connection.topology).or_insert(0) += 1;
            weighted += connection.average_weight as f64 * connection.synapse_count as f64;
            counted += connection.synapse_count;
        }
        if counted > 0 {
            stats.mean_weight = (weighted / counted as f64) as f32;
        }
        stats
    }
}

fn region_neurons(
    brain: &HypergraphBrain,
    id: RegionId,
    name: &str,
) -> BduResult<Vec<NeuronId>> {
    brain
        .region(id)
        .map(|region| region.neuron_ids())
        .ok_or_else(|| BduError::RegionNotPresent(name.to_string()))
}

/// Reserve outgoing, incoming and inter-region capacity for the whole plan
fn reserve_capacity(
    brain: &mut HypergraphBrain,
    plan: &[PlannedPair],
    source_id: RegionId,
    target_id: RegionId,
) -> BduResult<()> {
    let mut outgoing: AHashMap<NeuronId, usize> = AHashMap::new();
    let mut incoming: AHashMap<NeuronId, usize> = AHashMap::new();
    let mut forward = 0usize;
    let mut reverse = 0usize;
    for &(pre, post, _) in plan {
        *outgoing.entry(pre).or_insert(0) += 1;
        *incoming.entry(post).or_insert(0) += 1;
        if brain.neuron_region(pre) == Some(source_id) {
            forward += 1;
        } else {
            reverse += 1;
        }
    }

    for (neuron, count) in outgoing {
        brain.reserve_outgoing(neuron, count)?;
    }
    for (neuron, count) in incoming {
        brain.reserve_incoming(neuron, count)?;
    }
    if source_id == target_id {
        brain.reserve_inter_region(source_id, target_id, forward + reverse)?;
    } else {
        brain.reserve_inter_region(source_id, target_id, forward)?;
        if reverse > 0 {
            brain.reserve_inter_region(target_id, source_id, reverse)?;
        }
    }
    Ok(())
}
