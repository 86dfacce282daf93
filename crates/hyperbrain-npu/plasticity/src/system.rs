// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Learning system - per-tick weight updates over the whole substrate
//!
//! Each [`LearningSystem::update`] visits every synapse once:
//!
//! - `Hebbian` synapses follow the correlation rule on pre/post outputs
//! - `Stdp` synapses follow the timing rule on last-spike ticks
//! - `Hybrid` synapses get both
//! - `None` synapses are left alone
//!
//! Persistence is optional and best-effort. Opening or writing the store can
//! fail; such failures are logged here and never reach the caller, never
//! skip a weight update and never change the statistics.

use crate::config::{LearningConfig, Result};
use crate::hebbian::hebbian_weight_change;
use crate::motivation::{MotivationSignal, MotivationTracker};
use crate::stdp::{compute_stdp_weight_change, spike_pair_dt};
use ahash::AHashSet;
use hyperbrain_npu_neural::{NeuronId, PlasticityRule};
use hyperbrain_npu_substrate::HypergraphBrain;
use hyperbrain_state_manager::{shared, LearningStatsRecord, MemoryDb, PersistenceHandle, RunId};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info, warn};

/// Cumulative learning statistics
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct LearningStatistics {
    /// Completed [`LearningSystem::update`] calls
    pub update_cycles: u64,
    /// Synapse weight changes actually applied
    pub total_updates: u64,
    pub potentiation_events: u64,
    pub depression_events: u64,
    pub mean_abs_weight_change: f32,
    pub motivation: MotivationSignal,
}

/// Outcome of one update cycle
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LearningUpdate {
    pub synapses_updated: usize,
    pub potentiated: usize,
    pub depressed: usize,
    pub motivation: f32,
}

pub struct LearningSystem {
    config: LearningConfig,
    stats: LearningStatistics,
    abs_change_sum: f64,
    motivation: MotivationTracker,
    persistence: Option<(PersistenceHandle, RunId)>,
    persistence_failures: u64,
}

impl std::fmt::Debug for LearningSystem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LearningSystem")
            .field("config", &self.config)
            .field("stats", &self.stats)
            .field("persistence", &self.persistence.as_ref().map(|(_, run)| *run))
            .finish()
    }
}

impl Default for LearningSystem {
    fn default() -> Self {
        Self::from_valid(LearningConfig::default())
    }
}

impl LearningSystem {
    pub fn new(config: LearningConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::from_valid(config))
    }

    fn from_valid(config: LearningConfig) -> Self {
        Self {
            config,
            stats: LearningStatistics::default(),
            abs_change_sum: 0.0,
            motivation: MotivationTracker::default(),
            persistence: None,
            persistence_failures: 0,
        }
    }

    pub fn config(&self) -> &LearningConfig {
        &self.config
    }

    pub fn statistics(&self) -> LearningStatistics {
        self.stats
    }

    /// Last intrinsic motivation signal (zero when disabled)
    pub fn motivation(&self) -> MotivationSignal {
        self.motivation.last()
    }

    // ---------------------------------------------------------------------
    // Persistence
    // ---------------------------------------------------------------------

    /// Open a MemoryDB at `path` and start a run on it.
    ///
    /// Returns false (and logs) when the store cannot be opened; the system
    /// keeps working without persistence.
    pub fn attach_persistence_path<P: AsRef<Path>>(&mut self, path: P, label: &str) -> bool {
        let path = path.as_ref();
        let handle = match MemoryDb::open(path) {
            Ok(db) => shared(db),
            Err(e) => {
                warn!(
                    target: "hyperbrain-plasticity",
                    "Learning persistence unavailable at {}: {}; continuing without it",
                    path.display(),
                    e
                );
                self.persistence_failures += 1;
                return false;
            }
        };
        let run = handle.lock().begin_run(label);
        match run {
            Ok(run) => {
                info!(
                    target: "hyperbrain-plasticity",
                    "Learning statistics persisted to {} as {}",
                    path.display(),
                    run
                );
                self.persistence = Some((handle, run));
                true
            }
            Err(e) => {
                warn!(
                    target: "hyperbrain-plasticity",
                    "Could not begin a run in {}: {}; continuing without persistence",
                    path.display(),
                    e
                );
                self.persistence_failures += 1;
                false
            }
        }
    }

    /// Use an already-open store and run
    pub fn attach_persistence(&mut self, handle: PersistenceHandle, run: RunId) {
        self.persistence = Some((handle, run));
    }

    pub fn detach_persistence(&mut self) -> Option<(PersistenceHandle, RunId)> {
        self.persistence.take()
    }

    pub fn has_persistence(&self) -> bool {
        self.persistence.is_some()
    }

    /// Open or write failures seen so far
    pub fn persistence_failures(&self) -> u64 {
        self.persistence_failures
    }

    // ---------------------------------------------------------------------
    // Learning
    // ---------------------------------------------------------------------

    /// Apply one learning pass to every plastic synapse
    pub fn update(&mut self, brain: &mut HypergraphBrain) -> LearningUpdate {
        // Spikes from the tick that just finished carry the previous tick index
        let now = brain.tick_count().checked_sub(1);
        let hebbian = self.config.hebbian;
        let stdp = self.config.stdp;

        let mut outcome = LearningUpdate::default();
        let mut abs_sum = 0.0f64;
        brain.visit_synapses_mut(|synapse, pre, post| {
            let rule = synapse.plasticity_rule;
            if rule == PlasticityRule::None || synapse.learning_rate == 0.0 {
                return;
            }
            let mut delta = 0.0f32;
            if rule.uses_correlation() {
                delta += hebbian_weight_change(pre.output(), post.output(), &hebbian);
            }
            if rule.uses_timing() {
                if let Some(now) = now {
                    if let Some(dt) =
                        spike_pair_dt(pre.last_spike_tick(), post.last_spike_tick(), now, &stdp)
                    {
                        delta += compute_stdp_weight_change(dt, &stdp);
                    }
                }
            }
            if delta == 0.0 {
                return;
            }
            let applied = synapse.adjust_weight(delta * synapse.learning_rate);
            if applied == 0.0 {
                return;
            }
            outcome.synapses_updated += 1;
            if applied > 0.0 {
                outcome.potentiated += 1;
            } else {
                outcome.depressed += 1;
            }
            abs_sum += applied.abs() as f64;
        });

        if self.config.motivation.enabled {
            let (firing, neuron_count) = firing_set(brain);
            outcome.motivation = self
                .motivation
                .observe(&self.config.motivation, firing, neuron_count)
                .value;
        }

        self.record(&outcome, abs_sum);
        self.maybe_persist(brain.tick_count());
        debug!(
            target: "hyperbrain-plasticity",
            "Learning cycle {}: {} synapses updated (+{} / -{})",
            self.stats.update_cycles,
            outcome.synapses_updated,
            outcome.potentiated,
            outcome.depressed
        );
        outcome
    }

    fn record(&mut self, outcome: &LearningUpdate, abs_sum: f64) {
        self.stats.update_cycles += 1;
        self.stats.total_updates += outcome.synapses_updated as u64;
        self.stats.potentiation_events += outcome.potentiated as u64;
        self.stats.depression_events += outcome.depressed as u64;
        self.abs_change_sum += abs_sum;
        if self.stats.total_updates > 0 {
            self.stats.mean_abs_weight_change =
                (self.abs_change_sum / self.stats.total_updates as f64) as f32;
        }
        self.stats.motivation = self.motivation.last();
    }

    fn maybe_persist(&mut self, tick: u64) {
        let interval = self.config.persist_interval;
        if interval == 0 || self.stats.update_cycles % interval != 0 {
            return;
        }
        let Some((handle, run)) = &self.persistence else {
            return;
        };
        let record = LearningStatsRecord {
            run_id: *run,
            tick,
            total_updates: self.stats.total_updates,
            potentiation_events: self.stats.potentiation_events,
            depression_events: self.stats.depression_events,
            mean_abs_weight_change: self.stats.mean_abs_weight_change,
            intrinsic_motivation: self.stats.motivation.value,
            recorded_at: chrono::Utc::now().timestamp_millis(),
        };
        let result = handle.lock().record_learning_stats(record);
        if let Err(e) = result {
            self.persistence_failures += 1;
            warn!(
                target: "hyperbrain-plasticity",
                "Failed to persist learning statistics at tick {}: {}",
                tick,
                e
            );
        }
    }
}

fn firing_set(brain: &HypergraphBrain) -> (AHashSet<NeuronId>, usize) {
    let mut firing = AHashSet::new();
    let mut count = 0;
    for region in brain.regions() {
        count += region.neuron_count();
        firing.extend(
            region
                .neurons()
                .iter()
                .filter(|n| n.is_firing())
                .map(|n| n.id()),
        );
    }
    (firing, count)
}
