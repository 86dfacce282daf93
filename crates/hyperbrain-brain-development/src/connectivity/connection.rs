// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Records describing wired region pairs

use super::parameters::TopologyType;
use hyperbrain_npu_neural::{PlasticityRule, RegionId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One wired (source, target, topology) triple.
///
/// Repeated wiring of the same triple updates the existing record instead of
/// appending a new one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionConnection {
    pub id: u64,
    pub source: String,
    pub target: String,
    pub source_id: RegionId,
    pub target_id: RegionId,
    pub topology: TopologyType,
    pub synapse_count: usize,
    pub average_weight: f32,
    /// `synapse_count * average_weight / (source_len * target_len)`
    pub connection_strength: f32,
    pub active: bool,
    /// Unix milliseconds
    pub created_at: i64,
    pub plasticity_rate: f32,
    pub plasticity_rule: PlasticityRule,
}

/// Keys of a serialized [`RegionConnection`]
pub(crate) const CONNECTION_FIELDS: &[&str] = &[
    "id",
    "source",
    "target",
    "source_id",
    "target_id",
    "topology",
    "synapse_count",
    "average_weight",
    "connection_strength",
    "active",
    "created_at",
    "plasticity_rate",
    "plasticity_rule",
];

impl RegionConnection {
    pub fn key(&self) -> (&str, &str, TopologyType) {
        (&self.source, &self.target, self.topology)
    }

    /// Fold a new batch of synapses into the running average
    pub(crate) fn absorb(&mut self, added: usize, batch_mean: f32, pair_space: usize) {
        let total = self.synapse_count + added;
        if total > 0 {
            self.average_weight = (self.average_weight * self.synapse_count as f32
                + batch_mean * added as f32)
                / total as f32;
        }
        self.synapse_count = total;
        self.connection_strength = strength(total, self.average_weight, pair_space);
    }
}

pub(crate) fn strength(count: usize, average_weight: f32, pair_space: usize) -> f32 {
    if pair_space == 0 {
        0.0
    } else {
        count as f32 * average_weight / pair_space as f32
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConnectivityStatistics {
    pub total_connections: usize,
    pub active_connections: usize,
    pub total_synapses: u64,
    /// Synapse-weighted mean over all connection records
    pub mean_weight: f32,
    pub by_topology: BTreeMap<TopologyType, usize>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> RegionConnection {
        RegionConnection {
            id: 0,
            source: "a".into(),
            target: "b".into(),
            source_id: RegionId(0),
            target_id: RegionId(1),
            topology: TopologyType::Feedforward,
            synapse_count: 0,
            average_weight: 0.0,
            connection_strength: 0.0,
            active: true,
            created_at: 0,
            plasticity_rate: 0.01,
            plasticity_rule: PlasticityRule::Hebbian,
        }
    }

    #[test]
    fn test_absorb_weights_running_mean() {
        let mut conn = record();
        conn.absorb(2, 0.4, 10);
        conn.absorb(2, 0.8, 10);
        assert_eq!(conn.synapse_count, 4);
        assert!((conn.average_weight - 0.6).abs() < 1e-6);
        assert!((conn.connection_strength - 0.24).abs() < 1e-6);
    }

    #[test]
    fn test_absorb_nothing_keeps_average() {
        let mut conn = record();
        conn.absorb(0, 0.0, 0);
        assert_eq!(conn.average_weight, 0.0);
        assert_eq!(conn.connection_strength, 0.0);
    }
}
