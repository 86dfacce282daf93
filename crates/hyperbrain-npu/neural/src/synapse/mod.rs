// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Synaptic primitives
//!
//! A synapse never owns its endpoints: it stores the source and target
//! `NeuronId` and the substrate resolves them (or reports them gone).

pub mod contribution;
pub mod weight;

pub use contribution::*;
pub use weight::*;

use crate::types::{NeuronId, SynapseId};
use serde::{Deserialize, Serialize};

/// Synapse type (excitatory or inhibitory)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum SynapseType {
    #[default]
    Excitatory = 0,
    Inhibitory = 1,
}

impl SynapseType {
    /// +1.0 for excitatory, -1.0 for inhibitory
    #[inline(always)]
    pub fn sign(self) -> f32 {
        match self {
            SynapseType::Excitatory => 1.0,
            SynapseType::Inhibitory => -1.0,
        }
    }
}

/// Learning rule a synapse participates in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PlasticityRule {
    /// Weight is frozen
    None,
    /// Correlation-based (pre × post activation)
    #[default]
    Hebbian,
    /// Spike-timing-dependent
    Stdp,
    /// Hebbian and STDP deltas summed
    Hybrid,
}

impl PlasticityRule {
    pub fn uses_correlation(self) -> bool {
        matches!(self, PlasticityRule::Hebbian | PlasticityRule::Hybrid)
    }

    pub fn uses_timing(self) -> bool {
        matches!(self, PlasticityRule::Stdp | PlasticityRule::Hybrid)
    }
}

/// A weighted, typed, directed edge between two neurons
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Synapse {
    pub id: SynapseId,
    pub source: NeuronId,
    pub target: NeuronId,
    /// Magnitude in [`WEIGHT_MIN`, `WEIGHT_MAX`]; the sign comes from `synapse_type`
    pub weight: f32,
    pub synapse_type: SynapseType,
    pub plasticity_rule: PlasticityRule,
    /// Per-synapse scale applied on top of the learning system's global rates
    pub learning_rate: f32,
    /// Creation time (unix milliseconds)
    pub created_at: u64,
}

impl Synapse {
    pub fn new(
        id: SynapseId,
        source: NeuronId,
        target: NeuronId,
        weight: f32,
        synapse_type: SynapseType,
    ) -> Self {
        Self {
            id,
            source,
            target,
            weight: clamp_weight(weight),
            synapse_type,
            plasticity_rule: PlasticityRule::default(),
            learning_rate: 1.0,
            created_at: unix_millis(),
        }
    }

    pub fn with_plasticity(mut self, rule: PlasticityRule, learning_rate: f32) -> Self {
        self.plasticity_rule = rule;
        self.learning_rate = learning_rate.max(0.0);
        self
    }

    /// Current delivered by this synapse for a presynaptic activation
    #[inline(always)]
    pub fn transmit(&self, pre_activation: f32) -> f32 {
        compute_synaptic_contribution(self.weight, pre_activation, self.synapse_type)
    }

    /// Apply a weight delta, keeping the weight inside the legal range.
    /// Returns the delta actually applied.
    pub fn adjust_weight(&mut self, delta: f32) -> f32 {
        let before = self.weight;
        self.weight = clamp_weight(self.weight + delta);
        self.weight - before
    }
}

pub(crate) fn unix_millis() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn synapse(weight: f32, synapse_type: SynapseType) -> Synapse {
        Synapse::new(SynapseId(1), NeuronId(1), NeuronId(2), weight, synapse_type)
    }

    #[test]
    fn test_new_clamps_weight() {
        assert_eq!(synapse(4.0, SynapseType::Excitatory).weight, WEIGHT_MAX);
        assert_eq!(synapse(-1.0, SynapseType::Excitatory).weight, WEIGHT_MIN);
    }

    #[test]
    fn test_transmit_sign() {
        let exc = synapse(0.5, SynapseType::Excitatory);
        let inh = synapse(0.5, SynapseType::Inhibitory);
        assert!((exc.transmit(1.0) - 0.5).abs() < 1e-6);
        assert!((inh.transmit(1.0) + 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_adjust_weight_reports_applied_delta() {
        let mut syn = synapse(0.95, SynapseType::Excitatory);
        let applied = syn.adjust_weight(0.2);
        assert!((applied - 0.05).abs() < 1e-6);
        assert_eq!(syn.weight, WEIGHT_MAX);
    }

    #[test]
    fn test_rule_flags() {
        assert!(PlasticityRule::Hybrid.uses_correlation());
        assert!(PlasticityRule::Hybrid.uses_timing());
        assert!(!PlasticityRule::None.uses_correlation());
        assert!(PlasticityRule::Stdp.uses_timing());
    }

    #[test]
    fn test_rule_json_names() {
        let json = serde_json::to_string(&PlasticityRule::Stdp).unwrap();
        assert_eq!(json, "\"stdp\"");
    }
}
