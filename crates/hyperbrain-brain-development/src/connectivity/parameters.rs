// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*!
Declarative connection parameters and the named presets.
*/

use crate::types::{BduError, BduResult};
use hyperbrain_npu_neural::{PlasticityRule, SynapseType};
use serde::{Deserialize, Serialize};

/// Shape of a region-to-region projection
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TopologyType {
    #[default]
    Feedforward,
    Feedback,
    Lateral,
    /// Always wired in both directions
    Reciprocal,
    /// Flat sampling over the whole target
    Global,
    /// Flat sampling, meant for low probabilities
    Sparse,
    Dense,
    /// Each source only reaches the matching block of the target
    Modular,
}

/// How targets are spread around a source's mapped position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionDistribution {
    #[default]
    Uniform,
    Gaussian,
    Exponential,
    PowerLaw,
    SmallWorld,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectionParameters {
    pub topology: TopologyType,
    pub distribution: ConnectionDistribution,
    /// Fraction of the (capped) target population each source connects to
    pub connection_probability: f32,
    pub weight_mean: f32,
    pub weight_std: f32,
    /// Larger values concentrate distance-biased targets closer to the source
    pub distance_decay: f32,
    pub bidirectional: bool,
    /// Per-neuron out-degree cap; 0 means unlimited
    pub max_connections_per_neuron: usize,
    pub plasticity_rate: f32,
    pub plasticity_rule: PlasticityRule,
    pub synapse_type: SynapseType,
}

impl Default for ConnectionParameters {
    fn default() -> Self {
        Self {
            topology: TopologyType::Feedforward,
            distribution: ConnectionDistribution::Uniform,
            connection_probability: 0.1,
            weight_mean: 0.5,
            weight_std: 0.1,
            distance_decay: 0.0,
            bidirectional: false,
            max_connections_per_neuron: 0,
            plasticity_rate: 0.01,
            plasticity_rule: PlasticityRule::Hebbian,
            synapse_type: SynapseType::Excitatory,
        }
    }
}

/// Field names accepted in serialized parameters (anything else is reported)
pub(crate) const PARAMETER_FIELDS: &[&str] = &[
    "topology",
    "distribution",
    "connection_probability",
    "weight_mean",
    "weight_std",
    "distance_decay",
    "bidirectional",
    "max_connections_per_neuron",
    "plasticity_rate",
    "plasticity_rule",
    "synapse_type",
];

impl ConnectionParameters {
    pub fn validate(&self) -> BduResult<()> {
        let invalid = |name: &'static str, reason: String| {
            Err(BduError::InvalidParameters { name, reason })
        };
        if !(0.0..=1.0).contains(&self.connection_probability) {
            return invalid(
                "connection_probability",
                format!("must be in [0, 1], got {}", self.connection_probability),
            );
        }
        if !self.weight_mean.is_finite() {
            return invalid("weight_mean", format!("must be finite, got {}", self.weight_mean));
        }
        if !(self.weight_std >= 0.0 && self.weight_std.is_finite()) {
            return invalid("weight_std", format!("must be >= 0, got {}", self.weight_std));
        }
        if !(self.distance_decay >= 0.0 && self.distance_decay.is_finite()) {
            return invalid(
                "distance_decay",
                format!("must be >= 0, got {}", self.distance_decay),
            );
        }
        if !(self.plasticity_rate >= 0.0 && self.plasticity_rate.is_finite()) {
            return invalid(
                "plasticity_rate",
                format!("must be >= 0, got {}", self.plasticity_rate),
            );
        }
        Ok(())
    }

    /// Whether the reverse of every planned pair is wired too
    pub fn wires_both_directions(&self) -> bool {
        self.bidirectional || self.topology == TopologyType::Reciprocal
    }
}

/// Named presets registered by [`crate::ConnectivityManager::with_default_patterns`]
pub fn default_patterns() -> Vec<(&'static str, ConnectionParameters)> {
    vec![
        (
            "cortical_feedforward",
            ConnectionParameters {
                topology: TopologyType::Feedforward,
                distribution: ConnectionDistribution::Gaussian,
                connection_probability: 0.2,
                weight_mean: 0.6,
                weight_std: 0.1,
                distance_decay: 0.1,
                ..Default::default()
            },
        ),
        (
            "cortical_feedback",
            ConnectionParameters {
                topology: TopologyType::Feedback,
                distribution: ConnectionDistribution::Exponential,
                connection_probability: 0.1,
                weight_mean: 0.3,
                weight_std: 0.05,
                distance_decay: 0.2,
                plasticity_rule: PlasticityRule::Stdp,
                ..Default::default()
            },
        ),
        (
            "lateral_inhibition",
            ConnectionParameters {
                topology: TopologyType::Lateral,
                distribution: ConnectionDistribution::Gaussian,
                connection_probability: 0.15,
                weight_mean: 0.4,
                weight_std: 0.05,
                distance_decay: 0.5,
                synapse_type: SynapseType::Inhibitory,
                plasticity_rule: PlasticityRule::None,
                plasticity_rate: 0.0,
                ..Default::default()
            },
        ),
        (
            "thalamocortical",
            ConnectionParameters {
                topology: TopologyType::Reciprocal,
                distribution: ConnectionDistribution::Gaussian,
                connection_probability: 0.1,
                weight_mean: 0.7,
                weight_std: 0.1,
                distance_decay: 0.05,
                bidirectional: true,
                plasticity_rule: PlasticityRule::Hybrid,
                ..Default::default()
            },
        ),
        (
            "sparse_global",
            ConnectionParameters {
                topology: TopologyType::Sparse,
                distribution: ConnectionDistribution::Uniform,
                connection_probability: 0.02,
                weight_mean: 0.5,
                weight_std: 0.15,
                ..Default::default()
            },
        ),
        (
            "small_world_local",
            ConnectionParameters {
                topology: TopologyType::Lateral,
                distribution: ConnectionDistribution::SmallWorld,
                connection_probability: 0.1,
                weight_mean: 0.5,
                weight_std: 0.1,
                max_connections_per_neuron: 32,
                ..Default::default()
            },
        ),
        (
            "modular_dense",
            ConnectionParameters {
                topology: TopologyType::Modular,
                distribution: ConnectionDistribution::Uniform,
                connection_probability: 0.5,
                weight_mean: 0.5,
                weight_std: 0.1,
                ..Default::default()
            },
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_and_presets_validate() {
        assert!(ConnectionParameters::default().validate().is_ok());
        for (name, params) in default_patterns() {
            assert!(params.validate().is_ok(), "preset {} invalid", name);
        }
    }

    #[test]
    fn test_rejects_out_of_range_probability() {
        let params = ConnectionParameters {
            connection_probability: 1.5,
            ..Default::default()
        };
        assert!(matches!(
            params.validate(),
            Err(BduError::InvalidParameters {
                name: "connection_probability",
                ..
            })
        ));
    }

    #[test]
    fn test_rejects_negative_std_and_nan_mean() {
        let params = ConnectionParameters {
            weight_std: -0.1,
            ..Default::default()
        };
        assert!(params.validate().is_err());
        let params = ConnectionParameters {
            weight_mean: f32::NAN,
            ..Default::default()
        };
        assert!(params.validate().is_err());
    }

    #[test]
    fn test_reciprocal_implies_both_directions() {
        let params = ConnectionParameters {
            topology: TopologyType::Reciprocal,
            ..Default::default()
        };
        assert!(params.wires_both_directions());
    }

    #[test]
    fn test_missing_fields_take_defaults() {
        let params: ConnectionParameters =
            serde_json::from_str(r#"{"topology":"lateral","connection_probability":0.3}"#).unwrap();
        assert_eq!(params.topology, TopologyType::Lateral);
        assert_eq!(params.weight_mean, 0.5);
    }
}
