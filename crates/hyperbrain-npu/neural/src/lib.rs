// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # HyperBrain Neural Primitives
//!
//! The atomic state of the substrate:
//! - **Types**: identity newtypes (`NeuronId`, `SynapseId`, `RegionId`) and errors
//! - **Synapse**: weighted, typed, directed edges plus their contribution math
//! - **Models**: the neuron state machine (activation, decay, firing)
//!
//! Everything here is plain data. Ownership rules (which region owns a neuron,
//! which synapses reference it) live in `hyperbrain-npu-substrate`.

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod models;
pub mod synapse;
pub mod types;

pub use models::{Neuron, NeuronParameters, ACTIVATION_MAX, ACTIVATION_MIN};
pub use synapse::{
    clamp_weight, compute_synaptic_contribution, PlasticityRule, Synapse, SynapseType,
    WEIGHT_MAX, WEIGHT_MIN,
};
pub use types::{
    ActivationPattern, NeuralError, NeuronId, RegionId, RegionKind, Result, SynapseId,
};
