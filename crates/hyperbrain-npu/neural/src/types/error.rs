// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Error types for neural primitives

use super::ids::{NeuronId, RegionId, SynapseId};

/// Errors raised by neuron/synapse level operations
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum NeuralError {
    #[error("Neuron not found: {0}")]
    NeuronNotFound(NeuronId),

    #[error("Synapse not found: {0}")]
    SynapseNotFound(SynapseId),

    #[error("Region not found: {0}")]
    RegionNotFound(RegionId),

    #[error("Invalid parameter {name}: {reason}")]
    InvalidParameter { name: String, reason: String },
}

pub type Result<T> = core::result::Result<T, NeuralError>;
