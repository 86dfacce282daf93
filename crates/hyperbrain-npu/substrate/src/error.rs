// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Substrate error types

use hyperbrain_connectome_serialization::ConnectomeError;
use hyperbrain_npu_neural::{NeuralError, NeuronId, RegionId, SynapseId};

/// Errors raised by graph mutation and checkpoint import
///
/// Every operation returning one of these has left the substrate untouched.
#[derive(Debug, thiserror::Error)]
pub enum BrainError {
    #[error(transparent)]
    Neural(#[from] NeuralError),

    #[error("Region not found: {0}")]
    RegionNotFound(RegionId),

    #[error("Neuron not found: {0}")]
    NeuronNotFound(NeuronId),

    #[error("Synapse not found: {0}")]
    SynapseNotFound(SynapseId),

    #[error("Region name already in use: {0}")]
    DuplicateRegionName(String),

    #[error("Invalid parameter {name}: {reason}")]
    InvalidParameter { name: &'static str, reason: String },

    #[error("Self-connection rejected for {0}")]
    SelfConnection(NeuronId),

    #[error("Checkpoint error: {0}")]
    Connectome(#[from] ConnectomeError),

    #[error("Corrupt snapshot: {0}")]
    CorruptSnapshot(String),
}

pub type Result<T> = std::result::Result<T, BrainError>;
