// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Core identity, tag and error types.

pub mod error;
pub mod ids;
pub mod region;

pub use error::{NeuralError, Result};
pub use ids::{NeuronId, RegionId, SynapseId};
pub use region::{ActivationPattern, RegionKind};
