// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*!
Core types for BDU operations.
*/

use hyperbrain_npu_substrate::BrainError;

/// Result type for BDU operations
pub type BduResult<T> = Result<T, BduError>;

/// Errors that can occur during BDU operations
///
/// Every variant is raised before the substrate or the manager is mutated.
#[derive(Debug, thiserror::Error)]
pub enum BduError {
    #[error("Region '{0}' is not registered")]
    UnknownRegion(String),

    #[error("Region '{0}' is registered but no longer present in the substrate")]
    RegionNotPresent(String),

    #[error("Unknown connection pattern: {0}")]
    UnknownPattern(String),

    #[error("Invalid connection parameter {name}: {reason}")]
    InvalidParameters { name: &'static str, reason: String },

    #[error("Invalid connectivity document: {0}")]
    InvalidDocument(String),

    #[error(transparent)]
    Substrate(#[from] BrainError),
}
