// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # HyperBrain Connectome Serialization
//!
//! Binary (de)serialization of the region/neuron/synapse graph.
//!
//! Two buffer kinds share one header layout:
//! - **Graph**: the bare graph (regions, neurons, synapses), never compressed
//! - **Checkpoint**: graph plus format version, creation time, creator,
//!   description and a free-form metadata map, LZ4 compressed when the
//!   `compression` feature is on
//!
//! Decoding never panics: every length field is bounds-checked before it is
//! used and the payload is verified against an FNV-1a checksum before bincode
//! sees it.
//!
//! ## Usage
//! ```ignore
//! use hyperbrain_connectome_serialization::{encode_checkpoint, decode_checkpoint};
//!
//! let bytes = encode_checkpoint(&checkpoint)?;
//! let restored = decode_checkpoint(&bytes)?;
//! ```

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

use thiserror::Error;

mod format;
mod snapshot;

pub use format::*;
pub use snapshot::*;

/// Connectome I/O errors
#[derive(Error, Debug)]
pub enum ConnectomeError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Deserialization error: {0}")]
    Deserialization(String),

    #[error("Version mismatch: file version {file_version}, expected {expected_version}")]
    VersionMismatch {
        file_version: u32,
        expected_version: u32,
    },

    #[error("Invalid magic number: expected {expected:?}, got {found:?}")]
    InvalidMagic { expected: [u8; 5], found: [u8; 5] },

    #[error("Buffer too short: need {needed} bytes, have {available}")]
    Truncated { needed: usize, available: usize },

    #[error("Declared payload length {declared} does not match {actual} remaining bytes")]
    LengthMismatch { declared: u64, actual: usize },

    #[error("Declared payload size {declared} exceeds the {limit} byte limit")]
    PayloadTooLarge { declared: u64, limit: u64 },

    #[error("Checksum mismatch: file may be corrupted")]
    ChecksumMismatch,

    #[error("Compression error: {0}")]
    Compression(String),
}

pub type Result<T> = std::result::Result<T, ConnectomeError>;
