// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # hyperbrain-observability
//!
//! Logging setup shared by every HyperBrain binary and test harness, with
//! per-crate debug flags.
//!
//! Every crate logs through `tracing` with an explicit `target` (one of
//! [`KNOWN_CRATES`]), so `--debug-hyperbrain-bdu` raises exactly that crate.
//!
//! ## Features
//! - `file-logging`: per-run JSON log folders with retention cleanup

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod cli;
pub mod config;
pub mod init;

pub use cli::*;
pub use config::*;
pub use init::*;

/// Log targets used across the workspace
pub const KNOWN_CRATES: &[&str] = &[
    "hyperbrain",
    "hyperbrain-substrate",
    "hyperbrain-bdu",
    "hyperbrain-plasticity",
    "hyperbrain-scheduler",
    "hyperbrain-state-manager",
];
