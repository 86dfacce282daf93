// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # HyperBrain Substrate
//!
//! The region/neuron/synapse graph and everything that mutates it as a whole:
//! region lifecycle, idempotent neuron-to-neuron wiring, stimulus injection,
//! the tick pipeline, statistics and checkpoint import/export.
//!
//! ## Ownership
//! - The substrate owns regions; a region owns its neurons.
//! - Synapses live in one store and are referenced by id from three
//!   per-region adjacency views.
//! - Tick and graph construction both take `&mut self`, so they can never
//!   run concurrently on the same substrate.
//!
//! ## Usage
//! ```rust
//! use hyperbrain_npu_substrate::{HypergraphBrain, SynapseSpec};
//! use hyperbrain_npu_neural::{ActivationPattern, RegionKind, SynapseType};
//!
//! let mut brain = HypergraphBrain::default();
//! let v1 = brain.create_region("v1", RegionKind::Cortical, ActivationPattern::Asynchronous, 4)?;
//! let ids = brain.region(v1).unwrap().neuron_ids();
//! brain.connect_neurons(ids[0], ids[1], SynapseSpec::new(0.8, SynapseType::Excitatory))?;
//! brain.inject(ids[0], 1.0)?;
//! let report = brain.tick(0.1);
//! assert_eq!(report.fired, 1);
//! # Ok::<(), hyperbrain_npu_substrate::BrainError>(())
//! ```

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod behavior;
pub mod brain;
pub mod checkpoint;
pub mod config;
pub mod dynamics;
pub mod error;
pub mod region;
pub mod statistics;
pub mod tick;

pub use behavior::{RegionBehavior, RegionTickContext};
pub use brain::{ConnectOutcome, HypergraphBrain, SynapseSpec};
pub use checkpoint::CheckpointInfo;
pub use config::SubstrateConfig;
pub use error::{BrainError, Result};
pub use region::Region;
pub use statistics::{BrainStatistics, RegionStats, TickReport};
