// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # HyperBrain
//!
//! A hypergraph neural substrate: named regions of leaky-integrator neurons,
//! typed weighted synapses, a region-to-region connectivity manager,
//! Hebbian/STDP learning with intrinsic motivation, a versioned checkpoint
//! format, MemoryDB persistence and an autonomous priority scheduler.
//!
//! Every workspace member is usable on its own; this crate re-exports them
//! and wires them together from one configuration file.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use hyperbrain::prelude::*;
//!
//! let config = HyperbrainConfig::default();
//! let runtime = HyperbrainRuntime::from_config(&config)?;
//!
//! runtime.create_region("sensory", RegionKind::Cortical, ActivationPattern::Asynchronous, 64)?;
//! runtime.create_region("motor", RegionKind::Subcortical, ActivationPattern::Asynchronous, 32)?;
//! runtime.connect("sensory", "motor", "cortical_feedforward")?;
//!
//! runtime
//!     .scheduler()
//!     .add_task(Task::goal("drive-motor", TaskPriority::High, Some("motor"), 1.0, 0.25));
//! runtime.run(10)?;
//! runtime.save_checkpoint("session", "after ten cycles")?;
//! runtime.shutdown();
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │  Foundation: hyperbrain-config, hyperbrain-observability │
//! │  hyperbrain-npu-neural (Neuron, Synapse, ids)            │
//! └─────────────────────────────────────────────────────────┘
//!                         ↓
//! ┌─────────────────────────────────────────────────────────┐
//! │  Infrastructure: state-manager (MemoryDB),               │
//! │  connectome-serialization (checkpoint format)            │
//! └─────────────────────────────────────────────────────────┘
//!                         ↓
//! ┌─────────────────────────────────────────────────────────┐
//! │  Substrate: hyperbrain-npu-substrate (HypergraphBrain)   │
//! └─────────────────────────────────────────────────────────┘
//!                         ↓
//! ┌─────────────────────────────────────────────────────────┐
//! │  Algorithms: brain-development (connectivity),           │
//! │  npu-plasticity (learning), scheduler                    │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Features
//! - `file-logging`: per-run JSON log folders (see [`observability`])
//!
//! ## License
//!
//! Apache-2.0

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod runtime;
pub mod settings;

// Foundation
pub use hyperbrain_config as config;
pub use hyperbrain_npu_neural as neural;
pub use hyperbrain_observability as observability;

// Infrastructure
pub use hyperbrain_connectome_serialization as serialization;
pub use hyperbrain_state_manager as state_manager;

// Substrate and algorithms
pub use hyperbrain_brain_development as bdu;
pub use hyperbrain_npu_plasticity as plasticity;
pub use hyperbrain_npu_substrate as substrate;
pub use hyperbrain_scheduler as scheduler;

pub use runtime::{HyperbrainRuntime, Result, RuntimeError};

/// Prelude - commonly used types and traits
pub mod prelude {
    pub use crate::config::{load_config, HyperbrainConfig};
    pub use crate::neural::{
        ActivationPattern, NeuronId, NeuronParameters, RegionId, RegionKind, SynapseId,
        SynapseType,
    };
    pub use crate::runtime::{HyperbrainRuntime, RuntimeError};

    pub use crate::bdu::{
        ConnectionDistribution, ConnectionParameters, ConnectivityManager, TopologyType,
    };
    pub use crate::plasticity::{LearningConfig, LearningStatistics, LearningSystem};
    pub use crate::scheduler::{
        AutonomousScheduler, ReflectionMode, SchedulerConfig, SubstrateDispatcher, Task,
        TaskPriority,
    };
    pub use crate::state_manager::{MemoryDb, PersistenceBackend, PersistenceHandle};
    pub use crate::substrate::{
        BrainStatistics, HypergraphBrain, RegionBehavior, RegionTickContext, SubstrateConfig,
    };
}
