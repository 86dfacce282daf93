// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # HyperBrain State Manager
//!
//! Optional persistence for a running substrate: run metadata, periodic
//! learning statistics, a goal graph (nodes and edges) and checkpoint
//! snapshots.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────┐
//! │   PersistenceHandle                 │  ← Arc<Mutex<dyn PersistenceBackend>>
//! │   (shared by learning, scheduler,   │
//! │    region behaviors)                │
//! └─────────────────────────────────────┘
//!           ↓
//! ┌─────────────────────────────────────┐
//! │   MemoryDb                          │  ← JSON-lines append log + snapshot files
//! │   (replayed on open)                │
//! └─────────────────────────────────────┘
//! ```
//!
//! Every operation returns a [`Result`]. Consumers treat errors as non-fatal:
//! they log and carry on, the simulation never stops because a write failed.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use hyperbrain_state_manager::{MemoryDb, PersistenceBackend};
//!
//! let mut db = MemoryDb::open("/tmp/hyperbrain-memory")?;
//! let run = db.begin_run("demo")?;
//! db.store_snapshot(run, 0, "initial", &[1, 2, 3])?;
//! # Ok::<(), hyperbrain_state_manager::StateError>(())
//! ```

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod backend;
pub mod memory_db;
pub mod records;

pub use backend::{shared, PersistenceBackend, PersistenceHandle};
pub use memory_db::MemoryDb;
pub use records::{
    GoalEdge, GoalNode, GoalNodeId, GoalStatus, LearningStatsRecord, NewGoal, RunId, RunRecord,
    SnapshotId, SnapshotRecord,
};

use std::path::PathBuf;

/// State manager error types
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    /// I/O error (file operations)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Cannot open store at {path}: {reason}")]
    OpenFailed { path: PathBuf, reason: String },

    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: u64 },
}

impl From<serde_json::Error> for StateError {
    fn from(e: serde_json::Error) -> Self {
        StateError::SerializationError(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, StateError>;

pub(crate) fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
