// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Persistence seam shared by every consumer

use crate::records::{
    GoalEdge, GoalNode, GoalNodeId, GoalStatus, LearningStatsRecord, NewGoal, RunId,
    SnapshotId, SnapshotRecord,
};
use crate::Result;
use parking_lot::Mutex;
use std::sync::Arc;

/// Storage operations the substrate, learning system and scheduler rely on
pub trait PersistenceBackend: Send {
    fn begin_run(&mut self, label: &str) -> Result<RunId>;

    fn end_run(&mut self, run: RunId) -> Result<()>;

    fn record_learning_stats(&mut self, record: LearningStatsRecord) -> Result<()>;

    fn learning_stats(&self, run: RunId) -> Result<Vec<LearningStatsRecord>>;

    fn add_goal_node(&mut self, run: RunId, goal: NewGoal) -> Result<GoalNodeId>;

    fn set_goal_status(&mut self, goal: GoalNodeId, status: GoalStatus) -> Result<()>;

    fn add_goal_edge(&mut self, edge: GoalEdge) -> Result<()>;

    fn goal_nodes(&self, run: RunId) -> Result<Vec<GoalNode>>;

    fn goal_edges(&self, run: RunId) -> Result<Vec<GoalEdge>>;

    /// Persist checkpoint bytes and return the record describing them
    fn store_snapshot(
        &mut self,
        run: RunId,
        tick: u64,
        description: &str,
        bytes: &[u8],
    ) -> Result<SnapshotRecord>;

    fn snapshots(&self, run: RunId) -> Result<Vec<SnapshotRecord>>;

    fn load_snapshot(&self, snapshot: SnapshotId) -> Result<Vec<u8>>;
}

/// Shared, thread-safe handle to a backend
pub type PersistenceHandle = Arc<Mutex<dyn PersistenceBackend>>;

/// Wrap a backend into a [`PersistenceHandle`]
pub fn shared<B: PersistenceBackend + 'static>(backend: B) -> PersistenceHandle {
    Arc::new(Mutex::new(backend))
}
