// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Persisted record types

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

macro_rules! record_id {
    ($(#[$meta:meta])* $name:ident, $label:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        pub struct $name(pub u64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($label, "({})"), self.0)
            }
        }
    };
}

record_id!(
    /// One simulation run
    RunId,
    "Run"
);
record_id!(GoalNodeId, "Goal");
record_id!(SnapshotId, "Snapshot");

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunRecord {
    pub id: RunId,
    pub label: String,
    pub started_at: i64,
    pub ended_at: Option<i64>,
}

/// Learning statistics at one tick of a run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LearningStatsRecord {
    pub run_id: RunId,
    pub tick: u64,
    pub total_updates: u64,
    pub potentiation_events: u64,
    pub depression_events: u64,
    pub mean_abs_weight_change: f32,
    pub intrinsic_motivation: f32,
    pub recorded_at: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum GoalStatus {
    #[default]
    Pending,
    Achieved,
    Abandoned,
}

/// Goal as submitted by a caller, before an id is assigned
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewGoal {
    pub label: String,
    pub target_region: Option<String>,
    pub intensity: f32,
    pub success_threshold: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoalNode {
    pub id: GoalNodeId,
    pub run_id: RunId,
    pub label: String,
    pub target_region: Option<String>,
    pub intensity: f32,
    pub success_threshold: f32,
    pub status: GoalStatus,
    pub created_at: i64,
}

/// Directed relation between two goals (e.g. "subgoal_of", "follows")
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoalEdge {
    pub run_id: RunId,
    pub from: GoalNodeId,
    pub to: GoalNodeId,
    pub relation: String,
    pub weight: f32,
}

/// Metadata of a stored checkpoint; the bytes live in `path`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotRecord {
    pub id: SnapshotId,
    pub run_id: RunId,
    pub tick: u64,
    pub description: String,
    pub path: PathBuf,
    pub size_bytes: u64,
    pub created_at: i64,
}
