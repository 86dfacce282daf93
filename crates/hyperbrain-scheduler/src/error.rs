// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

use hyperbrain_npu_substrate::BrainError;

/// Scheduler errors
#[derive(Debug, thiserror::Error)]
pub enum SchedulerError {
    #[error("Invalid task: {0}")]
    InvalidTask(String),

    #[error("Unknown region: {0}")]
    UnknownRegion(String),

    #[error("Goal '{goal}' not reached: response {response:.3} < threshold {threshold:.3}")]
    GoalNotReached {
        goal: String,
        response: f32,
        threshold: f32,
    },

    #[error("Dispatch of {0} panicked")]
    DispatchPanicked(String),

    #[error("Autonomous loop already running")]
    AlreadyRunning,

    #[error("Failed to spawn autonomous loop thread: {0}")]
    Spawn(#[from] std::io::Error),

    #[error("Invalid loop frequency {0} Hz")]
    InvalidFrequency(f64),

    #[error(transparent)]
    Substrate(#[from] BrainError),
}

pub type Result<T> = std::result::Result<T, SchedulerError>;
