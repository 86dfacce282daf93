// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # HyperBrain Scheduler
//!
//! Priority queue of goal, reflection and tick tasks, drained in bounded
//! cycles by an [`AutonomousScheduler`]. The loop can run inline
//! ([`AutonomousScheduler::run_autonomous_loop`]) or on its own thread
//! ([`AutonomousScheduler::start`] / [`AutonomousScheduler::stop`]).
//!
//! ```
//! use hyperbrain_scheduler::{AutonomousScheduler, SchedulerConfig, SubstrateDispatcher, Task, TaskPriority};
//! use hyperbrain_npu_substrate::HypergraphBrain;
//! use parking_lot::Mutex;
//! use std::sync::Arc;
//!
//! let brain = Arc::new(Mutex::new(HypergraphBrain::default()));
//! let scheduler = AutonomousScheduler::new(
//!     SchedulerConfig::default(),
//!     Box::new(SubstrateDispatcher::new(brain.clone())),
//! );
//! scheduler.add_task(Task::tick("warmup", TaskPriority::High, 5, 0.1));
//! scheduler.execute_autonomous_cycle(0.1);
//! assert_eq!(brain.lock().tick_count(), 5);
//! ```

pub mod dispatch;
pub mod error;
pub mod scheduler;
pub mod task;

pub use dispatch::{SharedBrain, SharedLearning, SubstrateDispatcher, DEFAULT_PRUNE_THRESHOLD};
pub use error::{Result, SchedulerError};
pub use scheduler::{
    AutonomousScheduler, CycleReport, SchedulerConfig, SchedulerStatistics, TaskDispatcher,
};
pub use task::{
    GoalSpec, ReflectionMode, Task, TaskId, TaskPayload, TaskPriority, MAX_TEXT_LEN,
    MAX_TICKS_PER_TASK,
};
