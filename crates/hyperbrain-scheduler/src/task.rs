// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Scheduler tasks

use crate::error::{Result, SchedulerError};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Longest accepted task name / goal description, in bytes
pub const MAX_TEXT_LEN: usize = 4096;

/// Most ticks a single `Tick` task may request
pub const MAX_TICKS_PER_TASK: u32 = 10_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TaskId(pub u64);

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Task({})", self.0)
    }
}

/// Priority band. Declaration order is the queue order (High first).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "snake_case")]
pub enum TaskPriority {
    Low,
    #[default]
    Medium,
    High,
}

/// Goal parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoalSpec {
    pub description: String,
    /// Region to drive; `None` drives every region
    pub target_region: Option<String>,
    /// Stimulus injected into each target neuron
    pub intensity: f32,
    /// Firing fraction the target must reach for the goal to count as achieved
    pub success_threshold: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ReflectionMode {
    /// Log substrate and learning statistics
    #[default]
    Statistics,
    /// Prune synapses that learning has driven below the pruning floor
    Consolidate,
    /// Store a checkpoint through the persistence handle
    Checkpoint,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TaskPayload {
    Goal(GoalSpec),
    Reflection { mode: ReflectionMode },
    Tick { count: u32, delta_time: f32 },
}

impl TaskPayload {
    pub fn kind(&self) -> &'static str {
        match self {
            TaskPayload::Goal(_) => "goal",
            TaskPayload::Reflection { .. } => "reflection",
            TaskPayload::Tick { .. } => "tick",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub name: String,
    pub priority: TaskPriority,
    pub payload: TaskPayload,
}

impl Task {
    pub fn new(name: impl Into<String>, priority: TaskPriority, payload: TaskPayload) -> Self {
        Self {
            name: name.into(),
            priority,
            payload,
        }
    }

    pub fn goal(
        name: impl Into<String>,
        priority: TaskPriority,
        target_region: Option<&str>,
        intensity: f32,
        success_threshold: f32,
    ) -> Self {
        let name = name.into();
        Self::new(
            name.clone(),
            priority,
            TaskPayload::Goal(GoalSpec {
                description: name,
                target_region: target_region.map(str::to_string),
                intensity,
                success_threshold,
            }),
        )
    }

    pub fn reflection(name: impl Into<String>, priority: TaskPriority, mode: ReflectionMode) -> Self {
        Self::new(name, priority, TaskPayload::Reflection { mode })
    }

    pub fn tick(name: impl Into<String>, priority: TaskPriority, count: u32, delta_time: f32) -> Self {
        Self::new(name, priority, TaskPayload::Tick { count, delta_time })
    }

    /// Structural checks applied before a task is queued
    pub fn validate(&self) -> Result<()> {
        let invalid = |reason: String| Err(SchedulerError::InvalidTask(reason));
        if self.name.trim().is_empty() {
            return invalid("empty task name".into());
        }
        if self.name.len() > MAX_TEXT_LEN {
            return invalid(format!("task name longer than {} bytes", MAX_TEXT_LEN));
        }
        match &self.payload {
            TaskPayload::Goal(goal) => {
                if goal.description.len() > MAX_TEXT_LEN {
                    return invalid(format!("goal description longer than {} bytes", MAX_TEXT_LEN));
                }
                if !goal.intensity.is_finite() {
                    return invalid(format!("goal intensity {} is not finite", goal.intensity));
                }
                if !(0.0..=1.0).contains(&goal.success_threshold) {
                    return invalid(format!(
                        "success threshold {} outside [0, 1]",
                        goal.success_threshold
                    ));
                }
            }
            TaskPayload::Reflection { .. } => {}
            TaskPayload::Tick { count, delta_time } => {
                if *count == 0 || *count > MAX_TICKS_PER_TASK {
                    return invalid(format!(
                        "tick count {} outside 1..={}",
                        count, MAX_TICKS_PER_TASK
                    ));
                }
                if !(delta_time.is_finite() && *delta_time > 0.0) {
                    return invalid(format!("tick delta {} must be > 0", delta_time));
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_priority_order() {
        assert!(TaskPriority::High > TaskPriority::Medium);
        assert!(TaskPriority::Medium > TaskPriority::Low);
    }

    #[test]
    fn test_validation() {
        assert!(Task::goal("reach", TaskPriority::High, Some("pfc"), 1.0, 0.5)
            .validate()
            .is_ok());
        assert!(Task::goal("", TaskPriority::High, None, 1.0, 0.5).validate().is_err());
        assert!(Task::goal("nan", TaskPriority::Low, None, f32::NAN, 0.5)
            .validate()
            .is_err());
        assert!(Task::goal("far", TaskPriority::Low, None, 1.0, 1.5)
            .validate()
            .is_err());
        assert!(Task::tick("none", TaskPriority::Low, 0, 0.1).validate().is_err());
        assert!(Task::tick("neg", TaskPriority::Low, 1, -0.1).validate().is_err());
        let oversized = "x".repeat(MAX_TEXT_LEN + 1);
        assert!(Task::reflection(oversized, TaskPriority::Low, ReflectionMode::Statistics)
            .validate()
            .is_err());
    }

    #[test]
    fn test_payload_kind() {
        assert_eq!(Task::tick("t", TaskPriority::Medium, 2, 0.1).payload.kind(), "tick");
        assert_eq!(
            Task::reflection("r", TaskPriority::Low, ReflectionMode::Consolidate)
                .payload
                .kind(),
            "reflection"
        );
    }
}
