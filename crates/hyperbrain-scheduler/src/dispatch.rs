// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Dispatcher that runs task payloads against a shared substrate
//!
//! - `Goal`: stimulate the target region(s), advance one tick, compare the
//!   firing fraction with the success threshold
//! - `Reflection`: statistics, consolidation (pruning) or a checkpoint
//! - `Tick`: advance the substrate, with a learning pass after every tick
//!
//! Persistence is optional. Failed writes are logged and never turn a task
//! into a failure.

use crate::error::{Result, SchedulerError};
use crate::scheduler::TaskDispatcher;
use crate::task::{GoalSpec, ReflectionMode, Task, TaskId, TaskPayload};
use hyperbrain_npu_neural::RegionId;
use hyperbrain_npu_plasticity::LearningSystem;
use hyperbrain_npu_substrate::HypergraphBrain;
use hyperbrain_state_manager::{GoalNodeId, GoalStatus, NewGoal, PersistenceHandle, RunId};
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Synapses weaker than this are removed by a consolidation reflection
pub const DEFAULT_PRUNE_THRESHOLD: f32 = 0.02;

pub type SharedBrain = Arc<Mutex<HypergraphBrain>>;
pub type SharedLearning = Arc<Mutex<LearningSystem>>;

pub struct SubstrateDispatcher {
    brain: SharedBrain,
    learning: Option<SharedLearning>,
    persistence: Option<(PersistenceHandle, RunId)>,
    prune_threshold: f32,
    /// Advance the substrate by one tick at the start of every cycle
    tick_every_cycle: bool,
}

impl SubstrateDispatcher {
    pub fn new(brain: SharedBrain) -> Self {
        Self {
            brain,
            learning: None,
            persistence: None,
            prune_threshold: DEFAULT_PRUNE_THRESHOLD,
            tick_every_cycle: false,
        }
    }

    pub fn with_learning(mut self, learning: SharedLearning) -> Self {
        self.learning = Some(learning);
        self
    }

    pub fn with_persistence(mut self, handle: PersistenceHandle, run: RunId) -> Self {
        self.persistence = Some((handle, run));
        self
    }

    pub fn with_prune_threshold(mut self, threshold: f32) -> Self {
        self.prune_threshold = threshold;
        self
    }

    pub fn with_tick_every_cycle(mut self, enabled: bool) -> Self {
        self.tick_every_cycle = enabled;
        self
    }

    fn step(&self, brain: &mut HypergraphBrain, delta_time: f32) {
        brain.tick(delta_time);
        if let Some(learning) = &self.learning {
            learning.lock().update(brain);
        }
    }

    fn run_goal(&self, id: TaskId, goal: &GoalSpec, delta_time: f32) -> Result<()> {
        let mut brain = self.brain.lock();
        let targets: Vec<RegionId> = match &goal.target_region {
            Some(name) => vec![brain
                .region_id(name)
                .ok_or_else(|| SchedulerError::UnknownRegion(name.clone()))?],
            None => brain.regions().map(|r| r.id()).collect(),
        };
        let goal_node = self.persist_goal(goal);

        for &region in &targets {
            brain.stimulate_region(region, goal.intensity)?;
        }
        self.step(&mut brain, delta_time);

        let (firing, total) = targets
            .iter()
            .filter_map(|id| brain.region(*id))
            .fold((0usize, 0usize), |(f, t), r| {
                (f + r.firing_count(), t + r.neuron_count())
            });
        let response = if total == 0 {
            0.0
        } else {
            firing as f32 / total as f32
        };
        let achieved = response >= goal.success_threshold;
        drop(brain);

        self.persist_goal_status(goal_node, achieved);
        debug!(
            target: "hyperbrain-scheduler",
            "{} goal '{}': response {:.3} (threshold {:.3})",
            id,
            goal.description,
            response,
            goal.success_threshold
        );
        if achieved {
            Ok(())
        } else {
            Err(SchedulerError::GoalNotReached {
                goal: goal.description.clone(),
                response,
                threshold: goal.success_threshold,
            })
        }
    }

    fn run_reflection(&self, mode: ReflectionMode) -> Result<()> {
        match mode {
            ReflectionMode::Statistics => {
                let stats = self.brain.lock().statistics();
                info!(
                    target: "hyperbrain-scheduler",
                    "Reflection: tick {}, {} regions, {} neurons, {} synapses, mean activation {:.4}, mean weight {:.4}",
                    stats.tick_count,
                    stats.region_count,
                    stats.neuron_count,
                    stats.synapse_count,
                    stats.mean_activation,
                    stats.mean_weight
                );
                if let Some(learning) = &self.learning {
                    let ls = learning.lock().statistics();
                    info!(
                        target: "hyperbrain-scheduler",
                        "Reflection: {} learning updates (+{} / -{}), motivation {:.4}",
                        ls.total_updates,
                        ls.potentiation_events,
                        ls.depression_events,
                        ls.motivation.value
                    );
                }
            }
            ReflectionMode::Consolidate => {
                let pruned = self.brain.lock().prune_synapses(self.prune_threshold);
                info!(
                    target: "hyperbrain-scheduler",
                    "Consolidation pruned {} synapses below {}",
                    pruned,
                    self.prune_threshold
                );
            }
            ReflectionMode::Checkpoint => self.store_checkpoint()?,
        }
        Ok(())
    }

    fn store_checkpoint(&self) -> Result<()> {
        let Some((handle, run)) = &self.persistence else {
            debug!(target: "hyperbrain-scheduler", "Checkpoint reflection skipped: no persistence");
            return Ok(());
        };
        let (bytes, tick) = {
            let brain = self.brain.lock();
            let bytes = brain.export_checkpoint("hyperbrain-scheduler", "reflection", &[])?;
            (bytes, brain.tick_count())
        };
        let stored = handle.lock().store_snapshot(*run, tick, "reflection", &bytes);
        match stored {
            Ok(record) => info!(
                target: "hyperbrain-scheduler",
                "Stored checkpoint {} ({} bytes) at tick {}",
                record.id,
                record.size_bytes,
                tick
            ),
            Err(e) => warn!(
                target: "hyperbrain-scheduler",
                "Failed to store checkpoint at tick {}: {}",
                tick,
                e
            ),
        }
        Ok(())
    }

    fn persist_goal(&self, goal: &GoalSpec) -> Option<GoalNodeId> {
        let (handle, run) = self.persistence.as_ref()?;
        let added = handle.lock().add_goal_node(
            *run,
            NewGoal {
                label: goal.description.clone(),
                target_region: goal.target_region.clone(),
                intensity: goal.intensity,
                success_threshold: goal.success_threshold,
            },
        );
        match added {
            Ok(id) => Some(id),
            Err(e) => {
                warn!(target: "hyperbrain-scheduler", "Failed to persist goal: {}", e);
                None
            }
        }
    }

    fn persist_goal_status(&self, goal: Option<GoalNodeId>, achieved: bool) {
        let (Some(goal), Some((handle, _))) = (goal, self.persistence.as_ref()) else {
            return;
        };
        let status = if achieved {
            GoalStatus::Achieved
        } else {
            GoalStatus::Abandoned
        };
        if let Err(e) = handle.lock().set_goal_status(goal, status) {
            warn!(target: "hyperbrain-scheduler", "Failed to persist goal status: {}", e);
        }
    }
}

impl TaskDispatcher for SubstrateDispatcher {
    fn on_cycle(&mut self, delta_time: f32) {
        if self.tick_every_cycle {
            let mut brain = self.brain.lock();
            self.step(&mut brain, delta_time);
        }
    }

    fn dispatch(&mut self, id: TaskId, task: &Task, delta_time: f32) -> Result<()> {
        match &task.payload {
            TaskPayload::Goal(goal) => self.run_goal(id, goal, delta_time),
            TaskPayload::Reflection { mode } => self.run_reflection(*mode),
            TaskPayload::Tick { count, delta_time } => {
                let mut brain = self.brain.lock();
                for _ in 0..*count {
                    self.step(&mut brain, *delta_time);
                }
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::TaskPriority;
    use hyperbrain_npu_neural::{ActivationPattern, RegionKind};
    use hyperbrain_state_manager::{shared, MemoryDb, PersistenceBackend};

    fn shared_brain() -> SharedBrain {
        let mut brain = HypergraphBrain::default();
        brain
            .create_region("pfc", RegionKind::Cortical, ActivationPattern::Asynchronous, 8)
            .unwrap();
        Arc::new(Mutex::new(brain))
    }

    #[test]
    fn test_goal_reached_and_missed() {
        let brain = shared_brain();
        let mut dispatcher = SubstrateDispatcher::new(brain.clone());
        let reach = Task::goal("reach", TaskPriority::High, Some("pfc"), 1.0, 0.9);
        assert!(dispatcher.dispatch(TaskId(0), &reach, 0.1).is_ok());

        let weak = Task::goal("weak", TaskPriority::High, Some("pfc"), 0.1, 0.5);
        assert!(matches!(
            dispatcher.dispatch(TaskId(1), &weak, 0.1),
            Err(SchedulerError::GoalNotReached { .. })
        ));
        assert_eq!(brain.lock().tick_count(), 2);
    }

    #[test]
    fn test_unknown_region_fails() {
        let mut dispatcher = SubstrateDispatcher::new(shared_brain());
        let task = Task::goal("ghost", TaskPriority::Low, Some("nowhere"), 1.0, 0.5);
        assert!(matches!(
            dispatcher.dispatch(TaskId(0), &task, 0.1),
            Err(SchedulerError::UnknownRegion(_))
        ));
    }

    #[test]
    fn test_tick_task_advances_and_learns() {
        let brain = shared_brain();
        let learning = Arc::new(Mutex::new(LearningSystem::default()));
        let mut dispatcher = SubstrateDispatcher::new(brain.clone()).with_learning(learning.clone());
        dispatcher
            .dispatch(TaskId(0), &Task::tick("t", TaskPriority::Medium, 3, 0.1), 0.1)
            .unwrap();
        assert_eq!(brain.lock().tick_count(), 3);
        assert_eq!(learning.lock().statistics().update_cycles, 3);
    }

    #[test]
    fn test_goals_and_checkpoints_are_persisted() {
        let dir = tempfile::tempdir().unwrap();
        let mut db = MemoryDb::open(dir.path()).unwrap();
        let run = db.begin_run("dispatch").unwrap();
        let handle = shared(db);

        let brain = shared_brain();
        let mut dispatcher =
            SubstrateDispatcher::new(brain).with_persistence(handle.clone(), run);
        dispatcher
            .dispatch(
                TaskId(0),
                &Task::goal("reach", TaskPriority::High, Some("pfc"), 1.0, 0.5),
                0.1,
            )
            .unwrap();
        dispatcher
            .dispatch(
                TaskId(1),
                &Task::reflection("save", TaskPriority::Low, ReflectionMode::Checkpoint),
                0.1,
            )
            .unwrap();

        let store = handle.lock();
        let goals = store.goal_nodes(run).unwrap();
        assert_eq!(goals.len(), 1);
        assert_eq!(goals[0].status, GoalStatus::Achieved);
        assert_eq!(store.snapshots(run).unwrap().len(), 1);
    }
}
