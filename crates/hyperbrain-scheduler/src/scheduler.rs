// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # Autonomous scheduler
//!
//! ```text
//! producers ──add_task──► [ BinaryHeap<(priority, FIFO seq)> + statistics ]  (one mutex)
//!                                        │
//!              execute_autonomous_cycle ─┘ pops ≤ max_tasks_per_cycle
//!                                        │
//!                                        ▼
//!                              TaskDispatcher::dispatch   (panics caught)
//! ```
//!
//! Task states are implied by where the task is: in the heap (queued),
//! popped but not yet accounted (running), or folded into the completed /
//! failed counters.
//!
//! The loop checks the shared enabled flag once per iteration and between
//! sleep slices. It never interrupts a cycle in flight, so a stop request
//! takes effect after at most one more cycle.

use crate::error::{Result, SchedulerError};
use crate::task::{Task, TaskId, TaskPriority};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::cmp::{Ordering as CmpOrdering, Reverse};
use std::collections::BinaryHeap;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

/// Longest single sleep between flag checks while pacing the loop
const SLEEP_SLICE: Duration = Duration::from_millis(50);

/// Executes task payloads against the substrate
pub trait TaskDispatcher: Send {
    /// Called once at the start of every cycle, before any task
    fn on_cycle(&mut self, _delta_time: f32) {}

    fn dispatch(&mut self, id: TaskId, task: &Task, delta_time: f32) -> Result<()>;
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    pub max_tasks_per_cycle: usize,
    pub frequency_hz: f64,
    /// How long `stop` waits for the loop thread
    pub stop_timeout_ms: u64,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            max_tasks_per_cycle: 8,
            frequency_hz: 10.0,
            stop_timeout_ms: 2_000,
        }
    }
}

/// Read-only statistics snapshot
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SchedulerStatistics {
    pub total_scheduled: u64,
    pub completed: u64,
    pub failed: u64,
    /// Null or invalid tasks refused by `add_task`
    pub dropped: u64,
    pub queue_size: usize,
    pub running: usize,
    pub average_execution_ms: f64,
    pub cycles: u64,
}

/// Outcome of one cycle
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CycleReport {
    pub dispatched: usize,
    pub completed: usize,
    pub failed: usize,
}

struct QueuedTask {
    priority: TaskPriority,
    seq: u64,
    id: TaskId,
    task: Task,
}

impl QueuedTask {
    fn key(&self) -> (TaskPriority, Reverse<u64>) {
        (self.priority, Reverse(self.seq))
    }
}

impl PartialEq for QueuedTask {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for QueuedTask {}

impl PartialOrd for QueuedTask {
    fn partial_cmp(&self, other: &Self) -> Option<CmpOrdering> {
        Some(self.cmp(other))
    }
}

impl Ord for QueuedTask {
    fn cmp(&self, other: &Self) -> CmpOrdering {
        self.key().cmp(&other.key())
    }
}

#[derive(Default)]
struct SchedulerState {
    queue: BinaryHeap<QueuedTask>,
    next_seq: u64,
    stats: SchedulerStatistics,
    total_execution: Duration,
}

impl SchedulerState {
    fn finish(&mut self, success: bool, elapsed: Duration) {
        self.stats.running = self.stats.running.saturating_sub(1);
        if success {
            self.stats.completed += 1;
        } else {
            self.stats.failed += 1;
        }
        self.total_execution += elapsed;
        let finished = self.stats.completed + self.stats.failed;
        self.stats.average_execution_ms =
            self.total_execution.as_secs_f64() * 1_000.0 / finished as f64;
    }
}

pub struct AutonomousScheduler {
    config: SchedulerConfig,
    state: Mutex<SchedulerState>,
    dispatcher: Mutex<Box<dyn TaskDispatcher>>,
    enabled: Arc<AtomicBool>,
    thread_handle: Mutex<Option<JoinHandle<()>>>,
}

impl std::fmt::Debug for AutonomousScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AutonomousScheduler")
            .field("config", &self.config)
            .field("statistics", &self.statistics())
            .field("enabled", &self.is_enabled())
            .finish()
    }
}

impl AutonomousScheduler {
    pub fn new(config: SchedulerConfig, dispatcher: Box<dyn TaskDispatcher>) -> Self {
        Self {
            config,
            state: Mutex::new(SchedulerState::default()),
            dispatcher: Mutex::new(dispatcher),
            enabled: Arc::new(AtomicBool::new(false)),
            thread_handle: Mutex::new(None),
        }
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    // ---------------------------------------------------------------------
    // Queue
    // ---------------------------------------------------------------------

    /// Queue a task. Safe from any number of threads.
    ///
    /// `None` and tasks failing [`Task::validate`] are dropped without error
    /// and counted in `dropped` only.
    pub fn add_task(&self, task: impl Into<Option<Task>>) -> Option<TaskId> {
        let Some(task) = task.into() else {
            self.state.lock().stats.dropped += 1;
            debug!(target: "hyperbrain-scheduler", "Dropped null task");
            return None;
        };
        if let Err(e) = task.validate() {
            self.state.lock().stats.dropped += 1;
            debug!(target: "hyperbrain-scheduler", "Dropped task '{}': {}", task.name, e);
            return None;
        }

        let mut state = self.state.lock();
        let seq = state.next_seq;
        state.next_seq += 1;
        let id = TaskId(seq);
        state.queue.push(QueuedTask {
            priority: task.priority,
            seq,
            id,
            task,
        });
        state.stats.total_scheduled += 1;
        state.stats.queue_size = state.queue.len();
        Some(id)
    }

    pub fn queue_len(&self) -> usize {
        self.state.lock().queue.len()
    }

    pub fn statistics(&self) -> SchedulerStatistics {
        self.state.lock().stats
    }

    // ---------------------------------------------------------------------
    // Cycle
    // ---------------------------------------------------------------------

    /// Dequeue up to `max_tasks_per_cycle` tasks by priority and dispatch them
    pub fn execute_autonomous_cycle(&self, delta_time: f32) -> CycleReport {
        let batch: Vec<QueuedTask> = {
            let mut state = self.state.lock();
            let take = self.config.max_tasks_per_cycle.min(state.queue.len());
            let batch: Vec<QueuedTask> = (0..take).filter_map(|_| state.queue.pop()).collect();
            state.stats.running += batch.len();
            state.stats.queue_size = state.queue.len();
            state.stats.cycles += 1;
            batch
        };

        let mut report = CycleReport {
            dispatched: batch.len(),
            ..Default::default()
        };
        let mut dispatcher = self.dispatcher.lock();
        if catch_unwind(AssertUnwindSafe(|| dispatcher.on_cycle(delta_time))).is_err() {
            error!(target: "hyperbrain-scheduler", "Cycle hook panicked; continuing");
        }

        for queued in batch {
            let started = Instant::now();
            let outcome = catch_unwind(AssertUnwindSafe(|| {
                dispatcher.dispatch(queued.id, &queued.task, delta_time)
            }))
            .unwrap_or_else(|_| Err(SchedulerError::DispatchPanicked(queued.id.to_string())));
            let elapsed = started.elapsed();

            let success = match outcome {
                Ok(()) => {
                    report.completed += 1;
                    true
                }
                Err(e) => {
                    report.failed += 1;
                    warn!(
                        target: "hyperbrain-scheduler",
                        "{} '{}' ({}) failed: {}",
                        queued.id,
                        queued.task.name,
                        queued.task.payload.kind(),
                        e
                    );
                    false
                }
            };
            self.state.lock().finish(success, elapsed);
        }
        report
    }

    // ---------------------------------------------------------------------
    // Loop
    // ---------------------------------------------------------------------

    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::Release);
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Acquire)
    }

    /// Shared cancellation flag; clearing it stops the loop after the current cycle
    pub fn enabled_flag(&self) -> Arc<AtomicBool> {
        self.enabled.clone()
    }

    /// Run cycles paced to `hz` on the calling thread until the enabled flag
    /// is cleared or `iterations` cycles have run (`None` = no budget).
    /// Returns the number of cycles executed.
    pub fn run_autonomous_loop(&self, iterations: Option<u64>, hz: f64) -> Result<u64> {
        if !(hz.is_finite() && hz > 0.0) {
            return Err(SchedulerError::InvalidFrequency(hz));
        }
        let period = Duration::from_secs_f64(1.0 / hz);
        let delta_time = period.as_secs_f32();
        let mut executed = 0u64;

        while self.is_enabled() && iterations.map_or(true, |budget| executed < budget) {
            let started = Instant::now();
            self.execute_autonomous_cycle(delta_time);
            executed += 1;

            let deadline = started + period;
            loop {
                let now = Instant::now();
                if now >= deadline || !self.is_enabled() {
                    break;
                }
                thread::sleep((deadline - now).min(SLEEP_SLICE));
            }
        }
        debug!(
            target: "hyperbrain-scheduler",
            "Autonomous loop exited after {} cycles",
            executed
        );
        Ok(executed)
    }

    /// Enable the flag and run the loop on a named background thread
    pub fn start(self: &Arc<Self>, iterations: Option<u64>, hz: f64) -> Result<()> {
        if !(hz.is_finite() && hz > 0.0) {
            return Err(SchedulerError::InvalidFrequency(hz));
        }
        let mut handle = self.thread_handle.lock();
        if handle.as_ref().is_some_and(|h| !h.is_finished()) {
            return Err(SchedulerError::AlreadyRunning);
        }

        self.set_enabled(true);
        let scheduler = Arc::clone(self);
        let spawned = thread::Builder::new()
            .name("hyperbrain-autonomous-loop".to_string())
            .spawn(move || {
                if let Err(e) = scheduler.run_autonomous_loop(iterations, hz) {
                    error!(target: "hyperbrain-scheduler", "Autonomous loop failed: {}", e);
                }
                scheduler.set_enabled(false);
            });
        match spawned {
            Ok(join) => {
                *handle = Some(join);
                info!(
                    target: "hyperbrain-scheduler",
                    "Autonomous loop started at {:.2} Hz",
                    hz
                );
                Ok(())
            }
            Err(e) => {
                self.set_enabled(false);
                Err(SchedulerError::Spawn(e))
            }
        }
    }

    /// Clear the flag and wait (bounded) for the loop thread.
    /// Returns true when the thread finished within the timeout.
    pub fn stop(&self) -> bool {
        self.set_enabled(false);
        let Some(handle) = self.thread_handle.lock().take() else {
            return true;
        };

        let timeout = Duration::from_millis(self.config.stop_timeout_ms);
        let (tx, rx) = std::sync::mpsc::channel();
        thread::spawn(move || {
            let _ = tx.send(handle.join());
        });
        match rx.recv_timeout(timeout) {
            Ok(Ok(())) => {
                info!(target: "hyperbrain-scheduler", "Autonomous loop stopped cleanly");
                true
            }
            Ok(Err(_)) => {
                warn!(target: "hyperbrain-scheduler", "Autonomous loop thread panicked");
                true
            }
            Err(_) => {
                warn!(
                    target: "hyperbrain-scheduler",
                    "Autonomous loop did not stop within {:?}",
                    timeout
                );
                false
            }
        }
    }

    pub fn is_running(&self) -> bool {
        self.thread_handle
            .lock()
            .as_ref()
            .is_some_and(|h| !h.is_finished())
    }
}

impl Drop for AutonomousScheduler {
    fn drop(&mut self) {
        self.enabled.store(false, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::{ReflectionMode, TaskPayload};
    use std::sync::atomic::AtomicUsize;

    /// Records dispatch order; fails tasks whose name starts with "fail", panics on "panic"
    struct Recorder {
        order: Arc<Mutex<Vec<String>>>,
        cycles: Arc<AtomicUsize>,
    }

    impl TaskDispatcher for Recorder {
        fn on_cycle(&mut self, _delta_time: f32) {
            self.cycles.fetch_add(1, Ordering::SeqCst);
        }

        fn dispatch(&mut self, _id: TaskId, task: &Task, _delta_time: f32) -> Result<()> {
            self.order.lock().push(task.name.clone());
            if task.name.starts_with("panic") {
                panic!("dispatcher exploded");
            }
            if task.name.starts_with("fail") {
                return Err(SchedulerError::InvalidTask("told to fail".into()));
            }
            Ok(())
        }
    }

    fn scheduler(max: usize) -> (AutonomousScheduler, Arc<Mutex<Vec<String>>>, Arc<AtomicUsize>) {
        let order = Arc::new(Mutex::new(Vec::new()));
        let cycles = Arc::new(AtomicUsize::new(0));
        let config = SchedulerConfig {
            max_tasks_per_cycle: max,
            ..Default::default()
        };
        let sched = AutonomousScheduler::new(
            config,
            Box::new(Recorder {
                order: order.clone(),
                cycles: cycles.clone(),
            }),
        );
        (sched, order, cycles)
    }

    fn reflect(name: &str, priority: TaskPriority) -> Task {
        Task::reflection(name, priority, ReflectionMode::Statistics)
    }

    #[test]
    fn test_priority_then_fifo() {
        let (sched, order, _) = scheduler(10);
        sched.add_task(reflect("low-1", TaskPriority::Low));
        sched.add_task(reflect("high-1", TaskPriority::High));
        sched.add_task(reflect("med-1", TaskPriority::Medium));
        sched.add_task(reflect("high-2", TaskPriority::High));
        sched.add_task(reflect("low-2", TaskPriority::Low));
        sched.execute_autonomous_cycle(0.1);
        assert_eq!(
            *order.lock(),
            vec!["high-1", "high-2", "med-1", "low-1", "low-2"]
        );
    }

    #[test]
    fn test_cycle_limit() {
        let (sched, _, cycles) = scheduler(2);
        for i in 0..5 {
            sched.add_task(reflect(&format!("t{}", i), TaskPriority::Medium));
        }
        assert_eq!(sched.execute_autonomous_cycle(0.1).dispatched, 2);
        assert_eq!(sched.queue_len(), 3);
        assert_eq!(cycles.load(Ordering::SeqCst), 1);
        let stats = sched.statistics();
        assert_eq!(stats.queue_size, 3);
        assert_eq!(stats.running, 0);
        assert_eq!(stats.completed, 2);
    }

    #[test]
    fn test_failures_and_panics_are_counted() {
        let (sched, _, _) = scheduler(10);
        sched.add_task(reflect("ok", TaskPriority::Medium));
        sched.add_task(reflect("fail-soft", TaskPriority::Medium));
        sched.add_task(reflect("panic-hard", TaskPriority::Medium));
        sched.add_task(reflect("ok-after", TaskPriority::Medium));
        let report = sched.execute_autonomous_cycle(0.1);
        assert_eq!(report.completed, 2);
        assert_eq!(report.failed, 2);
        let stats = sched.statistics();
        assert_eq!(stats.completed + stats.failed, stats.total_scheduled);
    }

    #[test]
    fn test_null_and_invalid_tasks_are_dropped() {
        let (sched, _, _) = scheduler(10);
        assert_eq!(sched.add_task(None::<Task>), None);
        assert_eq!(
            sched.add_task(Task::new("", TaskPriority::High, TaskPayload::Reflection {
                mode: ReflectionMode::Statistics
            })),
            None
        );
        let report = sched.execute_autonomous_cycle(0.1);
        assert_eq!(report.dispatched, 0);
        let stats = sched.statistics();
        assert_eq!(stats.total_scheduled, 0);
        assert_eq!(stats.dropped, 2);
        assert_eq!(stats.completed + stats.failed, 0);
    }

    #[test]
    fn test_loop_respects_budget_and_flag() {
        let (sched, _, cycles) = scheduler(1);
        // flag cleared: no iterations
        assert_eq!(sched.run_autonomous_loop(Some(5), 1000.0).unwrap(), 0);
        sched.set_enabled(true);
        assert_eq!(sched.run_autonomous_loop(Some(5), 1000.0).unwrap(), 5);
        assert_eq!(cycles.load(Ordering::SeqCst), 5);
        assert!(sched.run_autonomous_loop(Some(1), 0.0).is_err());
    }

    #[test]
    fn test_start_stop_background_loop() {
        let (sched, _, cycles) = scheduler(4);
        let sched = Arc::new(sched);
        sched.start(None, 200.0).unwrap();
        assert!(matches!(
            sched.start(None, 200.0),
            Err(SchedulerError::AlreadyRunning)
        ));
        for i in 0..10 {
            sched.add_task(reflect(&format!("bg{}", i), TaskPriority::Low));
        }
        let deadline = Instant::now() + Duration::from_secs(5);
        while sched.queue_len() > 0 && Instant::now() < deadline {
            thread::sleep(Duration::from_millis(5));
        }
        assert!(sched.stop());
        assert!(!sched.is_running());
        assert!(cycles.load(Ordering::SeqCst) > 0);
        assert_eq!(sched.statistics().completed, 10);
    }
}
