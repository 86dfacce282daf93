// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Concurrent producers against a draining consumer

use hyperbrain_npu_neural::{ActivationPattern, RegionKind};
use hyperbrain_npu_substrate::HypergraphBrain;
use hyperbrain_scheduler::{
    AutonomousScheduler, ReflectionMode, Result, SchedulerConfig, SchedulerError,
    SubstrateDispatcher, Task, TaskDispatcher, TaskId, TaskPriority,
};
use parking_lot::Mutex;
use std::sync::Arc;
use std::thread;

const PRODUCERS: usize = 4;
const TASKS_PER_PRODUCER: usize = 50;

/// Records dispatch order and fails every task whose name ends in "!"
#[derive(Clone, Default)]
struct Journal {
    seen: Arc<Mutex<Vec<(TaskPriority, String)>>>,
}

impl TaskDispatcher for Journal {
    fn dispatch(&mut self, _id: TaskId, task: &Task, _delta_time: f32) -> Result<()> {
        self.seen.lock().push((task.priority, task.name.clone()));
        if task.name.ends_with('!') {
            return Err(SchedulerError::InvalidTask(task.name.clone()));
        }
        Ok(())
    }
}

fn priority_for(n: usize) -> TaskPriority {
    match n % 3 {
        0 => TaskPriority::Low,
        1 => TaskPriority::Medium,
        _ => TaskPriority::High,
    }
}

#[test]
fn every_scheduled_task_is_accounted_for() {
    let journal = Journal::default();
    let scheduler = Arc::new(AutonomousScheduler::new(
        SchedulerConfig {
            max_tasks_per_cycle: 7,
            ..Default::default()
        },
        Box::new(journal.clone()),
    ));

    let producers: Vec<_> = (0..PRODUCERS)
        .map(|p| {
            let scheduler = scheduler.clone();
            thread::spawn(move || {
                let mut last_total = 0;
                for n in 0..TASKS_PER_PRODUCER {
                    let suffix = if n % 10 == 0 { "!" } else { "" };
                    let name = format!("p{}-{}{}", p, n, suffix);
                    assert!(scheduler
                        .add_task(Task::reflection(
                            name,
                            priority_for(n),
                            ReflectionMode::Statistics
                        ))
                        .is_some());
                    let total = scheduler.statistics().total_scheduled;
                    assert!(total >= last_total, "total_scheduled went backwards");
                    last_total = total;
                }
            })
        })
        .collect();

    let consumer = {
        let scheduler = scheduler.clone();
        thread::spawn(move || {
            let expected = (PRODUCERS * TASKS_PER_PRODUCER) as u64;
            loop {
                scheduler.execute_autonomous_cycle(0.01);
                let stats = scheduler.statistics();
                if stats.completed + stats.failed == expected {
                    break;
                }
                thread::yield_now();
            }
        })
    };

    for producer in producers {
        producer.join().unwrap();
    }
    consumer.join().unwrap();

    let stats = scheduler.statistics();
    let total = (PRODUCERS * TASKS_PER_PRODUCER) as u64;
    assert_eq!(stats.total_scheduled, total);
    assert_eq!(stats.completed + stats.failed, total);
    assert_eq!(stats.failed, (PRODUCERS * TASKS_PER_PRODUCER / 10) as u64);
    assert_eq!(stats.queue_size, 0);
    assert_eq!(stats.running, 0);
    assert_eq!(journal.seen.lock().len(), PRODUCERS * TASKS_PER_PRODUCER);
}

#[test]
fn cycles_drain_highest_priority_first() {
    let journal = Journal::default();
    let scheduler = AutonomousScheduler::new(
        SchedulerConfig {
            max_tasks_per_cycle: 4,
            ..Default::default()
        },
        Box::new(journal.clone()),
    );
    for n in 0..12 {
        scheduler.add_task(Task::reflection(
            format!("t{}", n),
            priority_for(n),
            ReflectionMode::Statistics,
        ));
    }
    while scheduler.queue_len() > 0 {
        scheduler.execute_autonomous_cycle(0.01);
    }

    let seen = journal.seen.lock();
    let priorities: Vec<_> = seen.iter().map(|(p, _)| *p).collect();
    let mut sorted = priorities.clone();
    sorted.sort_by(|a, b| b.cmp(a));
    assert_eq!(priorities, sorted);

    // FIFO inside a band
    let high: Vec<_> = seen
        .iter()
        .filter(|(p, _)| *p == TaskPriority::High)
        .map(|(_, name)| name.as_str())
        .collect();
    assert_eq!(high, ["t2", "t5", "t8", "t11"]);
}

#[test]
fn null_tasks_are_refused_without_side_effects() {
    let journal = Journal::default();
    let scheduler = AutonomousScheduler::new(SchedulerConfig::default(), Box::new(journal.clone()));
    assert_eq!(scheduler.add_task(None::<Task>), None);
    assert_eq!(scheduler.add_task(Task::tick("", TaskPriority::High, 1, 0.1)), None);

    let report = scheduler.execute_autonomous_cycle(0.1);
    assert_eq!(report.dispatched, 0);
    let stats = scheduler.statistics();
    assert_eq!(stats.total_scheduled, 0);
    assert_eq!(stats.dropped, 2);
    assert_eq!(stats.completed + stats.failed, 0);
    assert!(journal.seen.lock().is_empty());

    // queue still usable
    assert!(scheduler.add_task(Task::reflection("ok", TaskPriority::Low, ReflectionMode::Statistics)).is_some());
    assert_eq!(scheduler.execute_autonomous_cycle(0.1).completed, 1);
}

#[test]
fn substrate_goals_drive_the_target_region() {
    let mut brain = HypergraphBrain::default();
    brain
        .create_region("motor", RegionKind::Subcortical, ActivationPattern::Asynchronous, 6)
        .unwrap();
    brain
        .create_region("sensory", RegionKind::Cortical, ActivationPattern::Asynchronous, 6)
        .unwrap();
    let brain = Arc::new(Mutex::new(brain));
    let scheduler = AutonomousScheduler::new(
        SchedulerConfig::default(),
        Box::new(SubstrateDispatcher::new(brain.clone())),
    );

    scheduler.add_task(Task::goal("move", TaskPriority::High, Some("motor"), 1.0, 0.5));
    scheduler.add_task(Task::goal("whisper", TaskPriority::Medium, None, 0.05, 0.5));
    scheduler.add_task(Task::goal("ghost", TaskPriority::Low, Some("absent"), 1.0, 0.5));
    scheduler.add_task(Task::reflection("tidy", TaskPriority::Low, ReflectionMode::Consolidate));

    let report = scheduler.execute_autonomous_cycle(0.1);
    assert_eq!(report.dispatched, 4);
    assert_eq!(report.completed, 2);
    assert_eq!(report.failed, 2);
    // "ghost" fails before ticking
    assert_eq!(brain.lock().tick_count(), 2);
}
