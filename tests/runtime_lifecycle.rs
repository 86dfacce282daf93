// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Runtime wired from configuration: goals, reflections and learning
//! statistics reach the MemoryDB store, and stored snapshots restore.

use hyperbrain::prelude::*;
use hyperbrain::state_manager::{GoalStatus, RunId};
use std::path::Path;
use std::time::Duration;

fn config_in(dir: &Path) -> HyperbrainConfig {
    let mut config = HyperbrainConfig::default();
    config.system.data_dir = dir.to_path_buf();
    config.system.seed = Some(3);
    config.scheduler.frequency_hz = 500.0;
    config.learning.persist_interval = 1;
    config.persistence.enabled = true;
    config
}

fn wired_runtime(config: &HyperbrainConfig) -> HyperbrainRuntime {
    let runtime = HyperbrainRuntime::from_config(config).unwrap();
    runtime
        .create_region("sensory", RegionKind::Cortical, ActivationPattern::Asynchronous, 12)
        .unwrap();
    runtime
        .create_region("motor", RegionKind::Subcortical, ActivationPattern::Asynchronous, 8)
        .unwrap();
    runtime
        .create_region("idle", RegionKind::Special, ActivationPattern::Asynchronous, 4)
        .unwrap();
    runtime
        .connect("sensory", "motor", "cortical_feedforward")
        .unwrap();
    runtime
}

#[test]
fn goals_reflections_and_learning_reach_the_store() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(dir.path());
    let runtime = wired_runtime(&config);
    let run: RunId = runtime.persistence().unwrap().1;

    let scheduler = runtime.scheduler();
    scheduler.add_task(Task::goal("excite", TaskPriority::High, Some("sensory"), 1.0, 0.5));
    scheduler.add_task(Task::goal("unreachable", TaskPriority::High, Some("idle"), 0.05, 1.0));
    scheduler.add_task(Task::reflection("save", TaskPriority::Low, ReflectionMode::Checkpoint));
    assert_eq!(runtime.run(4).unwrap(), 4);

    let stats = scheduler.statistics();
    assert_eq!(stats.total_scheduled, 3);
    assert_eq!(stats.completed, 2);
    assert_eq!(stats.failed, 1);
    assert_eq!(stats.queue_size, 0);
    let updates = runtime.learning().unwrap().lock().statistics().update_cycles;
    assert!(updates > 0);
    runtime.shutdown();
    drop(runtime);

    let db = MemoryDb::open(config.resolve_data_path(&config.persistence.path)).unwrap();
    let goals = db.goal_nodes(run).unwrap();
    assert_eq!(goals.len(), 2);
    let status_of = |label: &str| {
        goals
            .iter()
            .find(|g| g.label == label)
            .map(|g| g.status)
            .unwrap()
    };
    assert_eq!(status_of("excite"), GoalStatus::Achieved);
    assert_eq!(status_of("unreachable"), GoalStatus::Abandoned);

    assert_eq!(db.learning_stats(run).unwrap().len() as u64, updates);

    let snapshots = db.snapshots(run).unwrap();
    assert_eq!(snapshots.len(), 1);
    let bytes = db.load_snapshot(snapshots[0].id).unwrap();
    let mut restored = HypergraphBrain::default();
    restored.import_checkpoint(&bytes).unwrap();
    assert_eq!(restored.region_count(), 3);
    assert!(restored.synapse_count() > 0);
}

#[test]
fn checkpoint_file_restores_the_wired_graph() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = config_in(dir.path());
    config.persistence.enabled = false;
    let runtime = wired_runtime(&config);
    runtime.run(2).unwrap();

    let path = runtime.save_checkpoint("wired", "two cycles").unwrap();
    assert!(path.starts_with(dir.path()));

    let mut restored = HypergraphBrain::default();
    let info = restored.load_checkpoint(&path).unwrap();
    assert_eq!(info.creator, config.checkpoint.creator);
    assert_eq!(restored.export_graph(), runtime.brain().lock().export_graph());
}

#[test]
fn background_loop_stops_on_shutdown() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = config_in(dir.path());
    config.persistence.enabled = false;
    let runtime = wired_runtime(&config);

    runtime.start(None).unwrap();
    assert!(runtime.run(1).is_err());
    let deadline = std::time::Instant::now() + Duration::from_secs(5);
    while runtime.brain().lock().tick_count() < 3 && std::time::Instant::now() < deadline {
        std::thread::sleep(Duration::from_millis(5));
    }
    runtime.shutdown();

    assert!(!runtime.scheduler().is_running());
    assert!(runtime.brain().lock().tick_count() >= 3);
}

#[test]
fn disabled_learning_leaves_weights_alone() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = config_in(dir.path());
    config.persistence.enabled = false;
    config.learning.enabled = false;
    let runtime = wired_runtime(&config);
    assert!(runtime.learning().is_none());

    let before: Vec<f32> = runtime.brain().lock().synapses().map(|s| s.weight).collect();
    runtime
        .scheduler()
        .add_task(Task::goal("excite", TaskPriority::High, Some("sensory"), 1.0, 0.5));
    runtime.run(3).unwrap();
    let after: Vec<f32> = runtime.brain().lock().synapses().map(|s| s.weight).collect();
    assert_eq!(before, after);
}
