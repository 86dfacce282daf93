// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*!
HyperBrain Demo

Builds a small sensory → association → motor substrate from the configuration
file, wires it with the default connectivity patterns, schedules goal,
reflection and tick tasks, runs the autonomous loop and writes a checkpoint
plus a connectivity document.

Usage:
  cargo run --bin hyperbrain_demo -- [--config <file>] [--set section.key=value]... [--cycles N]

Example:
  cargo run --bin hyperbrain_demo -- --set scheduler.frequency_hz=50 --cycles 100 --debug-hyperbrain-scheduler
*/

use anyhow::{bail, Context, Result};
use hyperbrain::config::ConfigError;
use hyperbrain::observability::{debug_flags_help, init_from_options, parse_debug_flags};
use hyperbrain::prelude::*;
use hyperbrain::settings;
use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::PathBuf;

const DEFAULT_CYCLES: u64 = 50;

struct DemoArgs {
    config_path: Option<PathBuf>,
    overrides: HashMap<String, String>,
    cycles: u64,
}

fn parse_args() -> Result<Option<DemoArgs>> {
    let mut parsed = DemoArgs {
        config_path: None,
        overrides: HashMap::new(),
        cycles: DEFAULT_CYCLES,
    };
    let mut args = env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "-h" | "--help" => return Ok(None),
            "--config" => {
                let path = args.next().context("--config needs a path")?;
                parsed.config_path = Some(PathBuf::from(path));
            }
            "--set" => {
                let pair = args.next().context("--set needs section.key=value")?;
                let (key, value) = pair
                    .split_once('=')
                    .with_context(|| format!("Expected section.key=value, got '{}'", pair))?;
                parsed.overrides.insert(key.to_string(), value.to_string());
            }
            "--cycles" => {
                let value = args.next().context("--cycles needs a number")?;
                parsed.cycles = value
                    .parse()
                    .with_context(|| format!("Invalid cycle count '{}'", value))?;
            }
            other if other.starts_with("--debug") => {}
            other => bail!("Unknown argument '{}'", other),
        }
    }
    Ok(Some(parsed))
}

fn load(args: &DemoArgs) -> Result<HyperbrainConfig> {
    match load_config(args.config_path.as_deref(), Some(&args.overrides)) {
        Ok(config) => Ok(config),
        Err(ConfigError::FileNotFound(_)) if args.config_path.is_none() => {
            let mut config = HyperbrainConfig::default();
            hyperbrain::config::apply_environment_overrides(&mut config);
            hyperbrain::config::apply_cli_overrides(&mut config, &args.overrides)?;
            Ok(config)
        }
        Err(e) => Err(e.into()),
    }
}

fn main() -> Result<()> {
    let Some(args) = parse_args()? else {
        println!("Usage: hyperbrain_demo [--config <file>] [--set section.key=value]... [--cycles N]\n");
        println!("{}", debug_flags_help());
        return Ok(());
    };

    let config = load(&args)?;
    let flags = settings::debug_flags(&config, parse_debug_flags());
    let _logging = init_from_options(&settings::logging_options(&config), &flags)?;

    let runtime = HyperbrainRuntime::from_config(&config)?;
    runtime.create_region("sensory", RegionKind::Cortical, ActivationPattern::Asynchronous, 64)?;
    runtime.create_region("association", RegionKind::Cortical, ActivationPattern::Oscillatory, 48)?;
    runtime.create_region("motor", RegionKind::Subcortical, ActivationPattern::Asynchronous, 32)?;

    let mut wired = runtime.connect("sensory", "association", "cortical_feedforward")?;
    wired += runtime.connect("association", "motor", "cortical_feedforward")?;
    wired += runtime.connect("motor", "association", "cortical_feedback")?;
    println!("Wired {} synapses across {} connections", wired, runtime.connectivity().connection_count());

    let scheduler = runtime.scheduler();
    scheduler.add_task(Task::goal("excite-sensory", TaskPriority::High, Some("sensory"), 1.0, 0.5));
    scheduler.add_task(Task::goal("reach-motor", TaskPriority::Medium, Some("motor"), 0.8, 0.1));
    scheduler.add_task(Task::tick("settle", TaskPriority::Low, 10, 0.1));
    scheduler.add_task(Task::reflection("consolidate", TaskPriority::Low, ReflectionMode::Consolidate));
    scheduler.add_task(Task::reflection("summary", TaskPriority::Low, ReflectionMode::Statistics));

    let cycles = runtime.run(args.cycles)?;
    let stats = runtime.brain().lock().statistics();
    let sched = scheduler.statistics();
    println!(
        "Ran {} cycles: {} ticks, {} neurons, {} synapses, mean weight {:.4}",
        cycles, stats.tick_count, stats.neuron_count, stats.synapse_count, stats.mean_weight
    );
    println!(
        "Tasks: {} scheduled, {} completed, {} failed",
        sched.total_scheduled, sched.completed, sched.failed
    );
    if let Some(learning) = runtime.learning() {
        let learning = learning.lock().statistics();
        println!(
            "Learning: {} updates, {} potentiated, {} depressed",
            learning.total_updates, learning.potentiation_events, learning.depression_events
        );
    }

    let checkpoint = runtime.save_checkpoint("demo", "hyperbrain_demo session")?;
    println!("Checkpoint: {}", checkpoint.display());

    let document = serde_json::to_string_pretty(&runtime.connectivity().export_json())?;
    let connectivity_path = checkpoint.with_extension("connectivity.json");
    fs::write(&connectivity_path, document)
        .with_context(|| format!("Failed to write {}", connectivity_path.display()))?;
    println!("Connectivity: {}", connectivity_path.display());

    runtime.shutdown();
    Ok(())
}
