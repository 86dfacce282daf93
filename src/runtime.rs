// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! One substrate with its connectivity manager, learning system, persistence
//! store and scheduler, built from a [`HyperbrainConfig`].

use crate::settings;
use hyperbrain_brain_development::{BduError, ConnectionParameters, ConnectivityManager};
use hyperbrain_config::{validate_config, ConfigError, HyperbrainConfig};
use hyperbrain_npu_neural::{ActivationPattern, RegionId, RegionKind};
use hyperbrain_npu_plasticity::{LearningSystem, PlasticityError};
use hyperbrain_npu_substrate::{BrainError, HypergraphBrain, RegionBehavior};
use hyperbrain_scheduler::{
    AutonomousScheduler, SchedulerError, SharedBrain, SharedLearning, SubstrateDispatcher,
};
use hyperbrain_state_manager::{shared, MemoryDb, PersistenceBackend, PersistenceHandle, RunId};
use parking_lot::Mutex;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Debug, thiserror::Error)]
pub enum RuntimeError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Substrate(#[from] BrainError),

    #[error(transparent)]
    Connectivity(#[from] BduError),

    #[error(transparent)]
    Learning(#[from] PlasticityError),

    #[error(transparent)]
    Scheduler(#[from] SchedulerError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, RuntimeError>;

pub struct HyperbrainRuntime {
    config: HyperbrainConfig,
    brain: SharedBrain,
    connectivity: ConnectivityManager,
    learning: Option<SharedLearning>,
    persistence: Option<(PersistenceHandle, RunId)>,
    scheduler: Arc<AutonomousScheduler>,
    closed: AtomicBool,
}

impl HyperbrainRuntime {
    /// Validate `config` and wire every component.
    ///
    /// A persistence store that cannot be opened is logged and skipped; the
    /// runtime then works exactly as with persistence disabled.
    pub fn from_config(config: &HyperbrainConfig) -> Result<Self> {
        validate_config(config)?;

        let persistence = if config.persistence.enabled {
            open_persistence(config)
        } else {
            None
        };

        let mut brain = HypergraphBrain::new(settings::substrate_config(config));
        if let Some((handle, run)) = &persistence {
            brain.attach_persistence(handle, *run);
        }
        let brain = Arc::new(Mutex::new(brain));

        let seed = config.connectivity_seed();
        let connectivity = if config.connectivity.load_default_patterns {
            ConnectivityManager::with_default_patterns(seed)
        } else {
            match seed {
                Some(seed) => ConnectivityManager::with_seed(seed),
                None => ConnectivityManager::new(),
            }
        };

        let learning = if config.learning.enabled {
            let mut system = LearningSystem::new(settings::learning_config(config))?;
            if let Some((handle, run)) = &persistence {
                system.attach_persistence(handle.clone(), *run);
            }
            Some(Arc::new(Mutex::new(system)))
        } else {
            None
        };

        let mut dispatcher = SubstrateDispatcher::new(brain.clone())
            .with_prune_threshold(config.scheduler.prune_threshold)
            .with_tick_every_cycle(config.scheduler.tick_every_cycle);
        if let Some(learning) = &learning {
            dispatcher = dispatcher.with_learning(learning.clone());
        }
        if let Some((handle, run)) = &persistence {
            dispatcher = dispatcher.with_persistence(handle.clone(), *run);
        }
        let scheduler = Arc::new(AutonomousScheduler::new(
            settings::scheduler_config(config),
            Box::new(dispatcher),
        ));

        info!(
            target: "hyperbrain",
            "Runtime ready (learning: {}, persistence: {}, patterns: {})",
            learning.is_some(),
            persistence.is_some(),
            connectivity.pattern_names().len()
        );
        Ok(Self {
            config: config.clone(),
            brain,
            connectivity,
            learning,
            persistence,
            scheduler,
            closed: AtomicBool::new(false),
        })
    }

    pub fn config(&self) -> &HyperbrainConfig {
        &self.config
    }

    pub fn brain(&self) -> &SharedBrain {
        &self.brain
    }

    pub fn connectivity(&self) -> &ConnectivityManager {
        &self.connectivity
    }

    pub fn learning(&self) -> Option<&SharedLearning> {
        self.learning.as_ref()
    }

    pub fn scheduler(&self) -> &Arc<AutonomousScheduler> {
        &self.scheduler
    }

    pub fn persistence(&self) -> Option<&(PersistenceHandle, RunId)> {
        self.persistence.as_ref()
    }

    /// Create a region and register it for wiring
    pub fn create_region(
        &self,
        name: &str,
        kind: RegionKind,
        pattern: ActivationPattern,
        neuron_count: usize,
    ) -> Result<RegionId> {
        let id = self
            .brain
            .lock()
            .create_region(name, kind, pattern, neuron_count)?;
        self.connectivity.register_region(name, id);
        Ok(id)
    }

    /// Attach `behavior` to a region, returning the one it replaces.
    /// With persistence open, the behavior receives the handle and run first.
    pub fn attach_behavior(
        &self,
        region: RegionId,
        mut behavior: Box<dyn RegionBehavior>,
    ) -> Result<Option<Box<dyn RegionBehavior>>> {
        let mut brain = self.brain.lock();
        if brain.region(region).is_none() {
            return Err(BrainError::RegionNotFound(region).into());
        }
        if let Some((handle, run)) = &self.persistence {
            behavior.attach_persistence(handle.clone(), *run);
        }
        Ok(brain.set_region_behavior(region, behavior)?)
    }

    /// Wire `source` onto `target` with a registered pattern
    pub fn connect(&self, source: &str, target: &str, pattern: &str) -> Result<usize> {
        let mut brain = self.brain.lock();
        Ok(self
            .connectivity
            .connect_regions_with_pattern(&mut brain, source, target, pattern)?)
    }

    /// Wire `source` onto `target` with explicit parameters
    pub fn connect_with(
        &self,
        source: &str,
        target: &str,
        params: &ConnectionParameters,
    ) -> Result<usize> {
        let mut brain = self.brain.lock();
        Ok(self
            .connectivity
            .connect_regions(&mut brain, source, target, params)?)
    }

    /// Run the scheduler loop on the calling thread at the configured frequency.
    /// Returns early if another thread clears the enabled flag.
    pub fn run(&self, iterations: u64) -> Result<u64> {
        if self.scheduler.is_running() {
            return Err(SchedulerError::AlreadyRunning.into());
        }
        let hz = self.config.scheduler.frequency_hz;
        self.scheduler.set_enabled(true);
        let executed = self.scheduler.run_autonomous_loop(Some(iterations), hz);
        self.scheduler.set_enabled(false);
        Ok(executed?)
    }

    /// Run the scheduler loop on a background thread until [`HyperbrainRuntime::shutdown`]
    pub fn start(&self, iterations: Option<u64>) -> Result<()> {
        Ok(self
            .scheduler
            .start(iterations, self.config.scheduler.frequency_hz)?)
    }

    /// Write `<checkpoint dir>/<name>.hbc` and return its path
    pub fn save_checkpoint(&self, name: &str, description: &str) -> Result<PathBuf> {
        let directory = self.config.resolve_data_path(&self.config.checkpoint.directory);
        std::fs::create_dir_all(&directory)?;
        let path = directory.join(format!("{}.hbc", name));
        self.brain
            .lock()
            .save_checkpoint(&path, &self.config.checkpoint.creator, description)?;
        Ok(path)
    }

    /// Stop the background loop (if any) and close the persistence run.
    /// Also runs on drop; the run is closed only once.
    pub fn shutdown(&self) {
        if self.scheduler.is_running() && !self.scheduler.stop() {
            warn!(target: "hyperbrain", "Scheduler loop did not stop within the timeout");
        }
        if self.closed.swap(true, Ordering::AcqRel) {
            return;
        }
        if let Some((handle, run)) = &self.persistence {
            if let Err(e) = handle.lock().end_run(*run) {
                warn!(target: "hyperbrain", "Failed to close persistence run {}: {}", run, e);
            }
        }
    }
}

impl Drop for HyperbrainRuntime {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn open_persistence(config: &HyperbrainConfig) -> Option<(PersistenceHandle, RunId)> {
    let path = config.resolve_data_path(&config.persistence.path);
    let opened = MemoryDb::open(&path).and_then(|mut db| {
        let run = db.begin_run(&config.persistence.run_label)?;
        Ok((db, run))
    });
    match opened {
        Ok((db, run)) => {
            info!(target: "hyperbrain", "Persistence at {} ({})", path.display(), run);
            Some((shared(db), run))
        }
        Err(e) => {
            warn!(
                target: "hyperbrain",
                "Persistence unavailable at {}: {}; continuing without it",
                path.display(),
                e
            );
            None
        }
    }
}
