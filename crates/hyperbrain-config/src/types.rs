// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Configuration type definitions
//!
//! Each struct maps to one section of `hyperbrain_configuration.toml`. Every
//! section is `#[serde(default)]`, so a file only needs the keys it changes.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct HyperbrainConfig {
    pub system: SystemConfig,
    pub substrate: SubstrateConfig,
    pub connectivity: ConnectivityConfig,
    pub learning: LearningConfig,
    pub scheduler: SchedulerConfig,
    pub persistence: PersistenceConfig,
    pub checkpoint: CheckpointConfig,
    pub logging: LoggingConfig,
}

/// System-level configuration
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct SystemConfig {
    pub log_level: String,
    pub data_dir: PathBuf,
    /// Seed shared by every random source; unset means entropy-seeded
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            data_dir: PathBuf::from("data"),
            seed: None,
        }
    }
}

/// Defaults for the hypergraph substrate
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct SubstrateConfig {
    pub neuron_decay_rate: f32,
    pub neuron_threshold: f32,
    pub max_neurons_per_region: usize,
}

impl Default for SubstrateConfig {
    fn default() -> Self {
        Self {
            neuron_decay_rate: 0.1,
            neuron_threshold: 0.5,
            max_neurons_per_region: 1_000_000,
        }
    }
}

/// Region-to-region wiring
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ConnectivityConfig {
    /// Register the built-in named connection patterns
    pub load_default_patterns: bool,
    /// Seed for the connectivity sampler; falls back to `system.seed`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

impl Default for ConnectivityConfig {
    fn default() -> Self {
        Self {
            load_default_patterns: true,
            seed: None,
        }
    }
}

/// Synaptic learning
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct LearningConfig {
    pub enabled: bool,
    pub hebbian_rate: f32,
    pub hebbian_depression_ratio: f32,
    pub activity_threshold: f32,
    pub stdp_a_plus: f32,
    pub stdp_a_minus: f32,
    pub stdp_tau_pre: f32,
    pub stdp_tau_post: f32,
    /// Largest spike-time difference (in ticks) considered by STDP
    pub stdp_window: u64,
    pub motivation_enabled: bool,
    /// Persist a statistics record every N update cycles (0 disables)
    pub persist_interval: u64,
}

impl Default for LearningConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            hebbian_rate: 0.05,
            hebbian_depression_ratio: 0.1,
            activity_threshold: 0.05,
            stdp_a_plus: 0.01,
            stdp_a_minus: 0.012,
            stdp_tau_pre: 20.0,
            stdp_tau_post: 20.0,
            stdp_window: 50,
            motivation_enabled: true,
            persist_interval: 100,
        }
    }
}

/// Autonomous scheduler
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct SchedulerConfig {
    pub max_tasks_per_cycle: usize,
    pub frequency_hz: f64,
    pub stop_timeout_ms: u64,
    /// Advance the substrate once per cycle even when no tick task is queued
    pub tick_every_cycle: bool,
    /// Consolidation prunes synapses below this weight
    pub prune_threshold: f32,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            max_tasks_per_cycle: 8,
            frequency_hz: 10.0,
            stop_timeout_ms: 2_000,
            tick_every_cycle: true,
            prune_threshold: 0.02,
        }
    }
}

/// MemoryDB persistence
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct PersistenceConfig {
    pub enabled: bool,
    /// MemoryDB directory; relative paths resolve against `system.data_dir`
    pub path: PathBuf,
    pub run_label: String,
}

impl Default for PersistenceConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            path: PathBuf::from("memory_db"),
            run_label: "hyperbrain".to_string(),
        }
    }
}

/// Checkpoint files
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct CheckpointConfig {
    /// Relative paths resolve against `system.data_dir`
    pub directory: PathBuf,
    pub creator: String,
}

impl Default for CheckpointConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("checkpoints"),
            creator: "hyperbrain".to_string(),
        }
    }
}

/// Log output
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub console: bool,
    pub file_logging: bool,
    pub log_dir: PathBuf,
    pub retention_days: u32,
    /// Per-crate debug targets, e.g. `["hyperbrain-scheduler"]`
    pub debug_crates: Vec<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            console: true,
            file_logging: false,
            log_dir: PathBuf::from("logs"),
            retention_days: 7,
            debug_crates: Vec::new(),
        }
    }
}

impl HyperbrainConfig {
    /// `path` resolved against `system.data_dir` when relative
    pub fn resolve_data_path(&self, path: &std::path::Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.system.data_dir.join(path)
        }
    }

    /// Seed for connectivity sampling
    pub fn connectivity_seed(&self) -> Option<u64> {
        self.connectivity.seed.or(self.system.seed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config: HyperbrainConfig = toml::from_str(
            r#"
            [scheduler]
            frequency_hz = 25.0

            [system]
            seed = 7
            "#,
        )
        .unwrap();
        assert_eq!(config.scheduler.frequency_hz, 25.0);
        assert_eq!(config.scheduler.max_tasks_per_cycle, 8);
        assert_eq!(config.connectivity_seed(), Some(7));
        assert_eq!(config.learning, LearningConfig::default());
    }

    #[test]
    fn test_shipped_file_matches_defaults() {
        let shipped = include_str!("../../../hyperbrain_configuration.toml");
        let config: HyperbrainConfig = toml::from_str(shipped).unwrap();
        assert_eq!(config, HyperbrainConfig::default());
    }

    #[test]
    fn test_connectivity_seed_wins_over_system_seed() {
        let mut config = HyperbrainConfig::default();
        config.system.seed = Some(1);
        config.connectivity.seed = Some(2);
        assert_eq!(config.connectivity_seed(), Some(2));
    }

    #[test]
    fn test_resolve_data_path() {
        let config = HyperbrainConfig::default();
        assert_eq!(
            config.resolve_data_path(&config.persistence.path),
            PathBuf::from("data").join("memory_db")
        );
        let absolute = std::env::temp_dir().join("db");
        assert_eq!(config.resolve_data_path(&absolute), absolute);
    }
}
