// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! File configuration mapped onto each crate's runtime settings

use hyperbrain_config::HyperbrainConfig;
use hyperbrain_npu_neural::NeuronParameters;
use hyperbrain_npu_plasticity::{HebbianConfig, LearningConfig, MotivationConfig, StdpConfig};
use hyperbrain_npu_substrate::SubstrateConfig;
use hyperbrain_observability::{CrateDebugFlags, LoggingOptions};
use hyperbrain_scheduler::SchedulerConfig;

pub fn substrate_config(config: &HyperbrainConfig) -> SubstrateConfig {
    SubstrateConfig {
        neuron_params: NeuronParameters {
            decay_rate: config.substrate.neuron_decay_rate,
            threshold: config.substrate.neuron_threshold,
        },
        max_neurons_per_region: config.substrate.max_neurons_per_region,
    }
}

pub fn learning_config(config: &HyperbrainConfig) -> LearningConfig {
    let learning = &config.learning;
    LearningConfig {
        hebbian: HebbianConfig {
            rate: learning.hebbian_rate,
            depression_ratio: learning.hebbian_depression_ratio,
            activity_threshold: learning.activity_threshold,
        },
        stdp: StdpConfig {
            tau_pre: learning.stdp_tau_pre,
            tau_post: learning.stdp_tau_post,
            a_plus: learning.stdp_a_plus,
            a_minus: learning.stdp_a_minus,
            window: learning.stdp_window,
        },
        motivation: MotivationConfig {
            enabled: learning.motivation_enabled,
            ..MotivationConfig::default()
        },
        persist_interval: learning.persist_interval,
    }
}

pub fn scheduler_config(config: &HyperbrainConfig) -> SchedulerConfig {
    SchedulerConfig {
        max_tasks_per_cycle: config.scheduler.max_tasks_per_cycle,
        frequency_hz: config.scheduler.frequency_hz,
        stop_timeout_ms: config.scheduler.stop_timeout_ms,
    }
}

pub fn logging_options(config: &HyperbrainConfig) -> LoggingOptions {
    LoggingOptions {
        level: config.system.log_level.to_lowercase(),
        console: config.logging.console,
        file_logging: config.logging.file_logging,
        log_dir: config.logging.log_dir.clone(),
        retention_days: config.logging.retention_days,
        ..LoggingOptions::default()
    }
}

/// Debug targets from the file, merged into flags parsed from the command line
pub fn debug_flags(config: &HyperbrainConfig, mut flags: CrateDebugFlags) -> CrateDebugFlags {
    for crate_name in &config.logging.debug_crates {
        flags.enable(crate_name);
    }
    flags
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_agree() {
        let config = HyperbrainConfig::default();
        assert_eq!(substrate_config(&config), SubstrateConfig::default());
        assert_eq!(learning_config(&config), LearningConfig::default());
        assert_eq!(scheduler_config(&config), SchedulerConfig::default());
    }

    #[test]
    fn test_debug_crates_are_merged() {
        let mut config = HyperbrainConfig::default();
        config.logging.debug_crates = vec!["hyperbrain-bdu".to_string()];
        let flags = debug_flags(
            &config,
            CrateDebugFlags::from_args(["--debug-hyperbrain-scheduler".to_string()]),
        );
        assert!(flags.is_enabled("hyperbrain-bdu"));
        assert!(flags.is_enabled("hyperbrain-scheduler"));
    }
}
