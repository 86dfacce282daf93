// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Configuration validation
//!
//! Every check runs; all problems are reported together in one
//! [`ConfigError::ValidationError`].

use crate::{ConfigError, ConfigResult, HyperbrainConfig};

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Highest scheduler frequency accepted from configuration
pub const MAX_FREQUENCY_HZ: f64 = 1_000.0;

/// A single validation problem
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("Missing required configuration: {field}")]
    MissingRequired { field: String },

    #[error("Invalid configuration value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },
}

fn invalid(field: &str, reason: impl Into<String>) -> ConfigValidationError {
    ConfigValidationError::InvalidValue {
        field: field.to_string(),
        reason: reason.into(),
    }
}

/// Validate the complete configuration
pub fn validate_config(config: &HyperbrainConfig) -> ConfigResult<()> {
    let errors = collect_errors(config);
    if errors.is_empty() {
        return Ok(());
    }
    let error_messages = errors
        .iter()
        .map(|e| format!("  - {}", e))
        .collect::<Vec<_>>()
        .join("\n");
    Err(ConfigError::ValidationError(format!(
        "Configuration validation failed:\n{}",
        error_messages
    )))
}

/// Every problem found in `config`, in section order
pub fn collect_errors(config: &HyperbrainConfig) -> Vec<ConfigValidationError> {
    let mut errors = Vec::new();
    validate_system(config, &mut errors);
    validate_substrate(config, &mut errors);
    validate_learning(config, &mut errors);
    validate_scheduler(config, &mut errors);
    validate_storage(config, &mut errors);
    errors
}

fn validate_system(config: &HyperbrainConfig, errors: &mut Vec<ConfigValidationError>) {
    let level = config.system.log_level.to_lowercase();
    if !LOG_LEVELS.contains(&level.as_str()) {
        errors.push(invalid(
            "system.log_level",
            format!("must be one of {}", LOG_LEVELS.join(", ")),
        ));
    }
}

fn validate_substrate(config: &HyperbrainConfig, errors: &mut Vec<ConfigValidationError>) {
    let substrate = &config.substrate;
    if !(substrate.neuron_decay_rate.is_finite() && substrate.neuron_decay_rate >= 0.0) {
        errors.push(invalid("substrate.neuron_decay_rate", "must be finite and >= 0"));
    }
    if !(substrate.neuron_threshold.is_finite() && substrate.neuron_threshold > 0.0) {
        errors.push(invalid("substrate.neuron_threshold", "must be finite and > 0"));
    }
    if substrate.max_neurons_per_region == 0 {
        errors.push(invalid("substrate.max_neurons_per_region", "must be > 0"));
    }
}

fn validate_learning(config: &HyperbrainConfig, errors: &mut Vec<ConfigValidationError>) {
    let learning = &config.learning;
    for (field, value) in [
        ("learning.hebbian_rate", learning.hebbian_rate),
        ("learning.hebbian_depression_ratio", learning.hebbian_depression_ratio),
        ("learning.activity_threshold", learning.activity_threshold),
        ("learning.stdp_a_plus", learning.stdp_a_plus),
        ("learning.stdp_a_minus", learning.stdp_a_minus),
    ] {
        if !(value.is_finite() && value >= 0.0) {
            errors.push(invalid(field, "must be finite and >= 0"));
        }
    }
    for (field, value) in [
        ("learning.stdp_tau_pre", learning.stdp_tau_pre),
        ("learning.stdp_tau_post", learning.stdp_tau_post),
    ] {
        if !(value.is_finite() && value > 0.0) {
            errors.push(invalid(field, "must be finite and > 0"));
        }
    }
    if learning.stdp_window == 0 {
        errors.push(invalid("learning.stdp_window", "must be at least 1 tick"));
    }
}

fn validate_scheduler(config: &HyperbrainConfig, errors: &mut Vec<ConfigValidationError>) {
    let scheduler = &config.scheduler;
    if scheduler.max_tasks_per_cycle == 0 {
        errors.push(invalid("scheduler.max_tasks_per_cycle", "must be > 0"));
    }
    let hz = scheduler.frequency_hz;
    if !(hz.is_finite() && hz > 0.0 && hz <= MAX_FREQUENCY_HZ) {
        errors.push(invalid(
            "scheduler.frequency_hz",
            format!("must be in (0, {}]", MAX_FREQUENCY_HZ),
        ));
    }
    if !(scheduler.prune_threshold.is_finite() && scheduler.prune_threshold >= 0.0) {
        errors.push(invalid("scheduler.prune_threshold", "must be finite and >= 0"));
    }
}

fn validate_storage(config: &HyperbrainConfig, errors: &mut Vec<ConfigValidationError>) {
    if config.persistence.enabled {
        if config.persistence.path.as_os_str().is_empty() {
            errors.push(ConfigValidationError::MissingRequired {
                field: "persistence.path".to_string(),
            });
        }
        if config.persistence.run_label.trim().is_empty() {
            errors.push(ConfigValidationError::MissingRequired {
                field: "persistence.run_label".to_string(),
            });
        }
    }
    if config.checkpoint.creator.trim().is_empty() {
        errors.push(ConfigValidationError::MissingRequired {
            field: "checkpoint.creator".to_string(),
        });
    }
    if config.logging.file_logging {
        if config.logging.log_dir.as_os_str().is_empty() {
            errors.push(ConfigValidationError::MissingRequired {
                field: "logging.log_dir".to_string(),
            });
        }
        if config.logging.retention_days == 0 {
            errors.push(invalid("logging.retention_days", "must be at least 1"));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&HyperbrainConfig::default()).is_ok());
    }

    #[test]
    fn test_invalid_frequency() {
        let mut config = HyperbrainConfig::default();
        config.scheduler.frequency_hz = 0.0;
        match validate_config(&config) {
            Err(ConfigError::ValidationError(msg)) => assert!(msg.contains("scheduler.frequency_hz")),
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_all_errors_are_collected() {
        let mut config = HyperbrainConfig::default();
        config.system.log_level = "loud".to_string();
        config.substrate.neuron_threshold = -1.0;
        config.learning.stdp_tau_pre = 0.0;
        config.persistence.enabled = true;
        config.persistence.run_label = " ".to_string();

        let errors = collect_errors(&config);
        let fields: Vec<_> = errors
            .iter()
            .map(|e| match e {
                ConfigValidationError::MissingRequired { field }
                | ConfigValidationError::InvalidValue { field, .. } => field.as_str(),
            })
            .collect();
        assert_eq!(
            fields,
            [
                "system.log_level",
                "substrate.neuron_threshold",
                "learning.stdp_tau_pre",
                "persistence.run_label",
            ]
        );
    }

    #[test]
    fn test_log_level_is_case_insensitive() {
        let mut config = HyperbrainConfig::default();
        config.system.log_level = "DEBUG".to_string();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_file_logging_needs_retention() {
        let mut config = HyperbrainConfig::default();
        config.logging.file_logging = true;
        config.logging.retention_days = 0;
        assert!(validate_config(&config).is_err());
    }
}
