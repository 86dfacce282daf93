// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Configuration file loading with override support
//!
//! Three tiers, later ones winning:
//! 1. TOML file (base values)
//! 2. `HYPERBRAIN_*` environment variables
//! 3. CLI overrides given as dotted keys (`scheduler.frequency_hz=20`)

use crate::{ConfigError, ConfigResult, HyperbrainConfig};
use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use toml::Value;

pub const CONFIG_FILE_NAME: &str = "hyperbrain_configuration.toml";
pub const CONFIG_PATH_ENV: &str = "HYPERBRAIN_CONFIG_PATH";

/// Find the HyperBrain configuration file
///
/// Search order:
/// 1. `HYPERBRAIN_CONFIG_PATH` environment variable
/// 2. `./hyperbrain_configuration.toml`
/// 3. The same file name in up to 5 parent directories
pub fn find_config_file() -> ConfigResult<PathBuf> {
    if let Ok(env_path) = env::var(CONFIG_PATH_ENV) {
        let path = PathBuf::from(env_path);
        if path.exists() {
            return Ok(path);
        }
        return Err(ConfigError::FileNotFound(format!(
            "Config file specified by {} not found: {}",
            CONFIG_PATH_ENV,
            path.display()
        )));
    }

    let mut search_paths = Vec::new();
    if let Ok(cwd) = env::current_dir() {
        search_paths.push(cwd.join(CONFIG_FILE_NAME));
        let mut current = cwd.as_path();
        for _ in 0..5 {
            match current.parent() {
                Some(parent) => {
                    search_paths.push(parent.join(CONFIG_FILE_NAME));
                    current = parent;
                }
                None => break,
            }
        }
    }

    if let Some(found) = search_paths.iter().find(|p| p.exists()) {
        return Ok(found.clone());
    }

    let search_list = search_paths
        .iter()
        .map(|p| format!("  - {}", p.display()))
        .collect::<Vec<_>>()
        .join("\n");
    Err(ConfigError::FileNotFound(format!(
        "'{}' not found in any of these locations:\n{}\n\nSet {} to specify a custom location.",
        CONFIG_FILE_NAME, search_list, CONFIG_PATH_ENV
    )))
}

/// Load configuration from a TOML file and apply overrides
///
/// With `config_path = None` the file is located by [`find_config_file`].
/// The result is not validated; call [`crate::validate_config`] before use.
pub fn load_config(
    config_path: Option<&Path>,
    cli_overrides: Option<&HashMap<String, String>>,
) -> ConfigResult<HyperbrainConfig> {
    let config_file = match config_path {
        Some(path) => path.to_path_buf(),
        None => find_config_file()?,
    };
    let content = fs::read_to_string(&config_file)?;
    let mut config: HyperbrainConfig = toml::from_str(&content)?;

    apply_environment_overrides(&mut config);
    if let Some(cli) = cli_overrides {
        apply_cli_overrides(&mut config, cli)?;
    }
    Ok(config)
}

/// Environment variable → dotted key
const ENV_OVERRIDES: &[(&str, &str)] = &[
    ("HYPERBRAIN_LOG_LEVEL", "system.log_level"),
    ("HYPERBRAIN_DATA_DIR", "system.data_dir"),
    ("HYPERBRAIN_SEED", "system.seed"),
    ("HYPERBRAIN_LEARNING_ENABLED", "learning.enabled"),
    ("HYPERBRAIN_SCHEDULER_HZ", "scheduler.frequency_hz"),
    ("HYPERBRAIN_MAX_TASKS_PER_CYCLE", "scheduler.max_tasks_per_cycle"),
    ("HYPERBRAIN_PERSISTENCE_ENABLED", "persistence.enabled"),
    ("HYPERBRAIN_PERSISTENCE_PATH", "persistence.path"),
    ("HYPERBRAIN_CHECKPOINT_DIR", "checkpoint.directory"),
    ("HYPERBRAIN_LOG_DIR", "logging.log_dir"),
];

/// Apply `HYPERBRAIN_*` environment overrides
///
/// | Variable | Key |
/// |---|---|
/// | `HYPERBRAIN_LOG_LEVEL` | `system.log_level` |
/// | `HYPERBRAIN_DATA_DIR` | `system.data_dir` |
/// | `HYPERBRAIN_SEED` | `system.seed` |
/// | `HYPERBRAIN_LEARNING_ENABLED` | `learning.enabled` |
/// | `HYPERBRAIN_SCHEDULER_HZ` | `scheduler.frequency_hz` |
/// | `HYPERBRAIN_MAX_TASKS_PER_CYCLE` | `scheduler.max_tasks_per_cycle` |
/// | `HYPERBRAIN_PERSISTENCE_ENABLED` | `persistence.enabled` |
/// | `HYPERBRAIN_PERSISTENCE_PATH` | `persistence.path` |
/// | `HYPERBRAIN_CHECKPOINT_DIR` | `checkpoint.directory` |
/// | `HYPERBRAIN_LOG_DIR` | `logging.log_dir` |
///
/// Values that do not parse for their key are ignored.
pub fn apply_environment_overrides(config: &mut HyperbrainConfig) {
    for (var, key) in ENV_OVERRIDES {
        if let Ok(value) = env::var(var) {
            let _ = set_value(config, key, &value);
        }
    }
}

/// Apply CLI overrides keyed by dotted path (`section.field`)
///
/// Unlike environment overrides, an unknown key or an unparsable value is an
/// error: these come straight from the user.
pub fn apply_cli_overrides(
    config: &mut HyperbrainConfig,
    cli_overrides: &HashMap<String, String>,
) -> ConfigResult<()> {
    let mut keys: Vec<_> = cli_overrides.keys().collect();
    keys.sort();
    for key in keys {
        set_value(config, key, &cli_overrides[key])?;
    }
    Ok(())
}

/// Set one field by dotted key. The existing value decides how `raw` is parsed.
pub fn set_value(config: &mut HyperbrainConfig, key: &str, raw: &str) -> ConfigResult<()> {
    let (section, field) = key
        .split_once('.')
        .ok_or_else(|| ConfigError::InvalidValue(format!("'{}' is not a dotted key", key)))?;

    let mut root = Value::try_from(&*config)
        .map_err(|e| ConfigError::InvalidValue(format!("cannot serialize config: {}", e)))?;
    let table = root
        .get_mut(section)
        .and_then(Value::as_table_mut)
        .ok_or_else(|| ConfigError::InvalidValue(format!("unknown section '{}'", section)))?;

    let parsed = match table.get(field) {
        Some(existing) => parse_like(existing, raw)
            .ok_or_else(|| ConfigError::InvalidValue(format!("{}: cannot parse '{}'", key, raw)))?,
        None if is_optional_field(section, field) => infer_value(raw),
        None => {
            return Err(ConfigError::InvalidValue(format!("unknown key '{}'", key)));
        }
    };
    table.insert(field.to_string(), parsed);

    *config = root
        .try_into()
        .map_err(|e: toml::de::Error| ConfigError::InvalidValue(format!("{}: {}", key, e)))?;
    Ok(())
}

/// Fields that are absent from the serialized form while unset
fn is_optional_field(section: &str, field: &str) -> bool {
    matches!((section, field), ("system", "seed") | ("connectivity", "seed"))
}

fn parse_like(existing: &Value, raw: &str) -> Option<Value> {
    let raw = raw.trim();
    match existing {
        Value::String(_) => Some(Value::String(raw.to_string())),
        Value::Integer(_) => raw.parse().ok().map(Value::Integer),
        Value::Float(_) => raw.parse().ok().map(Value::Float),
        Value::Boolean(_) => parse_bool(raw).map(Value::Boolean),
        Value::Array(_) => Some(Value::Array(
            raw.split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(|s| Value::String(s.to_string()))
                .collect(),
        )),
        Value::Datetime(_) | Value::Table(_) => None,
    }
}

fn infer_value(raw: &str) -> Value {
    let raw = raw.trim();
    if let Ok(i) = raw.parse() {
        Value::Integer(i)
    } else if let Ok(f) = raw.parse() {
        Value::Float(f)
    } else if let Some(b) = parse_bool(raw) {
        Value::Boolean(b)
    } else {
        Value::String(raw.to_string())
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}
