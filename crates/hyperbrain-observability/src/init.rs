// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Logging initialization
//!
//! Console output always goes through `tracing-subscriber`'s `fmt` layer with
//! an `EnvFilter` built from [`CrateDebugFlags`]. With the `file-logging`
//! feature, [`init_logging`] also writes JSON logs into a timestamped folder
//! per run:
//!
//! ```text
//! ./logs/
//!   └── run_20250101_120000/
//!       ├── hyperbrain-substrate.log
//!       ├── hyperbrain-scheduler.log
//!       ├── ...
//!       └── hyperbrain.log (combined)
//! ```

use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use std::fs;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

use crate::cli::CrateDebugFlags;
use crate::config::LoggingOptions;

/// Folder name format of a run: `run_<RUN_FORMAT>`
pub const RUN_FORMAT: &str = "%Y%m%d_%H%M%S";

/// Keeps file writers alive; logs are flushed when it drops
pub struct LoggingGuard {
    #[cfg(feature = "file-logging")]
    _file_guards: Vec<tracing_appender::non_blocking::WorkerGuard>,
    log_dir: Option<PathBuf>,
}

impl LoggingGuard {
    fn console_only() -> Self {
        Self {
            #[cfg(feature = "file-logging")]
            _file_guards: Vec::new(),
            log_dir: None,
        }
    }

    /// Folder of this run's log files, if file logging is active
    pub fn log_dir(&self) -> Option<&Path> {
        self.log_dir.as_deref()
    }
}

fn build_filter(directives: &str) -> Result<EnvFilter> {
    EnvFilter::try_new(directives).with_context(|| format!("Invalid log filter '{}'", directives))
}

/// Install a console subscriber. Fails if a global subscriber is already set.
pub fn init_console_logging(debug_flags: &CrateDebugFlags, default_level: &str) -> Result<()> {
    let filter = build_filter(&debug_flags.to_filter_string_with_default(default_level))?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init()
        .map_err(|e| anyhow!("Failed to install console subscriber: {}", e))
}

/// Install whatever `options` asks for
pub fn init_from_options(
    options: &LoggingOptions,
    debug_flags: &CrateDebugFlags,
) -> Result<LoggingGuard> {
    if options.file_logging {
        return init_file_or_console(options, debug_flags);
    }
    if options.console {
        init_console_logging(debug_flags, &options.level)?;
    }
    Ok(LoggingGuard::console_only())
}

#[cfg(feature = "file-logging")]
fn init_file_or_console(options: &LoggingOptions, debug_flags: &CrateDebugFlags) -> Result<LoggingGuard> {
    init_logging(debug_flags, options)
}

#[cfg(not(feature = "file-logging"))]
fn init_file_or_console(options: &LoggingOptions, debug_flags: &CrateDebugFlags) -> Result<LoggingGuard> {
    init_console_logging(debug_flags, &options.level)?;
    tracing::warn!(
        target: "hyperbrain",
        "File logging requested but the file-logging feature is disabled; logging to console only"
    );
    Ok(LoggingGuard::console_only())
}

/// Console (if enabled) plus per-crate and combined JSON files for this run
#[cfg(feature = "file-logging")]
pub fn init_logging(debug_flags: &CrateDebugFlags, options: &LoggingOptions) -> Result<LoggingGuard> {
    use tracing_appender::rolling;
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;
    use tracing_subscriber::{Layer, Registry};

    let now = Utc::now();
    let run_folder = options
        .log_dir
        .join(format!("run_{}", now.format(RUN_FORMAT)));
    fs::create_dir_all(&run_folder)
        .with_context(|| format!("Failed to create log directory: {}", run_folder.display()))?;
    cleanup_old_logs(
        &options.log_dir,
        options.retention_days,
        options.retention_runs,
        now,
    )?;

    let filter = debug_flags.to_filter_string_with_default(&options.level);
    let mut layers: Vec<Box<dyn Layer<Registry> + Send + Sync>> = Vec::new();
    let mut file_guards = Vec::new();

    if options.console {
        layers.push(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_filter(build_filter(&filter)?)
                .boxed(),
        );
    }

    for crate_name in crate::KNOWN_CRATES {
        let appender = rolling::never(&run_folder, format!("{}.log", crate_name));
        let (writer, guard) = tracing_appender::non_blocking(appender);
        file_guards.push(guard);
        layers.push(
            tracing_subscriber::fmt::layer()
                .with_writer(writer)
                .with_target(true)
                .with_file(true)
                .with_line_number(true)
                .json()
                .with_filter(build_filter(&format!("{}=debug,off", crate_name))?)
                .boxed(),
        );
    }

    let combined = rolling::never(&run_folder, "hyperbrain.log");
    let (writer, guard) = tracing_appender::non_blocking(combined);
    file_guards.push(guard);
    layers.push(
        tracing_subscriber::fmt::layer()
            .with_writer(writer)
            .with_target(true)
            .with_file(true)
            .with_line_number(true)
            .json()
            .with_filter(build_filter(&filter)?)
            .boxed(),
    );

    Registry::default()
        .with(layers)
        .try_init()
        .map_err(|e| anyhow!("Failed to install logging subscriber: {}", e))?;

    Ok(LoggingGuard {
        _file_guards: file_guards,
        log_dir: Some(run_folder),
    })
}

/// Remove run folders older than `retention_days`, then the oldest ones beyond
/// `retention_runs`. Returns how many were removed.
pub fn cleanup_old_logs(
    base_log_dir: &Path,
    retention_days: u32,
    retention_runs: usize,
    now: DateTime<Utc>,
) -> Result<usize> {
    if !base_log_dir.exists() {
        return Ok(0);
    }
    let cutoff = now - chrono::Duration::days(i64::from(retention_days));

    let mut runs: Vec<(PathBuf, DateTime<Utc>)> = Vec::new();
    for entry in fs::read_dir(base_log_dir)? {
        let path = entry?.path();
        if !path.is_dir() {
            continue;
        }
        let started = path
            .file_name()
            .and_then(|n| n.to_str())
            .and_then(|n| n.strip_prefix("run_"))
            .and_then(|ts| NaiveDateTime::parse_from_str(ts, RUN_FORMAT).ok())
            .map(|naive| Utc.from_utc_datetime(&naive));
        if let Some(started) = started {
            runs.push((path, started));
        }
    }
    runs.sort_by_key(|(_, started)| *started);

    let expired = runs.iter().filter(|(_, started)| *started < cutoff).count();
    let remaining = runs.len() - expired;
    let over_count = remaining.saturating_sub(retention_runs);

    let mut removed = 0;
    for (path, _) in runs.iter().take(expired + over_count) {
        match fs::remove_dir_all(path) {
            Ok(()) => removed += 1,
            Err(e) => eprintln!(
                "Warning: Failed to remove old log directory {}: {}",
                path.display(),
                e
            ),
        }
    }
    Ok(removed)
}
