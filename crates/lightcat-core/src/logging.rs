//! Logging configuration and subscriber setup

use chrono::Local;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::path::PathBuf;
use tracing::level_filters::LevelFilter;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    filter::EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt, Layer,
};

use crate::error::{CoreError, Result};

const LOG_FILE_PREFIX: &str = "lightcat_";
const LOG_FILE_EXTENSION: &str = "log";

/// Logging settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Default level (`trace`, `debug`, `info`, `warn`, `error`)
    pub level: String,
    /// Directory receiving log files
    pub log_path: PathBuf,
    /// Number of log files kept when cleaning up
    pub max_files: usize,
    pub console_output: bool,
    pub file_output: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            log_path: PathBuf::from("logs"),
            max_files: 10,
            console_output: true,
            file_output: false,
        }
    }
}

impl LogConfig {
    /// Configured level, `INFO` if it does not parse
    pub fn parse_level(&self) -> LevelFilter {
        self.level.parse().unwrap_or(LevelFilter::INFO)
    }

    pub fn ensure_log_directory(&self) -> std::io::Result<()> {
        if self.file_output {
            std::fs::create_dir_all(&self.log_path)?;
        }
        Ok(())
    }

    /// Log file for this run, named after the local start time
    pub fn current_log_path(&self) -> PathBuf {
        let timestamp = Local::now().format("%Y-%m-%d_%H-%M-%S");
        self.log_path
            .join(format!("{LOG_FILE_PREFIX}{timestamp}.{LOG_FILE_EXTENSION}"))
    }

    /// Delete the oldest log files so that at most `max_files - 1` remain,
    /// leaving room for the one about to be created.
    pub fn cleanup_old_logs(&self) -> std::io::Result<usize> {
        if !self.log_path.is_dir() {
            return Ok(0);
        }

        let mut logs: Vec<PathBuf> = std::fs::read_dir(&self.log_path)?
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| {
                path.is_file()
                    && path.extension().and_then(|ext| ext.to_str()) == Some(LOG_FILE_EXTENSION)
                    && path
                        .file_name()
                        .and_then(|name| name.to_str())
                        .is_some_and(|name| name.starts_with(LOG_FILE_PREFIX))
            })
            .collect();

        let keep = self.max_files.saturating_sub(1);
        if logs.len() <= keep {
            return Ok(0);
        }

        // Timestamped names sort chronologically
        logs.sort();
        let excess = logs.len() - keep;
        for path in &logs[..excess] {
            std::fs::remove_file(path)?;
        }
        Ok(excess)
    }
}

/// Keeps the file writer thread alive
pub struct LogGuard {
    _guard: WorkerGuard,
}

/// Install the global tracing subscriber.
///
/// `RUST_LOG` takes precedence over the configured level. Returns a guard
/// when file output is enabled; dropping it flushes and stops the writer.
pub fn init(config: &LogConfig) -> Result<Option<LogGuard>> {
    config.ensure_log_directory()?;

    if let Err(e) = config.cleanup_old_logs() {
        eprintln!("Warning: Failed to cleanup old log files: {}", e);
    }

    let filter = || {
        EnvFilter::builder()
            .with_default_directive(config.parse_level().into())
            .from_env_lossy()
    };

    let console_layer = config.console_output.then(|| {
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_ansi(true)
            .with_target(false)
            .with_filter(filter())
    });

    let (file_layer, guard) = if config.file_output {
        let log_path = config.current_log_path();
        let file = File::create(&log_path)?;
        let (non_blocking, worker_guard) = tracing_appender::non_blocking(file);

        let layer = fmt::layer()
            .with_writer(non_blocking)
            .with_ansi(false)
            .with_filter(filter());
        (Some(layer), Some(LogGuard { _guard: worker_guard }))
    } else {
        (None, None)
    };

    tracing_subscriber::registry()
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| CoreError::Config(format!("logging already initialized: {e}")))?;

    tracing::info!("Logging initialized at level: {}", config.level);
    Ok(guard)
}
