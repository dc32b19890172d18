//! Subscriber installation for each supported log sink.
//!
//! # Design
//! - One entry point installs the global subscriber for the configured sink.
//! - `RUST_LOG` overrides the configured level when present.
//! - File output appends to a single file; rotation is left to the host.

use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::error::{Result, TelemetryError};

/// Default logging level when neither configuration nor `RUST_LOG` set one.
pub const DEFAULT_LOG_LEVEL: &str = "info";
/// File name used inside the configured log folder.
pub const LOG_FILE_NAME: &str = "edi-connector.log";

/// Destination for log records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogSink {
    /// Human-readable lines on stdout.
    StdoutText,
    /// One JSON object per line on stdout.
    StdoutJson,
    /// Plain-text lines appended to [`LOG_FILE_NAME`] inside `folder`.
    File {
        /// Directory holding the log file; created when missing.
        folder: PathBuf,
    },
    /// Operating-system event log. Not available in this build; records go to
    /// stdout as text and a warning is emitted once the subscriber is live.
    Event,
}

/// Logging configuration.
#[derive(Debug, Clone)]
pub struct LoggingConfig<'a> {
    /// Level directive (`error`, `info`, `debug`).
    pub level: &'a str,
    /// Output destination.
    pub sink: LogSink,
}

impl Default for LoggingConfig<'_> {
    fn default() -> Self {
        Self {
            level: DEFAULT_LOG_LEVEL,
            sink: LogSink::StdoutText,
        }
    }
}

/// Configure and install the global tracing subscriber.
///
/// # Errors
///
/// Returns an error if the log file cannot be opened or the subscriber cannot
/// be installed (for example, because another subscriber is already set).
pub fn init_logging(config: &LoggingConfig<'_>) -> Result<()> {
    let filter = build_env_filter(config.level);
    let installed = match &config.sink {
        LogSink::StdoutText | LogSink::Event => tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_target(false).with_thread_ids(false))
            .try_init(),
        LogSink::StdoutJson => tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .json()
                    .with_target(false)
                    .with_thread_ids(false),
            )
            .try_init(),
        LogSink::File { folder } => {
            let file = open_log_file(folder)?;
            tracing_subscriber::registry()
                .with(filter)
                .with(
                    fmt::layer()
                        .with_ansi(false)
                        .with_target(false)
                        .with_thread_ids(false)
                        .with_writer(Mutex::new(file)),
                )
                .try_init()
        }
    };
    installed.map_err(|source| TelemetryError::SubscriberInstall { source })?;

    if config.sink == LogSink::Event {
        tracing::warn!(
            fallback = "STDOUT_TEXT",
            "event log output is not available in this build"
        );
    }
    Ok(())
}

/// Open `<folder>/edi-connector.log` for appending, creating the folder and
/// file when missing.
///
/// # Errors
///
/// Returns an error when the folder cannot be created or the file cannot be
/// opened.
pub fn open_log_file(folder: &Path) -> Result<File> {
    fs::create_dir_all(folder).map_err(|source| TelemetryError::LogDirectory {
        path: folder.to_path_buf(),
        source,
    })?;
    let path = folder.join(LOG_FILE_NAME);
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .map_err(|source| TelemetryError::LogFile { path, source })
}

fn build_env_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level))
}
