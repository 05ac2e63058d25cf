//! Logging initialisation and destination selection.
//!
//! # Design
//! - Centralises logging setup (fmt or JSON) with a single entry point.
//! - Writes to an append-mode log file when one is configured, otherwise stderr.
//! - `RUST_LOG` always takes precedence over the configured level.

use std::fs::{File, OpenOptions};
use std::io;
use std::path::Path;
use std::sync::Mutex;

use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::error::{Result, TelemetryError};

/// Default logging target when `RUST_LOG` is not provided.
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Logging target used when the agent runs in debug mode.
pub const DEBUG_LOG_LEVEL: &str = "debug";

/// Configure and install the global tracing subscriber.
///
/// # Errors
///
/// Returns an error if the log file cannot be opened or the tracing subscriber
/// cannot be installed (for example, because another subscriber has already
/// been set globally).
pub fn init_logging(config: &LoggingConfig<'_>) -> Result<()> {
    let writer = match config.log_file {
        Some(path) => BoxMakeWriter::new(Mutex::new(open_log_file(path)?)),
        None => BoxMakeWriter::new(io::stderr),
    };
    let ansi = config.log_file.is_none();

    match config.format {
        LogFormat::Json => tracing_subscriber::registry()
            .with(build_env_filter(config.level))
            .with(
                fmt::layer()
                    .json()
                    .with_target(false)
                    .with_thread_ids(false)
                    .with_writer(writer),
            )
            .try_init(),
        LogFormat::Pretty => tracing_subscriber::registry()
            .with(build_env_filter(config.level))
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_thread_ids(false)
                    .with_ansi(ansi)
                    .with_writer(writer),
            )
            .try_init(),
    }
    .map_err(|source| TelemetryError::SubscriberInstall { source })
}

/// Open (or create) a log file for appending.
///
/// # Errors
///
/// Returns an error when the file cannot be created or opened for writing.
pub fn open_log_file(path: &Path) -> Result<File> {
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|source| TelemetryError::LogFile {
            path: path.to_path_buf(),
            source,
        })
}

/// Logging configuration.
#[derive(Debug, Clone)]
pub struct LoggingConfig<'a> {
    /// Log level string (e.g., `info`, `debug`).
    pub level: &'a str,
    /// Output format selection for the tracing subscriber.
    pub format: LogFormat,
    /// Append-mode log file; stderr is used when absent.
    pub log_file: Option<&'a Path>,
}

/// Available output formats for the logger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Emit logs as structured JSON objects.
    Json,
    /// Emit human-readable log lines.
    Pretty,
}

impl LogFormat {
    /// Choose a sensible default for the current build.
    #[must_use]
    pub const fn infer() -> Self {
        if cfg!(debug_assertions) {
            Self::Pretty
        } else {
            Self::Json
        }
    }

    /// Map a configuration string onto a format, falling back to [`LogFormat::infer`].
    #[must_use]
    pub fn from_name(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "json" => Self::Json,
            "pretty" | "text" => Self::Pretty,
            _ => Self::infer(),
        }
    }
}

fn build_env_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn log_format_from_name_parses_variants() {
        assert_eq!(LogFormat::from_name("json"), LogFormat::Json);
        assert_eq!(LogFormat::from_name(" Pretty "), LogFormat::Pretty);
        assert_eq!(LogFormat::from_name("text"), LogFormat::Pretty);
        assert_eq!(LogFormat::from_name("unknown"), LogFormat::infer());
    }

    #[test]
    fn open_log_file_appends_to_existing_content() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("agent.log");
        std::fs::write(&path, "first\n")?;

        let mut file = open_log_file(&path)?;
        file.write_all(b"second\n")?;
        drop(file);

        assert_eq!(std::fs::read_to_string(&path)?, "first\nsecond\n");
        Ok(())
    }

    #[test]
    fn open_log_file_reports_missing_directory() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("missing").join("agent.log");
        let err = open_log_file(&path).expect_err("parent directory does not exist");
        assert!(matches!(err, TelemetryError::LogFile { path: ref failed, .. } if *failed == path));
    }

    #[test]
    fn init_logging_rejects_a_second_subscriber() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("agent.log");
        let config = LoggingConfig {
            level: DEFAULT_LOG_LEVEL,
            format: LogFormat::Pretty,
            log_file: Some(&path),
        };

        // Another test in this binary may already own the global subscriber.
        match init_logging(&config) {
            Ok(()) | Err(TelemetryError::SubscriberInstall { .. }) => {}
            Err(other) => panic!("unexpected logging error: {other}"),
        }
        let second = init_logging(&config).expect_err("global subscriber already set");
        assert!(matches!(second, TelemetryError::SubscriberInstall { .. }));
        assert!(path.exists());
    }

    #[test]
    fn init_logging_fails_before_install_when_log_file_unavailable() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("missing").join("agent.log");
        let config = LoggingConfig {
            level: DEBUG_LOG_LEVEL,
            format: LogFormat::Json,
            log_file: Some(&path),
        };

        let err = init_logging(&config).expect_err("log directory does not exist");
        assert!(matches!(err, TelemetryError::LogFile { path: ref failed, .. } if *failed == path));
    }
}
