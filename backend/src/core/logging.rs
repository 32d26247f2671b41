//! Logging setup
//!
//! The entry point calls [`init`] once and keeps the returned guard alive
//! for the whole run; dropping it uninstalls the subscriber. `RUST_LOG`,
//! when set, overrides the configured level.

use crate::core::config::LoggingConfig;
use std::fs::{self, File, OpenOptions};
use std::path::PathBuf;
use std::sync::Mutex;
use thiserror::Error;
use tracing::dispatcher::DefaultGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::{fmt, EnvFilter, Registry};

#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("Invalid log filter '{filter}': {message}")]
    Filter { filter: String, message: String },

    #[error("Failed to open log file {path}: {source}")]
    File {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Keeps the subscriber installed while alive
pub struct LoggingGuard {
    _default: DefaultGuard,
    log_file: Option<PathBuf>,
}

impl LoggingGuard {
    pub fn log_file(&self) -> Option<&PathBuf> {
        self.log_file.as_ref()
    }
}

/// Install console logging, plus a plain-text file layer if configured
pub fn init(config: &LoggingConfig) -> Result<LoggingGuard, LoggingError> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&config.log_level).map_err(|e| LoggingError::Filter {
            filter: config.log_level.clone(),
            message: e.to_string(),
        })?,
    };

    let file_layer = match &config.log_file {
        Some(path) => {
            let file = open_log_file(path)?;
            Some(
                fmt::layer()
                    .with_ansi(false)
                    .with_target(true)
                    .with_writer(Mutex::new(file)),
            )
        }
        None => None,
    };

    let subscriber = Registry::default()
        .with(filter)
        .with(fmt::layer().with_target(false))
        .with(file_layer);

    Ok(LoggingGuard {
        _default: tracing::subscriber::set_default(subscriber),
        log_file: config.log_file.clone(),
    })
}

fn open_log_file(path: &PathBuf) -> Result<File, LoggingError> {
    let to_error = |source| LoggingError::File {
        path: path.clone(),
        source,
    };
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir).map_err(to_error)?;
    }
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(to_error)
}
