//! Log subscriber installation for the hook binary.
//!
//! Events go to stderr, which git relays to the pushing client, unless the
//! configuration names a log file.

use crate::config::{LogSettings, split_file_path};
use cap_std::ambient_authority;
use cap_std::fs_utf8::{Dir, OpenOptions};
use std::sync::Mutex;
use thiserror::Error;
use tracing_subscriber::EnvFilter;

/// Errors raised while installing the log subscriber.
#[derive(Debug, Error)]
pub enum TelemetryError {
    /// The filter directive is invalid.
    #[error("invalid log filter '{directive}': {source}")]
    Filter {
        /// Rejected directive.
        directive: String,
        /// Underlying parse error.
        #[source]
        source: tracing_subscriber::filter::ParseError,
    },

    /// The log file could not be opened for appending.
    #[error("failed to open log file: {0}")]
    LogFile(#[source] std::io::Error),

    /// A global subscriber was already installed.
    #[error("failed to install log subscriber: {0}")]
    Install(String),
}

/// Builds the event filter: `RUST_LOG` when set, else the configured level.
///
/// # Errors
///
/// Returns [`TelemetryError::Filter`] when the configured level is not a
/// valid filter directive.
pub fn build_filter(settings: &LogSettings) -> Result<EnvFilter, TelemetryError> {
    EnvFilter::try_from_default_env().or_else(|_| {
        EnvFilter::try_new(&settings.level).map_err(|source| TelemetryError::Filter {
            directive: settings.level.clone(),
            source,
        })
    })
}

/// Installs the global `tracing` subscriber for the hook process.
///
/// # Errors
///
/// Returns [`TelemetryError`] when the filter is invalid, the log file
/// cannot be opened, or a subscriber is already installed.
pub fn init(settings: &LogSettings) -> Result<(), TelemetryError> {
    let filter = build_filter(settings)?;
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact();

    let installed = match &settings.file {
        Some(path) => {
            let (parent, file_name) = split_file_path(path).map_err(TelemetryError::LogFile)?;
            let dir =
                Dir::open_ambient_dir(parent, ambient_authority()).map_err(TelemetryError::LogFile)?;
            let file = dir
                .open_with(file_name, OpenOptions::new().create(true).append(true))
                .map_err(TelemetryError::LogFile)?
                .into_std();
            builder
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .try_init()
        }
        None => builder.with_writer(std::io::stderr).try_init(),
    };
    installed.map_err(|err| TelemetryError::Install(err.to_string()))
}
