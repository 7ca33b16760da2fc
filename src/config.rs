//! Hook configuration.
//!
//! The hook reads a JSON file (by default [`DEFAULT_CONFIG_PATH`], relative
//! to the repository owner's working directory) such as:
//!
//! ```json
//! {
//!   "database_url": "postgres://git@localhost/pushrelay",
//!   "pool_size": 2,
//!   "connect_timeout_secs": 10,
//!   "log": { "level": "info", "file": "log/update.log" }
//! }
//! ```
//!
//! `PUSHRELAY_DATABASE_URL` overrides `database_url` so credentials need not
//! live in the file.

use crate::update_task::domain::HookEnvironment;
use camino::{Utf8Path, Utf8PathBuf};
use cap_std::ambient_authority;
use cap_std::fs_utf8::Dir;
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;

/// Configuration path used when `--config` is not given.
pub const DEFAULT_CONFIG_PATH: &str = "custom/conf/pushrelay.json";

/// Environment variable overriding the configured database URL.
pub const DATABASE_URL_VAR: &str = "PUSHRELAY_DATABASE_URL";

const DEFAULT_POOL_SIZE: u32 = 2;
const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;
const DEFAULT_LOG_LEVEL: &str = "warn";

/// Errors raised while loading the hook configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read config file {path}: {source}")]
    Read {
        /// Path of the configuration file.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The configuration file is not valid JSON for [`HookConfig`].
    #[error("failed to parse config file {path}: {source}")]
    Parse {
        /// Path of the configuration file.
        path: Utf8PathBuf,
        /// Underlying parse error.
        #[source]
        source: serde_json::Error,
    },

    /// Neither the file nor `PUSHRELAY_DATABASE_URL` names a database.
    #[error("database_url is not set in {path} or PUSHRELAY_DATABASE_URL")]
    MissingDatabaseUrl {
        /// Path of the configuration file.
        path: Utf8PathBuf,
    },

    /// The connection pool size is zero.
    #[error("pool_size must be at least 1")]
    InvalidPoolSize,
}

/// Logging settings for the hook process.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LogSettings {
    /// Default `tracing` filter directive, used when `RUST_LOG` is unset.
    ///
    /// Defaults to `warn`: without a log file, stderr is relayed to the
    /// pushing client as `remote:` lines.
    #[serde(default = "default_log_level")]
    pub level: String,
    /// File the hook appends its log to instead of stderr.
    #[serde(default)]
    pub file: Option<Utf8PathBuf>,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: None,
        }
    }
}

fn default_log_level() -> String {
    DEFAULT_LOG_LEVEL.to_owned()
}

const fn default_pool_size() -> u32 {
    DEFAULT_POOL_SIZE
}

const fn default_connect_timeout_secs() -> u64 {
    DEFAULT_CONNECT_TIMEOUT_SECS
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    #[serde(default)]
    database_url: Option<String>,
    #[serde(default = "default_pool_size")]
    pool_size: u32,
    #[serde(default = "default_connect_timeout_secs")]
    connect_timeout_secs: u64,
    #[serde(default)]
    log: LogSettings,
}

/// Validated hook configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HookConfig {
    database_url: String,
    pool_size: u32,
    connect_timeout: Duration,
    log: LogSettings,
}

impl HookConfig {
    /// Reads and validates the configuration file at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the file cannot be read or parsed, or when
    /// the resulting configuration is invalid.
    pub fn load(path: &Utf8Path, env: &impl HookEnvironment) -> Result<Self, ConfigError> {
        let contents = read_config_file(path).map_err(|source| ConfigError::Read {
            path: path.to_owned(),
            source,
        })?;
        Self::from_json(path, &contents, env)
    }

    /// Parses and validates configuration JSON; `path` is used in errors.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the JSON is malformed or the resulting
    /// configuration is invalid.
    pub fn from_json(
        path: &Utf8Path,
        contents: &str,
        env: &impl HookEnvironment,
    ) -> Result<Self, ConfigError> {
        let file: ConfigFile =
            serde_json::from_str(contents).map_err(|source| ConfigError::Parse {
                path: path.to_owned(),
                source,
            })?;

        let database_url = env
            .var(DATABASE_URL_VAR)
            .filter(|url| !url.trim().is_empty())
            .or(file.database_url)
            .filter(|url| !url.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingDatabaseUrl {
                path: path.to_owned(),
            })?;
        if file.pool_size == 0 {
            return Err(ConfigError::InvalidPoolSize);
        }

        Ok(Self {
            database_url,
            pool_size: file.pool_size,
            connect_timeout: Duration::from_secs(file.connect_timeout_secs),
            log: file.log,
        })
    }

    /// Returns the `PostgreSQL` connection URL.
    #[must_use]
    pub fn database_url(&self) -> &str {
        &self.database_url
    }

    /// Returns the maximum number of pooled connections.
    #[must_use]
    pub const fn pool_size(&self) -> u32 {
        self.pool_size
    }

    /// Returns how long to wait for a database connection.
    #[must_use]
    pub const fn connect_timeout(&self) -> Duration {
        self.connect_timeout
    }

    /// Returns the logging settings.
    #[must_use]
    pub const fn log(&self) -> &LogSettings {
        &self.log
    }
}

/// Splits `path` into its parent directory and file name.
pub(crate) fn split_file_path(path: &Utf8Path) -> std::io::Result<(&Utf8Path, &str)> {
    let file_name = path.file_name().ok_or_else(|| {
        std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            format!("path {path} does not name a file"),
        )
    })?;
    let parent = path
        .parent()
        .filter(|parent| !parent.as_str().is_empty())
        .unwrap_or_else(|| Utf8Path::new("."));
    Ok((parent, file_name))
}

fn read_config_file(path: &Utf8Path) -> std::io::Result<String> {
    let (parent, file_name) = split_file_path(path)?;
    let dir = Dir::open_ambient_dir(parent, ambient_authority())?;
    dir.read_to_string(file_name)
}
