//! Store configuration from environment.

use std::env;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

pub const DEFAULT_PG_PORT: u16 = 5432;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 5;
/// Fallback directory name under the platform temp directory.
pub const FALLBACK_DIR_NAME: &str = "aerospace_defense_data";

/// Why the relational store cannot even be attempted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("missing configuration: {0} is not set")]
    Missing(&'static str),

    #[error("invalid configuration: {key}={value}")]
    Invalid { key: &'static str, value: String },
}

/// Connection parameters for the relational store.
#[derive(Clone, PartialEq, Eq)]
pub struct RelationalConfig {
    pub host: String,
    pub database: String,
    pub user: String,
    pub password: Option<String>,
    pub port: u16,
}

impl RelationalConfig {
    pub fn new(
        host: impl Into<String>,
        database: impl Into<String>,
        user: impl Into<String>,
    ) -> Self {
        Self {
            host: host.into(),
            database: database.into(),
            user: user.into(),
            password: None,
            port: DEFAULT_PG_PORT,
        }
    }

    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Read `PGHOST`, `PGDATABASE`, `PGUSER`, `PGPASSWORD` and `PGPORT`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let required = |key: &'static str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .ok_or(ConfigError::Missing(key))
        };

        let host = required("PGHOST")?;
        let database = required("PGDATABASE")?;
        let user = required("PGUSER")?;
        let password = lookup("PGPASSWORD").filter(|v| !v.is_empty());
        let port = match lookup("PGPORT").filter(|v| !v.trim().is_empty()) {
            Some(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid {
                key: "PGPORT",
                value: raw,
            })?,
            None => DEFAULT_PG_PORT,
        };

        Ok(Self {
            host,
            database,
            user,
            password,
            port,
        })
    }
}

impl fmt::Debug for RelationalConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RelationalConfig")
            .field("host", &self.host)
            .field("database", &self.database)
            .field("user", &self.user)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("port", &self.port)
            .finish()
    }
}

/// Everything needed to open a session.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Relational parameters, or the reason they are unusable.
    pub relational: Result<RelationalConfig, ConfigError>,
    /// Directory for the JSON fallback collections.
    pub data_dir: PathBuf,
    pub connect_timeout: Duration,
}

impl StoreConfig {
    pub fn from_env() -> Self {
        Self {
            relational: RelationalConfig::from_env(),
            data_dir: env::var("HANGAR_DATA_DIR")
                .ok()
                .filter(|s| !s.is_empty())
                .map(PathBuf::from)
                .unwrap_or_else(default_data_dir),
            connect_timeout: Duration::from_secs(
                env::var("HANGAR_CONNECT_TIMEOUT_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(DEFAULT_CONNECT_TIMEOUT_SECS),
            ),
        }
    }

    /// A config that always uses the file store in `data_dir`.
    pub fn file_only(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            relational: Err(ConfigError::Missing("PGHOST")),
            data_dir: data_dir.into(),
            connect_timeout: Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS),
        }
    }

    pub fn with_relational(mut self, relational: RelationalConfig) -> Self {
        self.relational = Ok(relational);
        self
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }
}

pub fn default_data_dir() -> PathBuf {
    env::temp_dir().join(FALLBACK_DIR_NAME)
}
