//! Process configuration, read from the environment at startup.

use std::net::SocketAddr;

use serde::Deserialize;

use chainverify_observability::LogFormat;

pub const LISTEN_ADDR_VAR: &str = "CHAINVERIFY_LISTEN_ADDR";
pub const BACKEND_VAR: &str = "CHAINVERIFY_BACKEND";
pub const DATABASE_URL_VAR: &str = "DATABASE_URL";
pub const DB_MAX_CONNECTIONS_VAR: &str = "CHAINVERIFY_DB_MAX_CONNECTIONS";
pub const LOG_FORMAT_VAR: &str = "CHAINVERIFY_LOG_FORMAT";

const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_MAX_CONNECTIONS: u32 = 5;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("invalid value for {var}: {message}")]
    Invalid { var: &'static str, message: String },
}

impl ConfigError {
    fn invalid(var: &'static str, message: impl Into<String>) -> Self {
        Self::Invalid {
            var,
            message: message.into(),
        }
    }
}

/// Where the registries keep their records.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum BackendConfig {
    /// Process-local; everything is lost on restart.
    Memory,
    Postgres {
        database_url: String,
        max_connections: u32,
    },
}

impl BackendConfig {
    /// Short name for logs. Never includes the connection string.
    pub fn kind(&self) -> &'static str {
        match self {
            BackendConfig::Memory => "memory",
            BackendConfig::Postgres { .. } => "postgres",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AppConfig {
    pub listen_addr: SocketAddr,
    pub backend: BackendConfig,
    #[serde(default)]
    pub log_format: LogFormat,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            listen_addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            backend: BackendConfig::Memory,
            log_format: LogFormat::default(),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Build the configuration from an arbitrary variable source.
    ///
    /// Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |var: &str| lookup(var).filter(|v| !v.trim().is_empty());

        let listen_addr = get(LISTEN_ADDR_VAR)
            .unwrap_or_else(|| DEFAULT_LISTEN_ADDR.to_string())
            .trim()
            .parse::<SocketAddr>()
            .map_err(|e| ConfigError::invalid(LISTEN_ADDR_VAR, e.to_string()))?;

        let backend = match get(BACKEND_VAR).as_deref().map(str::trim) {
            None | Some("memory") => BackendConfig::Memory,
            Some("postgres") => {
                let database_url = get(DATABASE_URL_VAR).ok_or(ConfigError::Missing(DATABASE_URL_VAR))?;
                let max_connections = match get(DB_MAX_CONNECTIONS_VAR) {
                    None => DEFAULT_MAX_CONNECTIONS,
                    Some(raw) => match raw.trim().parse::<u32>() {
                        Ok(0) => return Err(ConfigError::invalid(DB_MAX_CONNECTIONS_VAR, "must be at least 1")),
                        Ok(n) => n,
                        Err(e) => return Err(ConfigError::invalid(DB_MAX_CONNECTIONS_VAR, e.to_string())),
                    },
                };
                BackendConfig::Postgres {
                    database_url,
                    max_connections,
                }
            }
            Some(other) => {
                return Err(ConfigError::invalid(
                    BACKEND_VAR,
                    format!("`{other}` (expected `memory` or `postgres`)"),
                ));
            }
        };

        let log_format = match get(LOG_FORMAT_VAR) {
            None => LogFormat::default(),
            Some(raw) => raw
                .parse::<LogFormat>()
                .map_err(|e| ConfigError::invalid(LOG_FORMAT_VAR, e.to_string()))?,
        };

        Ok(Self {
            listen_addr,
            backend,
            log_format,
        })
    }
}
