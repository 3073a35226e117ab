//! Connection configuration
//!
//! Settings come from flat `ROSTER_DB_*` environment variables and are
//! assembled once at process start. The pooling section is optional; when
//! either bound is supplied, both are required.

use roster_errors::{config_error, Error, Result};
use serde::Deserialize;
use sqlx::postgres::{PgConnectOptions, PgSslMode};
use std::str::FromStr;

/// Environment prefix for all database settings
pub const ENV_PREFIX: &str = "ROSTER_DB";

/// TLS negotiation mode, by its accepted configuration names
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SslMode {
    Require,
    Prefer,
    Disable,
    Allow,
}

impl FromStr for SslMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "Require" => Ok(Self::Require),
            "Prefer" => Ok(Self::Prefer),
            "Disable" => Ok(Self::Disable),
            "Allow" => Ok(Self::Allow),
            other => Err(config_error(format!("unsupported ssl mode: {other}"))),
        }
    }
}

impl From<SslMode> for PgSslMode {
    fn from(mode: SslMode) -> Self {
        match mode {
            SslMode::Require => PgSslMode::Require,
            SslMode::Prefer => PgSslMode::Prefer,
            SslMode::Disable => PgSslMode::Disable,
            SslMode::Allow => PgSslMode::Allow,
        }
    }
}

/// Optional pool-size bounds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolingConfig {
    pub min_size: u32,
    pub max_size: u32,
}

/// Database connection settings
#[derive(Debug, Clone)]
pub struct DbConfig {
    pub host: String,
    pub port: u16,
    pub ssl_mode: SslMode,
    pub username: String,
    pub password: String,
    /// Database name
    pub name: String,
    /// Schema all generated table references are qualified with
    pub schema: String,
    pub pooling: Option<PoolingConfig>,
}

/// Raw environment shape before numeric and enum conversion
#[derive(Debug, Deserialize)]
struct RawDbConfig {
    host: String,
    port: String,
    ssl_mode: String,
    username: String,
    password: String,
    name: String,
    schema: String,
    pooling_min_size: Option<String>,
    pooling_max_size: Option<String>,
}

impl DbConfig {
    /// Load settings from `ROSTER_DB_*` environment variables
    pub fn load() -> Result<Self> {
        Self::from_prefix(ENV_PREFIX)
    }

    /// Load settings from environment variables under an explicit prefix
    pub fn from_prefix(prefix: &str) -> Result<Self> {
        let raw: RawDbConfig = config::Config::builder()
            .add_source(config::Environment::with_prefix(prefix))
            .build()
            .map_err(|err| config_error(err.to_string()))?
            .try_deserialize()
            .map_err(|err| config_error(err.to_string()))?;
        raw.try_into()
    }

    /// Per-connection options for the configured server
    pub fn connect_options(&self) -> PgConnectOptions {
        PgConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .ssl_mode(self.ssl_mode.into())
            .username(&self.username)
            .password(&self.password)
            .database(&self.name)
    }
}

impl TryFrom<RawDbConfig> for DbConfig {
    type Error = Error;

    fn try_from(raw: RawDbConfig) -> Result<Self> {
        let port: u16 = raw
            .port
            .parse()
            .map_err(|_| config_error(format!("invalid port: {}", raw.port)))?;
        let ssl_mode = raw.ssl_mode.parse()?;
        let pooling = match (raw.pooling_min_size, raw.pooling_max_size) {
            (None, None) => None,
            (Some(min), Some(max)) => Some(PoolingConfig {
                min_size: min
                    .parse()
                    .map_err(|_| config_error(format!("invalid pooling min size: {min}")))?,
                max_size: max
                    .parse()
                    .map_err(|_| config_error(format!("invalid pooling max size: {max}")))?,
            }),
            _ => {
                return Err(config_error(
                    "pooling requires both min and max sizes".to_string(),
                ))
            }
        };
        Ok(Self {
            host: raw.host,
            port,
            ssl_mode,
            username: raw.username,
            password: raw.password,
            name: raw.name,
            schema: raw.schema,
            pooling,
        })
    }
}
