//! Database connection management
//!
//! Assembles the sqlx connection pool from a loaded [`DbConfig`].

use crate::config::DbConfig;
use roster_errors::{store_error, Result};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

/// Open a connection pool for the configured server
///
/// When no pooling section is configured the driver defaults apply.
pub async fn connect(config: &DbConfig) -> Result<PgPool> {
    let mut options = PgPoolOptions::new();
    if let Some(pooling) = &config.pooling {
        options = options
            .min_connections(pooling.min_size)
            .max_connections(pooling.max_size);
    }
    options
        .connect_with(config.connect_options())
        .await
        .map_err(|err| store_error("connect", err))
}
