//! Database connection pool management.

use std::time::Duration;

use anyhow::{Context, Result};
use sqlx::mysql::{MySqlPool, MySqlPoolOptions};
use tracing::info;

use crate::config::DatabaseConfig;

/// Create a MySQL connection pool, connecting eagerly.
pub async fn create_pool(config: &DatabaseConfig) -> Result<MySqlPool> {
    let pool = pool_options(config)
        .connect_with(config.connect_options())
        .await
        .context("failed to connect to MySQL")?;

    Ok(pool)
}

/// Create a pool without connecting; the first query establishes a connection.
pub fn create_lazy_pool(config: &DatabaseConfig) -> MySqlPool {
    pool_options(config).connect_lazy_with(config.connect_options())
}

fn pool_options(config: &DatabaseConfig) -> MySqlPoolOptions {
    MySqlPoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
}

/// Check if the database connection is healthy.
pub async fn check_health(pool: &MySqlPool) -> bool {
    sqlx::query("SELECT 1").execute(pool).await.is_ok()
}

/// Close the pool, waiting for checked-out connections to be returned.
pub async fn close_pool(pool: &MySqlPool) {
    pool.close().await;
    info!("database connection pool closed");
}
