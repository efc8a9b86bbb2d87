//! Database configuration loaded from environment variables.

use std::env;

use anyhow::{Context, Result};
use sqlx::mysql::MySqlConnectOptions;

/// Connection and pool configuration.
///
/// `max_connections` bounds the pool; callers waiting on an exhausted pool
/// suspend until a connection frees or `acquire_timeout_secs` elapses — no
/// additional timeout layer is added on top of the pool's own policy.
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// MySQL server host (default: 127.0.0.1).
    pub host: String,

    /// MySQL server port (default: 3306).
    pub port: u16,

    /// Username.
    pub user: String,

    /// Password (default: empty).
    pub password: String,

    /// Database (schema) name. Also scopes schema introspection.
    pub database: String,

    /// Connection character set (default: utf8mb4).
    pub charset: String,

    /// Session time zone, e.g. "-03:00". When None the server default applies.
    pub timezone: Option<String>,

    /// Maximum connections in the pool (default: 10).
    pub max_connections: u32,

    /// Seconds to wait for a pooled connection before giving up (default: 30).
    pub acquire_timeout_secs: u64,
}

impl DatabaseConfig {
    /// Load configuration from environment variables.
    ///
    /// Picks up a `.env` file first so development environments work without
    /// exporting anything.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let host = env::var("DB_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());

        let port = env::var("DB_PORT")
            .unwrap_or_else(|_| "3306".to_string())
            .parse()
            .context("DB_PORT must be a valid u16")?;

        let user = env::var("DB_USER").context("DB_USER environment variable is required")?;

        let password = env::var("DB_PASSWORD").unwrap_or_default();

        let database = env::var("DB_NAME").context("DB_NAME environment variable is required")?;

        let charset = env::var("DB_CHARSET").unwrap_or_else(|_| "utf8mb4".to_string());

        let timezone = env::var("DB_TIMEZONE").ok();

        let max_connections = env::var("DB_MAX_CONNECTIONS")
            .unwrap_or_else(|_| "10".to_string())
            .parse()
            .context("DB_MAX_CONNECTIONS must be a valid u32")?;

        let acquire_timeout_secs = env::var("DB_ACQUIRE_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".to_string())
            .parse()
            .context("DB_ACQUIRE_TIMEOUT_SECS must be a valid u64")?;

        Ok(Self {
            host,
            port,
            user,
            password,
            database,
            charset,
            timezone,
            max_connections,
            acquire_timeout_secs,
        })
    }

    /// Build sqlx connect options from this configuration.
    pub fn connect_options(&self) -> MySqlConnectOptions {
        let mut options = MySqlConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .username(&self.user)
            .password(&self.password)
            .database(&self.database)
            .charset(&self.charset);

        if let Some(tz) = &self.timezone {
            options = options.timezone(tz.clone());
        }

        options
    }
}
