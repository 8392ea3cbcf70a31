//! Server configuration.

use std::{env, time::Duration};

/// Server configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server host address.
    pub host: String,
    /// Server port.
    pub port: u16,
    /// PostgreSQL URL. The in-memory store is used when unset.
    pub database_url: Option<String>,
    /// Maximum size of the database connection pool.
    pub db_max_connections: u32,
    /// Deadline for a single pull request operation, including its transaction.
    pub operation_timeout: Duration,
    /// Log level.
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            database_url: None,
            db_max_connections: 10,
            operation_timeout: Duration::from_secs(5),
            log_level: "info".to_string(),
        }
    }
}

impl Config {
    /// Loads configuration from environment variables.
    pub fn from_env() -> anyhow::Result<Self> {
        let defaults = Self::default();

        let port = match env::var("REVIEW_SERVER_PORT") {
            Ok(v) => v
                .parse()
                .map_err(|_| anyhow::anyhow!("REVIEW_SERVER_PORT is not a valid port: {v}"))?,
            Err(_) => defaults.port,
        };

        let operation_timeout = env::var("REVIEW_OPERATION_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
            .unwrap_or(defaults.operation_timeout);

        Ok(Self {
            host: env::var("REVIEW_SERVER_HOST").unwrap_or(defaults.host),
            port,
            database_url: env::var("DATABASE_URL").ok().filter(|v| !v.is_empty()),
            db_max_connections: env::var("REVIEW_DB_MAX_CONNECTIONS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.db_max_connections),
            operation_timeout,
            log_level: env::var("REVIEW_LOG_LEVEL").unwrap_or(defaults.log_level),
        })
    }

    /// Returns the server address.
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Returns true if a PostgreSQL store is configured.
    pub fn uses_database(&self) -> bool {
        self.database_url.is_some()
    }
}
