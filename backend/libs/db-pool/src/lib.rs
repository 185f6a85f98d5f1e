//! Database connection pool management
//!
//! Pool creation and configuration for the posts service's view-count store.

pub mod env_utils;

pub use env_utils::EnvError;

use env_utils::{env_or, env_required};
use sqlx::postgres::{PgPool, PgPoolOptions};
use std::fmt;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, error, info, warn};

#[derive(Debug, Error)]
pub enum PoolError {
    #[error("Invalid pool configuration: {0}")]
    InvalidConfig(String),
    #[error("Failed to connect to database: {0}")]
    Connect(#[source] sqlx::Error),
    #[error("Database connection verification failed: {0}")]
    Verify(#[source] sqlx::Error),
    #[error("Database connection verification timed out after {0}s")]
    VerifyTimeout(u64),
}

/// Database connection pool configuration
#[derive(Clone)]
pub struct DbConfig {
    /// Service name used in log fields
    pub service_name: String,
    /// PostgreSQL connection URL
    pub database_url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    /// Connection creation timeout (new connection to PostgreSQL)
    pub connect_timeout_secs: u64,
    /// Connection acquisition timeout (get connection from pool)
    pub acquire_timeout_secs: u64,
    pub idle_timeout_secs: u64,
    pub max_lifetime_secs: u64,
}

impl fmt::Debug for DbConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DbConfig")
            .field("service_name", &self.service_name)
            .field("database_url", &"[REDACTED]")
            .field("max_connections", &self.max_connections)
            .field("min_connections", &self.min_connections)
            .field("connect_timeout_secs", &self.connect_timeout_secs)
            .field("acquire_timeout_secs", &self.acquire_timeout_secs)
            .field("idle_timeout_secs", &self.idle_timeout_secs)
            .field("max_lifetime_secs", &self.max_lifetime_secs)
            .finish()
    }
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            service_name: String::from("unknown"),
            database_url: String::new(),
            max_connections: 8,
            min_connections: 1,
            connect_timeout_secs: 5,
            acquire_timeout_secs: 2,
            idle_timeout_secs: 600,
            max_lifetime_secs: 1800,
        }
    }
}

impl DbConfig {
    /// Build a DbConfig from environment variables
    ///
    /// `DATABASE_URL` is required; pool sizing and timeouts fall back to
    /// [`DbConfig::default`].
    pub fn from_env(service_name: &str) -> Result<Self, EnvError> {
        let defaults = Self::default();
        Ok(Self {
            service_name: service_name.to_string(),
            database_url: env_required("DATABASE_URL")?,
            max_connections: env_or("DB_MAX_CONNECTIONS", defaults.max_connections)?,
            min_connections: env_or("DB_MIN_CONNECTIONS", defaults.min_connections)?,
            connect_timeout_secs: env_or("DB_CONNECT_TIMEOUT_SECS", defaults.connect_timeout_secs)?,
            acquire_timeout_secs: env_or("DB_ACQUIRE_TIMEOUT_SECS", defaults.acquire_timeout_secs)?,
            idle_timeout_secs: env_or("DB_IDLE_TIMEOUT_SECS", defaults.idle_timeout_secs)?,
            max_lifetime_secs: env_or("DB_MAX_LIFETIME_SECS", defaults.max_lifetime_secs)?,
        })
    }

    pub fn validate(&self) -> Result<(), PoolError> {
        if self.database_url.is_empty() {
            return Err(PoolError::InvalidConfig("database_url is empty".into()));
        }
        if self.max_connections == 0 {
            return Err(PoolError::InvalidConfig(
                "max_connections must be at least 1".into(),
            ));
        }
        if self.min_connections > self.max_connections {
            return Err(PoolError::InvalidConfig(format!(
                "min_connections ({}) exceeds max_connections ({})",
                self.min_connections, self.max_connections
            )));
        }
        Ok(())
    }

    /// Log pool configuration details
    pub fn log_config(&self) {
        info!(
            service = %self.service_name,
            max_connections = self.max_connections,
            min_connections = self.min_connections,
            connect_timeout_secs = self.connect_timeout_secs,
            acquire_timeout_secs = self.acquire_timeout_secs,
            idle_timeout_secs = self.idle_timeout_secs,
            max_lifetime_secs = self.max_lifetime_secs,
            "Database pool configuration"
        );
    }

    fn pool_options(&self) -> PgPoolOptions {
        PgPoolOptions::new()
            .max_connections(self.max_connections)
            .min_connections(self.min_connections)
            .acquire_timeout(Duration::from_secs(self.acquire_timeout_secs))
            .idle_timeout(Duration::from_secs(self.idle_timeout_secs))
            .max_lifetime(Duration::from_secs(self.max_lifetime_secs))
            .test_before_acquire(true)
    }
}

/// Create a PostgreSQL connection pool and verify it with `SELECT 1`
pub async fn create_pool(config: &DbConfig) -> Result<PgPool, PoolError> {
    config.validate()?;
    debug!(
        service = %config.service_name,
        max = config.max_connections,
        min = config.min_connections,
        "Creating database pool"
    );

    let pool = config
        .pool_options()
        .connect(&config.database_url)
        .await
        .map_err(PoolError::Connect)?;

    match tokio::time::timeout(
        Duration::from_secs(config.connect_timeout_secs),
        sqlx::query("SELECT 1").execute(&pool),
    )
    .await
    {
        Ok(Ok(_)) => {
            info!(
                service = %config.service_name,
                "Database pool created and verified successfully"
            );
            Ok(pool)
        }
        Ok(Err(e)) => {
            error!(
                service = %config.service_name,
                error = %e,
                "Database connection verification failed"
            );
            Err(PoolError::Verify(e))
        }
        Err(_) => {
            error!(
                service = %config.service_name,
                timeout_secs = config.connect_timeout_secs,
                "Database connection verification timeout"
            );
            Err(PoolError::VerifyTimeout(config.connect_timeout_secs))
        }
    }
}

/// Create a pool that opens connections on first use
///
/// Used when the database is unreachable at startup: callers keep serving
/// and individual queries fail until the database comes back.
pub fn create_lazy_pool(config: &DbConfig) -> Result<PgPool, PoolError> {
    config.validate()?;
    warn!(
        service = %config.service_name,
        "Creating lazy database pool; connections will be opened on demand"
    );
    config
        .pool_options()
        .min_connections(0)
        .connect_lazy(&config.database_url)
        .map_err(PoolError::Connect)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    const POOL_VARS: [&str; 7] = [
        "DATABASE_URL",
        "DB_MAX_CONNECTIONS",
        "DB_MIN_CONNECTIONS",
        "DB_CONNECT_TIMEOUT_SECS",
        "DB_ACQUIRE_TIMEOUT_SECS",
        "DB_IDLE_TIMEOUT_SECS",
        "DB_MAX_LIFETIME_SECS",
    ];

    fn clear_pool_vars() {
        for key in POOL_VARS {
            std::env::remove_var(key);
        }
    }

    #[test]
    #[serial]
    fn test_from_env_requires_database_url() {
        clear_pool_vars();
        let err = DbConfig::from_env("posts-service").unwrap_err();
        assert_eq!(err, EnvError::Missing("DATABASE_URL".into()));
    }

    #[test]
    #[serial]
    fn test_from_env_uses_defaults() {
        clear_pool_vars();
        std::env::set_var("DATABASE_URL", "postgres://localhost/posts");

        let config = DbConfig::from_env("posts-service").unwrap();
        assert_eq!(config.service_name, "posts-service");
        assert_eq!(config.max_connections, 8);
        assert_eq!(config.min_connections, 1);
        assert_eq!(config.acquire_timeout_secs, 2);

        clear_pool_vars();
    }

    #[test]
    #[serial]
    fn test_from_env_override_and_invalid_value() {
        clear_pool_vars();
        std::env::set_var("DATABASE_URL", "postgres://localhost/posts");
        std::env::set_var("DB_MAX_CONNECTIONS", "16");

        let config = DbConfig::from_env("posts-service").unwrap();
        assert_eq!(config.max_connections, 16);

        std::env::set_var("DB_MIN_CONNECTIONS", "-1");
        assert!(DbConfig::from_env("posts-service").is_err());

        clear_pool_vars();
    }

    #[test]
    fn test_debug_redacts_url() {
        let config = DbConfig {
            database_url: "postgres://user:secret@db/posts".into(),
            ..DbConfig::default()
        };
        let rendered = format!("{:?}", config);
        assert!(!rendered.contains("secret"));
        assert!(rendered.contains("[REDACTED]"));
    }

    #[test]
    fn test_validate() {
        let mut config = DbConfig {
            database_url: "postgres://localhost/posts".into(),
            ..DbConfig::default()
        };
        assert!(config.validate().is_ok());

        config.min_connections = config.max_connections + 1;
        assert!(matches!(config.validate(), Err(PoolError::InvalidConfig(_))));

        config.database_url.clear();
        assert!(config.validate().is_err());
    }

    #[tokio::test]
    async fn test_lazy_pool_does_not_connect() {
        let config = DbConfig {
            database_url: "postgres://nobody@127.0.0.1:1/posts".into(),
            ..DbConfig::default()
        };
        assert!(create_lazy_pool(&config).is_ok());
    }
}
