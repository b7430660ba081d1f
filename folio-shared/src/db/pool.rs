/// Database connection pool management
///
/// This module provides the PostgreSQL connection pools used by the API.
/// The application opens two pools against the same logical database, one
/// per database role (see [`crate::db::selector`]); both are created here.
///
/// Startup tolerates the database becoming ready after the application
/// process: [`create_pool_with_retry`] retries with a fixed backoff before
/// giving up, at which point startup must abort.
///
/// # Example
///
/// ```no_run
/// use folio_shared::db::pool::{create_pool, DatabaseConfig};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let config = DatabaseConfig {
///         url: "postgresql://visitor:pw@localhost/folio".to_string(),
///         ..Default::default()
///     };
///
///     let pool = create_pool(config).await?;
///
///     let row: (i64,) = sqlx::query_as("SELECT $1")
///         .bind(42i64)
///         .fetch_one(&pool)
///         .await?;
///
///     Ok(())
/// }
/// ```
use sqlx::postgres::{PgPool, PgPoolOptions};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Number of connection attempts before startup gives up.
pub const CONNECT_ATTEMPTS: u32 = 20;

/// Fixed interval between connection attempts.
pub const CONNECT_RETRY_INTERVAL: Duration = Duration::from_secs(10);

/// Configuration for one role-scoped connection pool
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// PostgreSQL connection URL, credentials included
    /// (e.g. "postgresql://visitor:pw@localhost:5432/folio")
    pub url: String,

    /// Maximum number of connections in the pool
    pub max_connections: u32,

    /// Minimum number of idle connections to maintain
    pub min_connections: u32,

    /// Timeout for acquiring a connection from the pool (seconds)
    pub connect_timeout_seconds: u64,

    /// How long a connection can remain idle before being closed (seconds)
    pub idle_timeout_seconds: Option<u64>,

    /// Maximum lifetime of a connection before forced recycling (seconds)
    pub max_lifetime_seconds: Option<u64>,

    /// Whether to test connections before returning them from the pool
    pub test_before_acquire: bool,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            max_connections: 10,
            min_connections: 2,
            connect_timeout_seconds: 30,
            idle_timeout_seconds: Some(600),
            max_lifetime_seconds: Some(1800),
            test_before_acquire: true,
        }
    }
}

/// Creates and initializes a PostgreSQL connection pool
///
/// Performs a ping health check after the pool is built, so a returned pool
/// is known to have reached the database at least once. The pool is not
/// monitored continuously afterwards.
///
/// # Errors
///
/// Returns an error if the URL is invalid, the database is unreachable, or
/// the health check fails.
pub async fn create_pool(config: DatabaseConfig) -> Result<PgPool, sqlx::Error> {
    debug!(
        max_connections = config.max_connections,
        min_connections = config.min_connections,
        "Creating database connection pool"
    );

    let mut pool_options = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(Duration::from_secs(config.connect_timeout_seconds))
        .test_before_acquire(config.test_before_acquire);

    if let Some(idle_timeout) = config.idle_timeout_seconds {
        pool_options = pool_options.idle_timeout(Duration::from_secs(idle_timeout));
    }

    if let Some(max_lifetime) = config.max_lifetime_seconds {
        pool_options = pool_options.max_lifetime(Duration::from_secs(max_lifetime));
    }

    let pool = pool_options.connect(&config.url).await?;

    health_check(&pool).await?;

    Ok(pool)
}

/// Creates a pool, retrying with a fixed backoff until the database is ready
///
/// Retries [`CONNECT_ATTEMPTS`] times at [`CONNECT_RETRY_INTERVAL`], which
/// covers the common deployment race where the database container starts
/// after the application. There is no partial-success mode: callers that
/// need more than one pool must treat any single failure as fatal.
///
/// # Errors
///
/// Returns the last connection error once all attempts are exhausted.
pub async fn create_pool_with_retry(config: DatabaseConfig) -> Result<PgPool, sqlx::Error> {
    let mut last_err = None;

    for attempt in 1..=CONNECT_ATTEMPTS {
        match create_pool(config.clone()).await {
            Ok(pool) => {
                info!(attempt, "Database connection pool ready");
                return Ok(pool);
            }
            Err(e) => {
                warn!(
                    attempt,
                    max_attempts = CONNECT_ATTEMPTS,
                    error = %e,
                    "Database not ready yet, retrying in {}s",
                    CONNECT_RETRY_INTERVAL.as_secs()
                );
                last_err = Some(e);
                if attempt < CONNECT_ATTEMPTS {
                    tokio::time::sleep(CONNECT_RETRY_INTERVAL).await;
                }
            }
        }
    }

    Err(last_err.expect("at least one attempt was made"))
}

/// Performs a ping health check on a pool
///
/// # Errors
///
/// Returns an error if the health check query fails.
pub async fn health_check(pool: &PgPool) -> Result<(), sqlx::Error> {
    let result: (i32,) = sqlx::query_as("SELECT 1").fetch_one(pool).await?;

    if result.0 == 1 {
        Ok(())
    } else {
        warn!("Database health check returned unexpected value: {}", result.0);
        Err(sqlx::Error::Protocol(
            "Health check returned unexpected value".into(),
        ))
    }
}

/// Current pool statistics for diagnostics
#[derive(Debug, Clone)]
pub struct PoolStats {
    /// Number of connections currently in use
    pub active_connections: usize,

    /// Number of idle connections available
    pub idle_connections: usize,

    /// Total connections in the pool
    pub total_connections: usize,
}

pub fn get_pool_stats(pool: &PgPool) -> PoolStats {
    let size = pool.size();
    let idle = pool.num_idle();

    PoolStats {
        active_connections: (size as usize).saturating_sub(idle),
        idle_connections: idle,
        total_connections: size as usize,
    }
}

/// Gracefully closes a connection pool
///
/// Called during application shutdown so all connections are released.
pub async fn close_pool(pool: PgPool) {
    info!("Closing database connection pool");
    pool.close().await;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_database_config_default() {
        let config = DatabaseConfig::default();
        assert_eq!(config.max_connections, 10);
        assert_eq!(config.min_connections, 2);
        assert_eq!(config.connect_timeout_seconds, 30);
        assert_eq!(config.idle_timeout_seconds, Some(600));
        assert_eq!(config.max_lifetime_seconds, Some(1800));
        assert!(config.test_before_acquire);
    }

    #[test]
    fn test_retry_constants() {
        // Documented bring-up budget: ~20 attempts, 10 seconds apart.
        assert_eq!(CONNECT_ATTEMPTS, 20);
        assert_eq!(CONNECT_RETRY_INTERVAL, Duration::from_secs(10));
    }

    // Connection tests require a running database; they live in the
    // tests/ directory and are #[ignore]d by default.
}
