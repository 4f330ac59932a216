use anyhow::{Context, Result};
use sqlx::postgres::{PgPool, PgPoolOptions};
use std::time::Duration;
use tracing::{info, warn};

use crate::config::DatabaseConfig;

/// DatabasePool manages PostgreSQL connections
#[derive(Clone)]
pub struct DatabasePool {
    pool: PgPool,
}

impl DatabasePool {
    /// Maximum retry attempts for database connection
    pub const MAX_RETRY_ATTEMPTS: u32 = 5;

    /// Initial retry delay in milliseconds
    pub const INITIAL_RETRY_DELAY_MS: u64 = 100;

    /// Creates a new database pool sized and timed out per `DatabaseConfig`
    /// (pool bounds, connection/idle/lifetime limits) rather than fixed
    /// constants.
    pub async fn new(config: &DatabaseConfig) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .min_connections(config.min_connections)
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.connection_timeout_seconds))
            .idle_timeout(Duration::from_secs(config.idle_timeout_seconds))
            .max_lifetime(Duration::from_secs(config.max_lifetime_seconds))
            .connect(&config.url)
            .await
            .context("Failed to create database pool")?;

        Ok(Self { pool })
    }

    /// Creates a new database pool with retry logic and exponential backoff
    pub async fn new_with_retry(config: &DatabaseConfig) -> Result<Self> {
        let mut retry_count = 0;
        let mut delay_ms = Self::INITIAL_RETRY_DELAY_MS;

        loop {
            match Self::new(config).await {
                Ok(pool) => {
                    info!("Successfully connected to database");
                    return Ok(pool);
                }
                Err(e) => {
                    retry_count += 1;
                    if retry_count >= Self::MAX_RETRY_ATTEMPTS {
                        return Err(e).context(format!(
                            "Failed to connect to database after {} attempts",
                            Self::MAX_RETRY_ATTEMPTS
                        ));
                    }

                    warn!(
                        "Failed to connect to database (attempt {}/{}): {}. Retrying in {}ms...",
                        retry_count, Self::MAX_RETRY_ATTEMPTS, e, delay_ms
                    );

                    tokio::time::sleep(Duration::from_millis(delay_ms)).await;

                    // Exponential backoff with max 60 seconds
                    delay_ms = std::cmp::min(delay_ms * 2, 60_000);
                }
            }
        }
    }

    /// Returns a reference to the underlying pool
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Runs database migrations
    pub async fn run_migrations(&self) -> Result<()> {
        info!("Running database migrations...");
        
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .context("Failed to run database migrations")?;

        info!("Database migrations completed successfully");
        Ok(())
    }

    /// Checks if the database connection is healthy
    pub async fn health_check(&self) -> Result<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .context("Database health check failed")?;
        Ok(())
    }

    /// Closes the database pool
    pub async fn close(&self) {
        self.pool.close().await;
    }
}
