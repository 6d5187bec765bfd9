//! Connection pool and schema migrations.

use secrecy::ExposeSecret;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::time::Duration;

use crate::config::DatabaseConfig;

/// Opens a bounded connection pool from configuration.
///
/// The pool caps concurrent database work; callers queue on `acquire` for
/// at most `acquire_timeout` instead of opening extra connections.
pub async fn create_pool(
    config: &DatabaseConfig,
    acquire_timeout: Duration,
) -> Result<PgPool, sqlx::Error> {
    tracing::info!(
        url = %config.redacted_url(),
        pool_size = config.pool_size,
        "Connecting to database"
    );

    let pool = PgPoolOptions::new()
        .max_connections(config.pool_size)
        .acquire_timeout(acquire_timeout)
        .connect(config.url.expose_secret())
        .await
        .map_err(|e| {
            tracing::warn!(error = %e, "Failed to connect to database");
            e
        })?;

    tracing::info!("Database connection pool created");
    Ok(pool)
}

/// Applies pending migrations from `./migrations`.
pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await?;
    tracing::info!("Database migrations applied");
    Ok(())
}
