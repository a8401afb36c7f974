use sqlx::postgres::{PgPool, PgPoolOptions};

use crate::config::PoolConfig;
use crate::error::AppError;

/// Opens a bounded connection pool.
///
/// `size` connections are kept warm; bursts may open up to `max_overflow`
/// more. Connections older than `recycle` are replaced, and a caller waiting
/// longer than `timeout` for a connection gets a database error.
pub async fn connect(database_url: &str, pool: &PoolConfig) -> Result<PgPool, AppError> {
    PgPoolOptions::new()
        .min_connections(pool.size)
        .max_connections(pool.max_connections())
        .max_lifetime(pool.recycle)
        .acquire_timeout(pool.timeout)
        .connect(database_url)
        .await
        .map_err(|e| {
            log::error!("failed to connect to database: {}", e);
            AppError::DatabaseError("Failed to connect to database".into())
        })
}

/// Applies the migrations in `migrations/`.
pub async fn migrate(pool: &PgPool) -> Result<(), AppError> {
    sqlx::migrate!("./migrations").run(pool).await?;
    log::info!("database migrations are up to date");
    Ok(())
}
