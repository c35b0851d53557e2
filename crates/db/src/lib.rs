//! PostgreSQL persistence for agora: pool, migrations, models, repositories,
//! keyset page sources, and the Postgres-backed key-value store.

use std::time::Duration;

use sqlx::postgres::PgPoolOptions;

pub mod keyset;
pub mod kv_store;
pub mod models;
pub mod repositories;

pub type DbPool = sqlx::PgPool;

/// Connections older than this are closed and replaced.
const MAX_CONNECTION_LIFETIME: Duration = Duration::from_secs(30 * 60);

/// Create a connection pool from a database URL.
///
/// Connections are pinged before being handed out and recycled after
/// [`MAX_CONNECTION_LIFETIME`].
pub async fn create_pool(database_url: &str, max_connections: u32) -> Result<DbPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(max_connections)
        .max_lifetime(MAX_CONNECTION_LIFETIME)
        .test_before_acquire(true)
        .connect(database_url)
        .await
}

/// Round-trip a trivial query to confirm the database is reachable.
pub async fn health_check(pool: &DbPool) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}

/// Apply pending migrations from `crates/db/migrations`.
pub async fn run_migrations(pool: &DbPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}
