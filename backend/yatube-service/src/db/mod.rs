/// Database access layer
///
/// This module provides:
/// - The `ContentStore` repository trait
/// - `PgContentStore`, backed by PostgreSQL and the migrations in `./migrations`
/// - `MemoryContentStore`, an in-process store with the same semantics
/// - Connection pool construction
mod memory;
mod postgres;
mod r#trait;

pub use memory::MemoryContentStore;
pub use postgres::PgContentStore;
pub use r#trait::ContentStore;

use crate::config::DatabaseConfig;
use sqlx::postgres::{PgConnectOptions, PgPool, PgPoolOptions};
use std::str::FromStr;
use std::time::Duration;

/// Build the PostgreSQL pool and verify it answers.
pub async fn create_pool(url: &str, config: &DatabaseConfig) -> Result<PgPool, sqlx::Error> {
    let connect_options = PgConnectOptions::from_str(url)?;

    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(Duration::from_secs(10))
        .idle_timeout(Duration::from_secs(600))
        .max_lifetime(Duration::from_secs(1800))
        .connect_with(connect_options)
        .await?;

    sqlx::query("SELECT 1").execute(&pool).await?;

    Ok(pool)
}

/// Apply the embedded migrations.
pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}
