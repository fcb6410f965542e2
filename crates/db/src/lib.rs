//! Persistence for user records.
//!
//! - [`store::UserStore`] -- the capability every backend provides.
//! - [`repositories::PgUserStore`] -- PostgreSQL implementation (sqlx).
//! - [`memory::MemoryUserStore`] -- in-process implementation for tests and embedding.

use sqlx::postgres::PgPoolOptions;

pub mod error;
pub mod memory;
pub mod models;
pub mod repositories;
pub mod store;

pub use error::StoreError;
pub use memory::MemoryUserStore;
pub use repositories::PgUserStore;
pub use store::UserStore;

pub type DbPool = sqlx::PgPool;

/// Create a connection pool from a database URL.
pub async fn create_pool(database_url: &str) -> Result<DbPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(20)
        .connect(database_url)
        .await
}

/// Round-trip a trivial query to confirm the database is reachable.
pub async fn health_check(pool: &DbPool) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}
