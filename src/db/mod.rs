pub mod memory;
pub mod models;
pub mod postgres;

use std::{future::Future, pin::Pin};

use anyhow::Result;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use uuid::Uuid;

pub use memory::MemoryStore;
pub use postgres::PgStore;

use self::models::{Reading, Trigger};

pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T>> + Send + 'a>>;

/// The document-store operations the ingestion pipeline relies on.
///
/// Object safe so the service can hold an `Arc<dyn Store>` and tests can
/// swap in `MemoryStore` or their own wrappers.
pub trait Store: Send + Sync {
    /// Persist a reading. The reading is durable once this resolves `Ok`.
    fn insert_reading<'a>(&'a self, reading: &'a Reading) -> StoreFuture<'a, ()>;

    /// All triggers bound to `(user_id, device_id)`, read fresh on every call.
    fn find_triggers<'a>(
        &'a self,
        user_id: &'a str,
        device_id: &'a str,
    ) -> StoreFuture<'a, Vec<Trigger>>;

    fn insert_trigger<'a>(&'a self, trigger: &'a Trigger) -> StoreFuture<'a, ()>;

    /// Returns `false` when no trigger with `id` existed.
    fn delete_trigger(&self, id: Uuid) -> StoreFuture<'_, bool>;
}

pub async fn create_pool(database_url: &str, max_connections: u32) -> Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await?;
    Ok(pool)
}

pub async fn run_migrations(pool: &PgPool) -> Result<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}
