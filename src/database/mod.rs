pub mod memory;
pub mod pool;
pub mod postgres;
pub mod store;

use std::sync::Arc;

use tracing::info;

use crate::config::{Config, StorageBackend};
use crate::error::Result;

pub use store::Store;

/// Opens the configured backend. Postgres connections run pending migrations first.
pub async fn connect(config: &Config) -> Result<Arc<dyn Store>> {
    match config.storage_backend {
        StorageBackend::Postgres => {
            let pool = pool::create_pool().await?;
            info!("Connected to PostgreSQL");
            sqlx::migrate!("./migrations").run(&pool).await?;
            info!("Database migrations applied");
            Ok(Arc::new(postgres::PgStore::new(pool)))
        }
        StorageBackend::Memory => {
            info!("Using in-memory storage; data is lost on restart");
            Ok(Arc::new(memory::MemoryStore::new()))
        }
    }
}
