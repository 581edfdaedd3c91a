//! Database connection pool and store selection

use sqlx::{postgres::PgPoolOptions, PgPool};
use std::sync::Arc;
use std::time::Duration;
use syndic_core::repositories::DocumentStore;
use syndic_shared::config::{StoreBackend, StoreSettings};
use tracing::info;

use super::postgres::PgDocumentStore;
use crate::error::InfraError;
use crate::memory::MemoryDocumentStore;

pub async fn create_pool(url: &str, max_connections: u32) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(max_connections)
        .acquire_timeout(Duration::from_secs(3))
        .connect(url)
        .await
}

pub async fn run_migrations(pool: &PgPool) -> Result<(), InfraError> {
    sqlx::migrate!("./migrations").run(pool).await?;
    info!("Database migrations applied");
    Ok(())
}

/// Build the document store selected in configuration.
pub async fn connect_document_store(settings: &StoreSettings) -> Result<Arc<dyn DocumentStore>, InfraError> {
    match settings.backend {
        StoreBackend::Memory => {
            info!("Using in-memory document store");
            Ok(Arc::new(MemoryDocumentStore::new()))
        }
        StoreBackend::Postgres => {
            let url = settings
                .url
                .as_deref()
                .ok_or_else(|| InfraError::Config("store.url is required for the postgres backend".to_string()))?;
            let pool = create_pool(url, settings.max_connections).await?;
            info!("Connected to PostgreSQL document store");
            Ok(Arc::new(PgDocumentStore::new(pool)))
        }
    }
}
