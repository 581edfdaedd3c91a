//! # Syndic Infrastructure
//! 
//! Adapters for the core ports: document stores (PostgreSQL, in-memory),
//! the HTTP image host, the local auth provider and the preferences file.

pub mod database;
pub mod memory;
pub mod image_host;
pub mod auth;
pub mod preferences;
pub mod error;

pub use database::{connect_document_store, create_pool, run_migrations, PgDocumentStore};
pub use memory::MemoryDocumentStore;
pub use image_host::HttpImageHost;
pub use auth::LocalAuthProvider;
pub use preferences::FilePreferencesStore;
pub use error::InfraError;
