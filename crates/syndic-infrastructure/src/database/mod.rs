//! Database module (PostgreSQL adapter and store selection)

pub mod connection;
pub mod postgres;

pub use connection::{connect_document_store, create_pool, run_migrations};
pub use postgres::PgDocumentStore;
