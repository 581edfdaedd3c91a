//! PostgreSQL implementations

pub mod document_store_impl;

pub use document_store_impl::PgDocumentStore;
