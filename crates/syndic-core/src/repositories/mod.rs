//! Port traits for the hosted services the client talks to

pub mod document_store;
pub mod auth_provider;
pub mod image_host;
pub mod preferences_store;

pub use document_store::{Document, DocumentStore, Revision};
pub use auth_provider::{AuthProvider, AuthUser};
pub use image_host::{ImageHost, ImageUpload, UploadedImage};
pub use preferences_store::PreferencesStore;

#[cfg(any(test, feature = "mocks"))]
pub use image_host::MockImageHost;
