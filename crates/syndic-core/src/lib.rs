//! # Syndic Core
//! 
//! Domain entities, gateway services, and port traits for the syndic
//! building management client.

pub mod domain;
pub mod services;
pub mod repositories;
pub mod error;

// Re-export domain entities
pub use domain::*;
pub use error::{DomainError, StoreError};
