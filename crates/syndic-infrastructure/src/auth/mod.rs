//! Authentication adapters

pub mod password;
pub mod local_auth_provider;

pub use local_auth_provider::LocalAuthProvider;
