//! Domain errors

use thiserror::Error;

/// Errors surfaced by the gateway services. Nothing below the services
/// escapes as a panic; every failure ends up as one of these.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    #[error("Not authenticated")]
    NotAuthenticated,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Email already exists: {0}")]
    EmailAlreadyExists(String),

    #[error("{0} not found")]
    NotFound(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Not allowed: {0}")]
    Forbidden(String),

    #[error("Remote operation failed: {0}")]
    RemoteOperationFailed(String),

    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("Document was modified concurrently")]
    Conflict,
}

impl DomainError {
    pub fn not_found(entity: &str) -> Self {
        DomainError::NotFound(entity.to_string())
    }

    pub fn validation(message: impl Into<String>) -> Self {
        DomainError::ValidationError(message.into())
    }

    /// Key into the client string tables.
    pub fn message_key(&self) -> &'static str {
        match self {
            DomainError::NotAuthenticated => "errors.not_authenticated",
            DomainError::InvalidCredentials => "errors.invalid_credentials",
            DomainError::EmailAlreadyExists(_) => "errors.email_in_use",
            DomainError::NotFound(_) => "errors.not_found",
            DomainError::ValidationError(_) => "errors.validation",
            DomainError::Forbidden(_) => "errors.forbidden",
            DomainError::RemoteOperationFailed(_) | DomainError::Conflict => "errors.generic",
            DomainError::UploadFailed(_) => "errors.upload_failed",
        }
    }
}

impl From<validator::ValidationErrors> for DomainError {
    fn from(errors: validator::ValidationErrors) -> Self {
        DomainError::ValidationError(errors.to_string())
    }
}

/// Errors reported by a document store adapter.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StoreError {
    #[error("Document {collection}/{key} does not exist")]
    NotFound { collection: String, key: String },

    #[error("Revision mismatch on {collection}/{key}: expected {expected:?}, found {actual:?}")]
    Conflict {
        collection: String,
        key: String,
        expected: Option<i64>,
        actual: Option<i64>,
    },

    #[error("Invalid document body: {0}")]
    InvalidBody(String),

    #[error("Backend error: {0}")]
    Backend(String),
}

impl From<serde_json::Error> for StoreError {
    fn from(e: serde_json::Error) -> Self {
        StoreError::InvalidBody(e.to_string())
    }
}
