//! Authentication provider trait (port)

use async_trait::async_trait;
use tokio::sync::watch;

use crate::error::DomainError;

/// Identity reported by the auth provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser {
    pub id: String,
    pub email: String,
    pub display_name: String,
}

#[async_trait]
pub trait AuthProvider: Send + Sync {
    async fn sign_up(&self, email: &str, password: &str, display_name: &str) -> Result<AuthUser, DomainError>;
    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthUser, DomainError>;
    async fn sign_out(&self) -> Result<(), DomainError>;
    async fn update_display_name(&self, display_name: &str) -> Result<AuthUser, DomainError>;

    fn current_user(&self) -> Option<AuthUser>;

    /// Session-change stream; the current value is the signed-in user.
    fn subscribe(&self) -> watch::Receiver<Option<AuthUser>>;
}
