//! Preferences persistence trait (port)

use async_trait::async_trait;

use crate::domain::Preferences;
use crate::error::DomainError;

#[async_trait]
pub trait PreferencesStore: Send + Sync {
    async fn load(&self) -> Result<Preferences, DomainError>;
    async fn save(&self, preferences: &Preferences) -> Result<(), DomainError>;
}
