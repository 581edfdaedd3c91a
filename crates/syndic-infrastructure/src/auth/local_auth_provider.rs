// ============================================================================
// Syndic Infrastructure - Local Auth Provider
// File: crates/syndic-infrastructure/src/auth/local_auth_provider.rs
// Description: Email/password accounts held in process, one active session
// ============================================================================

use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use tokio::sync::watch;
use tracing::{error, info, warn};

use syndic_core::error::DomainError;
use syndic_core::repositories::{AuthProvider, AuthUser};
use syndic_shared::new_id;
use syndic_shared::utils::mask_email;

use super::password::{hash_password, verify_password};

#[derive(Debug, Clone)]
struct Account {
    user: AuthUser,
    password_hash: String,
}

pub struct LocalAuthProvider {
    accounts: DashMap<String, Account>,
    session: watch::Sender<Option<AuthUser>>,
}

impl Default for LocalAuthProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl LocalAuthProvider {
    pub fn new() -> Self {
        let (session, _) = watch::channel(None);
        Self {
            accounts: DashMap::new(),
            session,
        }
    }

    fn start_session(&self, user: &AuthUser) {
        self.session.send_replace(Some(user.clone()));
    }
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

#[async_trait]
impl AuthProvider for LocalAuthProvider {
    /// New accounts are signed in immediately.
    async fn sign_up(&self, email: &str, password: &str, display_name: &str) -> Result<AuthUser, DomainError> {
        let email = normalize_email(email);
        if self.accounts.contains_key(&email) {
            warn!("Sign-up rejected, email in use: {}", mask_email(&email));
            return Err(DomainError::EmailAlreadyExists(email));
        }

        let password = password.to_string();
        let password_hash = tokio::task::spawn_blocking(move || hash_password(&password))
            .await
            .map_err(|e| {
                error!("Password hashing task failed: {}", e);
                DomainError::RemoteOperationFailed("sign up".to_string())
            })?
            .map_err(|e| {
                error!("Password hashing failed: {}", e);
                DomainError::RemoteOperationFailed("sign up".to_string())
            })?;

        let user = AuthUser {
            id: new_id(),
            email: email.clone(),
            display_name: display_name.trim().to_string(),
        };

        match self.accounts.entry(email.clone()) {
            Entry::Occupied(_) => return Err(DomainError::EmailAlreadyExists(email)),
            Entry::Vacant(entry) => {
                entry.insert(Account {
                    user: user.clone(),
                    password_hash,
                });
            }
        }

        info!("Account created: {}", user.id);
        self.start_session(&user);
        Ok(user)
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthUser, DomainError> {
        let email = normalize_email(email);
        let account = self
            .accounts
            .get(&email)
            .map(|a| a.clone())
            .ok_or(DomainError::InvalidCredentials)?;

        let password = password.to_string();
        let stored_hash = account.password_hash.clone();
        let is_valid = tokio::task::spawn_blocking(move || verify_password(&password, &stored_hash))
            .await
            .map_err(|e| {
                error!("Password verification task failed: {}", e);
                DomainError::RemoteOperationFailed("sign in".to_string())
            })?
            .map_err(|e| {
                error!("Stored hash unreadable for {}: {}", account.user.id, e);
                DomainError::RemoteOperationFailed("sign in".to_string())
            })?;

        if !is_valid {
            return Err(DomainError::InvalidCredentials);
        }

        self.start_session(&account.user);
        Ok(account.user)
    }

    async fn sign_out(&self) -> Result<(), DomainError> {
        self.session.send_replace(None);
        Ok(())
    }

    async fn update_display_name(&self, display_name: &str) -> Result<AuthUser, DomainError> {
        let current = self.current_user().ok_or(DomainError::NotAuthenticated)?;
        let mut account = self
            .accounts
            .get_mut(&current.email)
            .ok_or(DomainError::NotAuthenticated)?;
        account.user.display_name = display_name.trim().to_string();
        let user = account.user.clone();
        drop(account);

        self.start_session(&user);
        Ok(user)
    }

    fn current_user(&self) -> Option<AuthUser> {
        self.session.borrow().clone()
    }

    fn subscribe(&self) -> watch::Receiver<Option<AuthUser>> {
        self.session.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_sign_up_then_sign_in() {
        let auth = LocalAuthProvider::new();
        let mut session = auth.subscribe();

        let created = auth.sign_up(" Samir@Example.com ", "secret1", "Samir").await.unwrap();
        assert_eq!(created.email, "samir@example.com");
        assert!(session.has_changed().unwrap());
        assert_eq!(session.borrow_and_update().as_ref(), Some(&created));

        auth.sign_out().await.unwrap();
        assert_eq!(auth.current_user(), None);

        let err = auth.sign_in("samir@example.com", "wrong").await.unwrap_err();
        assert_eq!(err, DomainError::InvalidCredentials);

        let user = auth.sign_in("SAMIR@example.com", "secret1").await.unwrap();
        assert_eq!(user.id, created.id);
        assert_eq!(auth.current_user(), Some(user));
    }

    #[tokio::test]
    async fn test_duplicate_email_and_unknown_account() {
        let auth = LocalAuthProvider::new();
        auth.sign_up("a@example.com", "secret1", "A").await.unwrap();

        let dup = auth.sign_up("A@example.com", "other12", "B").await.unwrap_err();
        assert!(matches!(dup, DomainError::EmailAlreadyExists(_)));

        let unknown = auth.sign_in("nobody@example.com", "secret1").await.unwrap_err();
        assert_eq!(unknown, DomainError::InvalidCredentials);
    }

    #[tokio::test]
    async fn test_display_name_update_requires_session() {
        let auth = LocalAuthProvider::new();
        assert_eq!(
            auth.update_display_name("X").await.unwrap_err(),
            DomainError::NotAuthenticated
        );

        auth.sign_up("a@example.com", "secret1", "A").await.unwrap();
        let user = auth.update_display_name("  Amina ").await.unwrap();
        assert_eq!(user.display_name, "Amina");
        assert_eq!(auth.current_user().map(|u| u.display_name), Some("Amina".to_string()));
    }
}
