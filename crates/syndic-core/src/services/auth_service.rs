// ============================================================================
// Syndic Core - Authentication Service
// File: crates/syndic-core/src/services/auth_service.rs
// ============================================================================
//! Sign-up, sign-in and profile edits on top of the auth provider

use std::sync::Arc;
use syndic_shared::constants::MIN_PASSWORD_LENGTH;
use syndic_shared::utils::mask_email;
use tokio::sync::watch;
use tracing::{info, warn};
use validator::Validate;

use super::profile_service::ProfileService;
use crate::domain::{ProfileUpdate, UserProfile};
use crate::error::DomainError;
use crate::repositories::{AuthProvider, AuthUser, DocumentStore};

#[derive(Debug, Clone, Validate)]
pub struct SignUpForm {
    #[validate(length(min = 2, max = 60, message = "Display name must be between 2 and 60 characters"))]
    pub display_name: String,

    #[validate(email(message = "Invalid email address"))]
    pub email: String,

    #[validate(length(min = MIN_PASSWORD_LENGTH, message = "Password is too short"))]
    pub password: String,
}

#[derive(Debug, Clone)]
pub struct SignInForm {
    pub email: String,
    pub password: String,
}

/// Authentication service for the sign-in / sign-up flows
pub struct AuthService<A: AuthProvider + ?Sized, S: DocumentStore + ?Sized> {
    auth: Arc<A>,
    profiles: ProfileService<S>,
}

impl<A: AuthProvider + ?Sized, S: DocumentStore + ?Sized> AuthService<A, S> {
    pub fn new(auth: Arc<A>, store: Arc<S>) -> Self {
        Self {
            auth,
            profiles: ProfileService::new(store),
        }
    }

    /// Register a new account and its profile document
    pub async fn sign_up(&self, form: SignUpForm) -> Result<AuthUser, DomainError> {
        let form = SignUpForm {
            display_name: form.display_name.trim().to_string(),
            email: form.email.trim().to_lowercase(),
            password: form.password,
        };
        form.validate()?;

        info!("Sign-up attempt for email: {}", mask_email(&form.email));
        let user = self
            .auth
            .sign_up(&form.email, &form.password, &form.display_name)
            .await?;
        self.profiles.create_profile(&user).await?;

        info!("Sign-up successful for user: {}", user.id);
        Ok(user)
    }

    /// Sign in with email and password
    pub async fn sign_in(&self, form: SignInForm) -> Result<AuthUser, DomainError> {
        let email = form.email.trim().to_lowercase();
        if email.is_empty() || form.password.is_empty() {
            return Err(DomainError::validation("Email and password are required"));
        }

        match self.auth.sign_in(&email, &form.password).await {
            Ok(user) => {
                info!("Sign-in successful for user: {}", user.id);
                Ok(user)
            }
            Err(e) => {
                warn!("Sign-in failed for {}: {}", mask_email(&email), e);
                Err(e)
            }
        }
    }

    pub async fn sign_out(&self) -> Result<(), DomainError> {
        self.auth.sign_out().await?;
        info!("Signed out");
        Ok(())
    }

    pub fn current_user(&self) -> Option<AuthUser> {
        self.auth.current_user()
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<AuthUser>> {
        self.auth.subscribe()
    }

    /// Edit the profile document; a new display name is also pushed to the auth provider.
    pub async fn update_profile(&self, update: ProfileUpdate) -> Result<UserProfile, DomainError> {
        let user = self.auth.current_user().ok_or(DomainError::NotAuthenticated)?;
        let profile = self.profiles.update_profile(&user.id, update.clone()).await?;

        if update.display_name.is_some() && profile.display_name != user.display_name {
            self.auth.update_display_name(&profile.display_name).await?;
        }
        Ok(profile)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(password: &str) -> SignUpForm {
        SignUpForm {
            display_name: "Samir".to_string(),
            email: "samir@example.com".to_string(),
            password: password.to_string(),
        }
    }

    #[test]
    fn test_password_length_is_checked() {
        assert!(form("secret").validate().is_ok());

        let err: DomainError = form("abc12").validate().unwrap_err().into();
        match err {
            DomainError::ValidationError(message) => assert!(message.contains("Password is too short")),
            other => panic!("unexpected error {:?}", other),
        }
    }
}
