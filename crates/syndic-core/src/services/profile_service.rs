// ============================================================================
// Syndic Core - Profile Service
// File: crates/syndic-core/src/services/profile_service.rs
// ============================================================================
//! User profile documents and the onboarding status derived from them

use chrono::Utc;
use serde_json::Value;
use std::sync::Arc;
use syndic_shared::constants::COLLECTION_USERS;
use tracing::{info, warn};
use validator::Validate;

use super::gateway::{decode, encode, fields, remote_failure};
use crate::domain::{OnboardingStatus, ProfileUpdate, Role, UserProfile};
use crate::error::{DomainError, StoreError};
use crate::repositories::{AuthUser, DocumentStore};

pub struct ProfileService<S: DocumentStore + ?Sized> {
    store: Arc<S>,
}

impl<S: DocumentStore + ?Sized> Clone for ProfileService<S> {
    fn clone(&self) -> Self {
        Self { store: Arc::clone(&self.store) }
    }
}

impl<S: DocumentStore + ?Sized> ProfileService<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Create the profile for a freshly signed-up user. Calling it again
    /// for the same user returns the stored profile.
    pub async fn create_profile(&self, user: &AuthUser) -> Result<UserProfile, DomainError> {
        let profile = UserProfile::new(user.id.clone(), user.display_name.clone(), user.email.clone());
        match self
            .store
            .replace_if(COLLECTION_USERS, &user.id, None, encode(&profile)?)
            .await
        {
            Ok(_) => {
                info!("Profile created for user: {}", user.id);
                Ok(profile)
            }
            Err(StoreError::Conflict { .. }) => {
                warn!("Profile already exists for user: {}", user.id);
                self.get_profile(&user.id).await
            }
            Err(e) => Err(remote_failure("create", COLLECTION_USERS, e)),
        }
    }

    pub async fn find_profile(&self, user_id: &str) -> Result<Option<UserProfile>, DomainError> {
        let document = self
            .store
            .get(COLLECTION_USERS, user_id)
            .await
            .map_err(|e| remote_failure("read", COLLECTION_USERS, e))?;
        document.as_ref().map(decode::<UserProfile>).transpose()
    }

    pub async fn get_profile(&self, user_id: &str) -> Result<UserProfile, DomainError> {
        self.find_profile(user_id)
            .await?
            .ok_or_else(|| DomainError::not_found("Profile"))
    }

    /// A missing profile means onboarding never started.
    pub async fn resolve_status(&self, user_id: &str) -> Result<OnboardingStatus, DomainError> {
        let status = self
            .find_profile(user_id)
            .await?
            .map(|p| p.onboarding_status())
            .unwrap_or_else(OnboardingStatus::incomplete);
        Ok(status)
    }

    pub async fn update_profile(&self, user_id: &str, update: ProfileUpdate) -> Result<UserProfile, DomainError> {
        let update = ProfileUpdate {
            display_name: update.display_name.map(|n| n.trim().to_string()),
            phone: update.phone.map(|p| p.trim().to_string()),
        };
        update.validate()?;

        let mut changes = vec![("updatedAt", encode(&Utc::now())?)];
        if let Some(name) = &update.display_name {
            changes.push(("displayName", Value::String(name.clone())));
        }
        if let Some(phone) = &update.phone {
            changes.push(("phone", Value::String(phone.clone())));
        }

        self.store
            .update_fields(COLLECTION_USERS, user_id, fields(changes))
            .await
            .map_err(|e| match e {
                StoreError::NotFound { .. } => DomainError::not_found("Profile"),
                other => remote_failure("update", COLLECTION_USERS, other),
            })?;

        info!("Profile updated for user: {}", user_id);
        self.get_profile(user_id).await
    }

    pub async fn complete_onboarding(&self, user_id: &str, role: Role, apartment_id: &str) -> Result<(), DomainError> {
        let changes = fields(vec![
            ("onboardingCompleted", Value::Bool(true)),
            ("role", encode(&role)?),
            ("apartmentId", Value::String(apartment_id.to_string())),
            ("updatedAt", encode(&Utc::now())?),
        ]);

        self.store
            .update_fields(COLLECTION_USERS, user_id, changes)
            .await
            .map_err(|e| match e {
                StoreError::NotFound { .. } => DomainError::not_found("Profile"),
                other => remote_failure("update", COLLECTION_USERS, other),
            })?;

        info!("Onboarding completed for user {} as {}", user_id, role.as_str());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::testing::FakeStore;
    use std::sync::atomic::Ordering;

    fn samir() -> AuthUser {
        AuthUser {
            id: "u-1".to_string(),
            email: "samir@example.com".to_string(),
            display_name: "Samir".to_string(),
        }
    }

    #[tokio::test]
    async fn test_create_profile_twice_keeps_the_first() {
        let service = ProfileService::new(FakeStore::shared());
        let created = service.create_profile(&samir()).await.unwrap();
        assert!(!created.onboarding_completed);

        let renamed = AuthUser {
            display_name: "Someone Else".to_string(),
            ..samir()
        };
        let again = service.create_profile(&renamed).await.unwrap();
        assert_eq!(again, created);
    }

    #[tokio::test]
    async fn test_create_profile_reports_backend_failure() {
        let store = FakeStore::shared();
        store.failing.store(true, Ordering::SeqCst);
        let service = ProfileService::new(store);

        let err = service.create_profile(&samir()).await.unwrap_err();
        assert!(matches!(err, DomainError::RemoteOperationFailed(_)));
    }

    #[tokio::test]
    async fn test_update_trims_and_validates() {
        let service = ProfileService::new(FakeStore::shared());
        service.create_profile(&samir()).await.unwrap();

        let updated = service
            .update_profile(
                "u-1",
                ProfileUpdate {
                    display_name: Some("  Samir B.  ".to_string()),
                    phone: Some(" 0612345678 ".to_string()),
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.display_name, "Samir B.");
        assert_eq!(updated.phone.as_deref(), Some("0612345678"));
        assert!(updated.updated_at.is_some());

        let err = service
            .update_profile(
                "u-1",
                ProfileUpdate {
                    display_name: Some("  S ".to_string()),
                    phone: None,
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::ValidationError(_)));
        assert_eq!(service.get_profile("u-1").await.unwrap().display_name, "Samir B.");
    }

    #[tokio::test]
    async fn test_missing_profile() {
        let service = ProfileService::new(FakeStore::shared());

        let update = ProfileUpdate {
            display_name: Some("Samir".to_string()),
            phone: None,
        };
        let err = service.update_profile("nobody", update).await.unwrap_err();
        assert_eq!(err, DomainError::not_found("Profile"));
        assert_eq!(service.get_profile("nobody").await.unwrap_err(), DomainError::not_found("Profile"));
        assert_eq!(
            service.complete_onboarding("nobody", Role::Syndic, "apt-1").await.unwrap_err(),
            DomainError::not_found("Profile")
        );
        assert_eq!(service.resolve_status("nobody").await.unwrap(), OnboardingStatus::incomplete());
    }

    #[tokio::test]
    async fn test_complete_onboarding_resolves_status() {
        let service = ProfileService::new(FakeStore::shared());
        service.create_profile(&samir()).await.unwrap();
        assert_eq!(service.resolve_status("u-1").await.unwrap(), OnboardingStatus::incomplete());

        service.complete_onboarding("u-1", Role::Syndic, "apt-1").await.unwrap();
        let status = service.resolve_status("u-1").await.unwrap();
        assert!(status.completed);
        assert_eq!(status.role, Some(Role::Syndic));
        assert_eq!(status.apartment_id.as_deref(), Some("apt-1"));
    }
}
