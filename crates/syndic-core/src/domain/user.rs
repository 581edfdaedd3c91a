// ============================================================================
// Syndic Core - User Profile Entity
// File: crates/syndic-core/src/domain/user.rs
// Description: Profile document, roles and the acting user
// ============================================================================

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::DomainError;

/// Role picked during onboarding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Syndic,
    SyndicResident,
    Resident,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Syndic => "syndic",
            Role::SyndicResident => "syndic_resident",
            Role::Resident => "resident",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "syndic" => Some(Role::Syndic),
            "syndic_resident" => Some(Role::SyndicResident),
            "resident" => Some(Role::Resident),
            _ => None,
        }
    }

    /// Syndic roles manage the building; residents only read and report.
    pub fn manages_building(&self) -> bool {
        matches!(self, Role::Syndic | Role::SyndicResident)
    }
}

/// User profile document, keyed by the auth user id
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: String,
    pub display_name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub onboarding_completed: bool,
    #[serde(default)]
    pub role: Option<Role>,
    #[serde(default)]
    pub apartment_id: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl UserProfile {
    pub fn new(id: String, display_name: String, email: String) -> Self {
        Self {
            id,
            display_name: display_name.trim().to_string(),
            email: email.trim().to_lowercase(),
            phone: None,
            onboarding_completed: false,
            role: None,
            apartment_id: None,
            created_at: Utc::now(),
            updated_at: None,
        }
    }

    pub fn onboarding_status(&self) -> OnboardingStatus {
        match (&self.role, &self.apartment_id) {
            (Some(role), Some(apartment_id)) if self.onboarding_completed => OnboardingStatus {
                completed: true,
                role: Some(*role),
                apartment_id: Some(apartment_id.clone()),
            },
            _ => OnboardingStatus::incomplete(),
        }
    }
}

/// Editable profile fields
#[derive(Debug, Clone, Default, Validate)]
pub struct ProfileUpdate {
    #[validate(length(min = 2, max = 60, message = "Display name must be between 2 and 60 characters"))]
    pub display_name: Option<String>,

    #[validate(length(min = 6, max = 20, message = "Phone number must be between 6 and 20 characters"))]
    pub phone: Option<String>,
}

/// Result of resolving a user's onboarding state
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OnboardingStatus {
    pub completed: bool,
    pub role: Option<Role>,
    pub apartment_id: Option<String>,
}

impl OnboardingStatus {
    pub fn incomplete() -> Self {
        Self {
            completed: false,
            role: None,
            apartment_id: None,
        }
    }
}

/// The signed-in user a gateway call acts on behalf of
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    pub user_id: String,
    pub display_name: String,
    pub role: Option<Role>,
    pub apartment_id: Option<String>,
}

impl Actor {
    pub fn new(user_id: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            display_name: display_name.into(),
            role: None,
            apartment_id: None,
        }
    }

    pub fn with_membership(mut self, role: Role, apartment_id: impl Into<String>) -> Self {
        self.role = Some(role);
        self.apartment_id = Some(apartment_id.into());
        self
    }

    pub fn ensure_member(&self, apartment_id: &str) -> Result<(), DomainError> {
        if self.apartment_id.as_deref() == Some(apartment_id) && self.role.is_some() {
            Ok(())
        } else {
            Err(DomainError::Forbidden("not a member of this apartment".to_string()))
        }
    }

    pub fn ensure_manager(&self, apartment_id: &str) -> Result<(), DomainError> {
        self.ensure_member(apartment_id)?;
        match self.role {
            Some(role) if role.manages_building() => Ok(()),
            _ => Err(DomainError::Forbidden("only the syndic can do this".to_string())),
        }
    }
}
