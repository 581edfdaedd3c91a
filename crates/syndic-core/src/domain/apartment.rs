// ============================================================================
// Syndic Core - Apartment Entity
// File: crates/syndic-core/src/domain/apartment.rs
// Description: Building document and the resident join code
// ============================================================================

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use syndic_shared::constants::{JOIN_CODE_ALPHABET, JOIN_CODE_LENGTH};
use validator::Validate;

use super::resident::Resident;
use crate::error::DomainError;

/// Eight uppercase alphanumeric characters, entered by residents to enrol.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JoinCode(String);

impl JoinCode {
    pub fn generate() -> Self {
        let mut rng = rand::rng();
        let code = (0..JOIN_CODE_LENGTH)
            .map(|_| JOIN_CODE_ALPHABET[rng.random_range(0..JOIN_CODE_ALPHABET.len())] as char)
            .collect();
        JoinCode(code)
    }

    /// Coerce raw keyboard input: uppercase, alphanumerics only, at most 8 chars.
    /// Used on every keystroke, so partial codes are allowed.
    pub fn normalize(raw: &str) -> String {
        raw.chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .map(|c| c.to_ascii_uppercase())
            .take(JOIN_CODE_LENGTH)
            .collect()
    }

    pub fn parse(raw: &str) -> Result<Self, DomainError> {
        let code = Self::normalize(raw);
        if code.len() != JOIN_CODE_LENGTH {
            return Err(DomainError::validation(format!(
                "Join code must be {} characters",
                JOIN_CODE_LENGTH
            )));
        }
        Ok(JoinCode(code))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for JoinCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Apartment building document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Apartment {
    pub id: String,
    pub name: String,
    pub join_code: JoinCode,
    pub number_of_residents: u32,
    #[serde(default)]
    pub resident_ids: Vec<String>,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Syndic onboarding form
#[derive(Debug, Clone, Validate)]
pub struct NewApartment {
    #[validate(length(min = 2, max = 100, message = "Apartment name must be between 2 and 100 characters"))]
    pub name: String,

    #[validate(range(min = 1, max = 500, message = "Number of residents must be between 1 and 500"))]
    pub number_of_residents: u32,

    /// Name shown on the syndic's own resident row
    #[validate(length(min = 2, max = 60, message = "Syndic name must be between 2 and 60 characters"))]
    pub syndic_name: String,

    #[validate(range(min = 0.0, message = "Monthly fee cannot be negative"))]
    pub monthly_fee: f64,

    /// Picks `syndic_resident` instead of `syndic` and links the syndic row to the user.
    pub lives_in_building: bool,
}

impl NewApartment {
    pub fn normalized(mut self) -> Result<Self, DomainError> {
        self.name = self.name.trim().to_string();
        self.syndic_name = self.syndic_name.trim().to_string();
        self.validate()?;
        Ok(self)
    }
}

/// Editable apartment fields; the join code is never editable.
#[derive(Debug, Clone, Default, Validate)]
pub struct ApartmentUpdate {
    #[validate(length(min = 2, max = 100, message = "Apartment name must be between 2 and 100 characters"))]
    pub name: Option<String>,

    #[validate(range(min = 1, max = 500, message = "Number of residents must be between 1 and 500"))]
    pub number_of_residents: Option<u32>,
}

/// Apartment with its resident rows
#[derive(Debug, Clone, PartialEq)]
pub struct ApartmentData {
    pub apartment: Apartment,
    pub residents: Vec<Resident>,
}

impl ApartmentData {
    pub fn syndic(&self) -> Option<&Resident> {
        self.residents.iter().find(|r| r.is_syndic)
    }

    pub fn unlinked_residents(&self) -> Vec<&Resident> {
        self.residents.iter().filter(|r| !r.is_linked).collect()
    }

    pub fn total_outstanding(&self) -> f64 {
        self.residents.iter().map(|r| r.remaining_amount).sum()
    }
}
