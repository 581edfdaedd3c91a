//! Resident domain entity

use serde::{Deserialize, Serialize};
use syndic_shared::new_id;
use validator::Validate;

use crate::error::DomainError;

/// One household in the building, optionally linked to a user account
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Resident {
    pub id: String,
    pub apartment_id: String,
    pub name: String,
    pub monthly_fee: f64,
    pub remaining_amount: f64,
    #[serde(default)]
    pub is_syndic: bool,
    #[serde(default)]
    pub is_linked: bool,
    #[serde(default)]
    pub linked_user_id: Option<String>,
    /// Billing period (`YYYY-MM`) of the last monthly charge.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_charged_period: Option<String>,
}

impl Resident {
    pub fn new(apartment_id: &str, form: NewResident) -> Self {
        Self {
            id: new_id(),
            apartment_id: apartment_id.to_string(),
            name: form.name.trim().to_string(),
            monthly_fee: form.monthly_fee,
            remaining_amount: form.remaining_amount.unwrap_or(0.0),
            is_syndic: false,
            is_linked: false,
            linked_user_id: None,
            last_charged_period: None,
        }
    }

    pub fn link_to(&mut self, user_id: &str) -> Result<(), DomainError> {
        match &self.linked_user_id {
            Some(existing) if existing != user_id => Err(DomainError::Forbidden(
                "resident is already linked to another account".to_string(),
            )),
            _ => {
                self.is_linked = true;
                self.linked_user_id = Some(user_id.to_string());
                Ok(())
            }
        }
    }

    /// Payments never push the balance below zero.
    pub fn apply_payment(&mut self, amount: f64) -> Result<(), DomainError> {
        if !(amount > 0.0) || !amount.is_finite() {
            return Err(DomainError::validation("Payment amount must be positive"));
        }
        self.remaining_amount = (self.remaining_amount - amount).max(0.0);
        Ok(())
    }

    /// Charge the fee once per billing period. Returns false if `period` was already charged.
    pub fn charge_monthly_fee(&mut self, period: &str) -> bool {
        if self.last_charged_period.as_deref() == Some(period) {
            return false;
        }
        self.remaining_amount += self.monthly_fee;
        self.last_charged_period = Some(period.to_string());
        true
    }
}

#[derive(Debug, Clone, Validate)]
pub struct NewResident {
    #[validate(length(min = 2, max = 60, message = "Resident name must be between 2 and 60 characters"))]
    pub name: String,

    #[validate(range(min = 0.0, message = "Monthly fee cannot be negative"))]
    pub monthly_fee: f64,

    #[validate(range(min = 0.0, message = "Remaining amount cannot be negative"))]
    pub remaining_amount: Option<f64>,
}

#[derive(Debug, Clone, Default, Validate)]
pub struct ResidentUpdate {
    #[validate(length(min = 2, max = 60, message = "Resident name must be between 2 and 60 characters"))]
    pub name: Option<String>,

    #[validate(range(min = 0.0, message = "Monthly fee cannot be negative"))]
    pub monthly_fee: Option<f64>,

    #[validate(range(min = 0.0, message = "Remaining amount cannot be negative"))]
    pub remaining_amount: Option<f64>,
}

impl ResidentUpdate {
    pub fn apply(&self, resident: &mut Resident) {
        if let Some(name) = &self.name {
            resident.name = name.trim().to_string();
        }
        if let Some(fee) = self.monthly_fee {
            resident.monthly_fee = fee;
        }
        if let Some(remaining) = self.remaining_amount {
            resident.remaining_amount = remaining;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resident() -> Resident {
        Resident::new(
            "apt-1",
            NewResident {
                name: "Flat 3B".into(),
                monthly_fee: 200.0,
                remaining_amount: Some(150.0),
            },
        )
    }

    #[test]
    fn test_payment_floors_at_zero() {
        let mut r = resident();
        r.apply_payment(100.0).unwrap();
        assert_eq!(r.remaining_amount, 50.0);
        r.apply_payment(500.0).unwrap();
        assert_eq!(r.remaining_amount, 0.0);
        assert!(r.apply_payment(0.0).is_err());
        assert!(r.apply_payment(f64::NAN).is_err());
    }

    #[test]
    fn test_monthly_charge() {
        let mut r = resident();
        assert!(r.charge_monthly_fee("2026-03"));
        assert_eq!(r.remaining_amount, 350.0);
        assert!(!r.charge_monthly_fee("2026-03"));
        assert_eq!(r.remaining_amount, 350.0);
        assert!(r.charge_monthly_fee("2026-04"));
        assert_eq!(r.remaining_amount, 550.0);
    }

    #[test]
    fn test_link_is_exclusive() {
        let mut r = resident();
        r.link_to("u1").unwrap();
        assert!(r.link_to("u1").is_ok());
        assert!(r.link_to("u2").is_err());
        assert_eq!(r.linked_user_id.as_deref(), Some("u1"));
    }
}
