// ============================================================================
// Syndic Client - Onboarding ViewModel
// File: crates/syndic-client/src/viewmodel/onboarding_vm.rs
// Description: Role choice, apartment creation and join-by-code
// ============================================================================

use tokio::sync::mpsc;
use tracing::warn;

use syndic_core::domain::{Apartment, ApartmentData, JoinCode, NewApartment, Resident};
use syndic_core::error::DomainError;
use syndic_core::repositories::AuthUser;

use super::{parse_amount, parse_count, spawn_scoped};
use crate::context::AppContext;
use crate::events::{AppEvent, Outcome};
use crate::i18n::{Translator, UserMessage};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoleChoice {
    Syndic,
    Resident,
}

pub struct OnboardingViewModel {
    pub role_choice: Option<RoleChoice>,

    // Syndic form
    pub apartment_name: String,
    pub number_of_residents: String,
    pub syndic_name: String,
    pub monthly_fee: String,
    pub lives_in_building: bool,

    // Resident flow
    join_code: String,
    pub joined: Option<ApartmentData>,

    pub created: Option<Apartment>,
    pub claimed: Option<Resident>,
    pub error: Option<String>,
    pub is_loading: bool,
    ctx: AppContext,
    event_tx: mpsc::UnboundedSender<AppEvent>,
}

impl OnboardingViewModel {
    pub fn new(ctx: AppContext, event_tx: mpsc::UnboundedSender<AppEvent>) -> Self {
        Self {
            role_choice: None,
            apartment_name: String::new(),
            number_of_residents: String::new(),
            syndic_name: String::new(),
            monthly_fee: String::new(),
            lives_in_building: false,
            join_code: String::new(),
            joined: None,
            created: None,
            claimed: None,
            error: None,
            is_loading: false,
            ctx,
            event_tx,
        }
    }

    pub fn choose_role(&mut self, choice: RoleChoice) {
        self.role_choice = Some(choice);
        self.error = None;
    }

    /// Keystroke handler for the join code field.
    pub fn set_join_code(&mut self, raw: &str) {
        self.join_code = JoinCode::normalize(raw);
    }

    pub fn join_code(&self) -> &str {
        &self.join_code
    }

    fn apartment_form(&self) -> Result<NewApartment, DomainError> {
        let number_of_residents = parse_count(&self.number_of_residents, "Number of residents")?;
        let monthly_fee = if self.monthly_fee.trim().is_empty() {
            0.0
        } else {
            parse_amount(&self.monthly_fee, "Monthly fee")?
        };
        NewApartment {
            name: self.apartment_name.clone(),
            number_of_residents,
            syndic_name: self.syndic_name.clone(),
            monthly_fee,
            lives_in_building: self.lives_in_building,
        }
        .normalized()
    }

    pub fn create_apartment(&mut self, user: &AuthUser, translator: &Translator) {
        if self.is_loading {
            return;
        }
        let form = match self.apartment_form() {
            Ok(form) => form,
            Err(e) => {
                warn!("Apartment form rejected: {}", e);
                self.error = Some(e.user_message(translator));
                return;
            }
        };

        self.error = None;
        self.is_loading = true;
        let onboarding = self.ctx.onboarding.clone();
        let user = user.clone();
        spawn_scoped(
            &self.ctx,
            &self.event_tx,
            async move { onboarding.create_apartment(&user, form).await },
            AppEvent::ApartmentCreated,
        );
    }

    pub fn on_created(&mut self, result: &Outcome<Apartment>, translator: &Translator) {
        self.is_loading = false;
        match result {
            Ok(apartment) => {
                self.error = None;
                self.created = Some(apartment.clone());
            }
            Err(e) => self.error = Some(e.user_message(translator)),
        }
    }

    pub fn lookup_join_code(&mut self, user: &AuthUser, translator: &Translator) {
        if self.is_loading {
            return;
        }
        let code = match JoinCode::parse(&self.join_code) {
            Ok(code) => code,
            Err(e) => {
                self.error = Some(e.user_message(translator));
                return;
            }
        };

        self.error = None;
        self.is_loading = true;
        let onboarding = self.ctx.onboarding.clone();
        let user = user.clone();
        spawn_scoped(
            &self.ctx,
            &self.event_tx,
            async move { onboarding.join_apartment(&user, code.as_str()).await },
            AppEvent::JoinCodeResolved,
        );
    }

    pub fn on_join_resolved(&mut self, result: &Outcome<ApartmentData>, translator: &Translator) {
        self.is_loading = false;
        match result {
            Ok(data) => {
                self.error = None;
                self.joined = Some(data.clone());
            }
            Err(e) => self.error = Some(e.user_message(translator)),
        }
    }

    pub fn claim(&mut self, user: &AuthUser, resident_id: &str) {
        let Some(apartment_id) = self.joined.as_ref().map(|d| d.apartment.id.clone()) else {
            self.error = Some("Enter a join code first".to_string());
            return;
        };
        if self.is_loading {
            return;
        }

        self.error = None;
        self.is_loading = true;
        let onboarding = self.ctx.onboarding.clone();
        let user = user.clone();
        let resident_id = resident_id.to_string();
        spawn_scoped(
            &self.ctx,
            &self.event_tx,
            async move { onboarding.claim_resident(&user, &apartment_id, &resident_id).await },
            AppEvent::ResidentClaimed,
        );
    }

    pub fn on_claimed(&mut self, result: &Outcome<Resident>, translator: &Translator) {
        self.is_loading = false;
        match result {
            Ok(resident) => {
                self.error = None;
                self.claimed = Some(resident.clone());
            }
            Err(e) => self.error = Some(e.user_message(translator)),
        }
    }

    pub fn reset(&mut self) {
        let ctx = self.ctx.clone();
        let event_tx = self.event_tx.clone();
        *self = Self::new(ctx, event_tx);
    }
}
