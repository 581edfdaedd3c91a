// ============================================================================
// Syndic Core - Onboarding Service
// File: crates/syndic-core/src/services/onboarding_service.rs
// Description: Syndic apartment creation and resident enrolment
// ============================================================================

use chrono::Utc;
use std::sync::Arc;
use syndic_shared::constants::{COLLECTION_APARTMENTS, COLLECTION_RESIDENTS, DEFAULT_MAX_WRITE_ATTEMPTS};
use syndic_shared::new_id;
use tracing::{info, warn};

use super::apartment_service::ApartmentService;
use super::gateway::{encode, remote_failure};
use super::profile_service::ProfileService;
use super::resident_service::ResidentService;
use crate::domain::{Apartment, ApartmentData, JoinCode, NewApartment, NewResident, Resident, Role};
use crate::error::DomainError;
use crate::repositories::{AuthUser, DocumentStore};

pub struct OnboardingService<S: DocumentStore + ?Sized> {
    store: Arc<S>,
    profiles: ProfileService<S>,
    apartments: ApartmentService<S>,
    residents: ResidentService<S>,
}

impl<S: DocumentStore + ?Sized> OnboardingService<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self::with_max_write_attempts(store, DEFAULT_MAX_WRITE_ATTEMPTS)
    }

    pub fn with_max_write_attempts(store: Arc<S>, attempts: u32) -> Self {
        Self {
            profiles: ProfileService::new(Arc::clone(&store)),
            apartments: ApartmentService::new(Arc::clone(&store)),
            residents: ResidentService::new(Arc::clone(&store)).with_max_write_attempts(attempts),
            store,
        }
    }

    /// Syndic onboarding: creates the apartment with the syndic's own
    /// resident row and completes the owner's onboarding.
    pub async fn create_apartment(&self, owner: &AuthUser, form: NewApartment) -> Result<Apartment, DomainError> {
        let form = form.normalized()?;
        self.ensure_not_onboarded(&owner.id).await?;

        let apartment_id = new_id();
        let mut syndic = Resident::new(
            &apartment_id,
            NewResident {
                name: form.syndic_name.clone(),
                monthly_fee: form.monthly_fee,
                remaining_amount: None,
            },
        );
        syndic.is_syndic = true;
        if form.lives_in_building {
            syndic.link_to(&owner.id)?;
        }

        let apartment = Apartment {
            id: apartment_id.clone(),
            name: form.name.clone(),
            join_code: JoinCode::generate(),
            number_of_residents: form.number_of_residents,
            resident_ids: vec![syndic.id.clone()],
            created_by: owner.id.clone(),
            created_at: Utc::now(),
            updated_at: None,
        };

        self.store
            .set(COLLECTION_RESIDENTS, &syndic.id, encode(&syndic)?)
            .await
            .map_err(|e| remote_failure("create", COLLECTION_RESIDENTS, e))?;
        self.store
            .replace_if(COLLECTION_APARTMENTS, &apartment.id, None, encode(&apartment)?)
            .await
            .map_err(|e| remote_failure("create", COLLECTION_APARTMENTS, e))?;

        let role = if form.lives_in_building {
            Role::SyndicResident
        } else {
            Role::Syndic
        };
        self.profiles
            .complete_onboarding(&owner.id, role, &apartment.id)
            .await?;

        info!(
            "Apartment '{}' ({}) created by {} with join code {}",
            apartment.name, apartment.id, owner.id, apartment.join_code
        );
        Ok(apartment)
    }

    /// Resolve a join code to the apartment and the rows still open for claiming.
    pub async fn join_apartment(&self, user: &AuthUser, raw_code: &str) -> Result<ApartmentData, DomainError> {
        let code = JoinCode::parse(raw_code)?;
        self.ensure_not_onboarded(&user.id).await?;

        let apartment = self.apartments.find_by_join_code(&code).await.map_err(|e| {
            if matches!(e, DomainError::NotFound(_)) {
                warn!("No apartment for join code {}", code);
            }
            e
        })?;
        let mut data = self.apartments.get_apartment_data(&apartment.id).await?;
        data.residents.retain(|r| !r.is_linked && !r.is_syndic);

        info!("User {} joining apartment {}", user.id, apartment.id);
        Ok(data)
    }

    /// Link the user to a resident row and finish onboarding as a resident.
    pub async fn claim_resident(
        &self,
        user: &AuthUser,
        apartment_id: &str,
        resident_id: &str,
    ) -> Result<Resident, DomainError> {
        self.ensure_not_onboarded(&user.id).await?;

        let resident = self.residents.link_user(apartment_id, resident_id, &user.id).await?;
        self.profiles
            .complete_onboarding(&user.id, Role::Resident, apartment_id)
            .await?;

        info!("User {} claimed resident {} in {}", user.id, resident_id, apartment_id);
        Ok(resident)
    }

    async fn ensure_not_onboarded(&self, user_id: &str) -> Result<(), DomainError> {
        let status = self.profiles.resolve_status(user_id).await?;
        if status.completed {
            warn!("User {} tried to onboard twice", user_id);
            return Err(DomainError::Forbidden("onboarding already completed".to_string()));
        }
        Ok(())
    }
}
