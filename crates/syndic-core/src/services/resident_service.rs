//! Resident rows: one document per resident, updated with revision checks

use chrono::Utc;
use std::sync::Arc;
use syndic_shared::constants::{COLLECTION_APARTMENTS, COLLECTION_RESIDENTS, DEFAULT_MAX_WRITE_ATTEMPTS};
use tracing::{info, warn};
use validator::Validate;

use super::apartment_service::ApartmentService;
use super::gateway::{encode, modify_document, remote_failure};
use crate::domain::{Actor, NewResident, Resident, ResidentUpdate};
use crate::error::DomainError;
use crate::repositories::DocumentStore;

pub struct ResidentService<S: DocumentStore + ?Sized> {
    store: Arc<S>,
    apartments: ApartmentService<S>,
    max_write_attempts: u32,
}

impl<S: DocumentStore + ?Sized> ResidentService<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self {
            apartments: ApartmentService::new(Arc::clone(&store)),
            store,
            max_write_attempts: DEFAULT_MAX_WRITE_ATTEMPTS,
        }
    }

    pub fn with_max_write_attempts(mut self, attempts: u32) -> Self {
        self.max_write_attempts = attempts;
        self
    }

    pub async fn add_resident(
        &self,
        actor: &Actor,
        apartment_id: &str,
        form: NewResident,
    ) -> Result<Resident, DomainError> {
        actor.ensure_manager(apartment_id)?;
        form.validate()?;
        // Fail before writing anything if the apartment is gone.
        self.apartments.get_apartment(apartment_id).await?;

        let resident = Resident::new(apartment_id, form);
        self.store
            .replace_if(COLLECTION_RESIDENTS, &resident.id, None, encode(&resident)?)
            .await
            .map_err(|e| remote_failure("create", COLLECTION_RESIDENTS, e))?;
        self.store
            .array_union(
                COLLECTION_APARTMENTS,
                apartment_id,
                "residentIds",
                vec![serde_json::Value::String(resident.id.clone())],
            )
            .await
            .map_err(|e| remote_failure("update", COLLECTION_APARTMENTS, e))?;

        info!("Resident {} added to apartment {}", resident.id, apartment_id);
        Ok(resident)
    }

    pub async fn update_resident(
        &self,
        actor: &Actor,
        apartment_id: &str,
        resident_id: &str,
        update: ResidentUpdate,
    ) -> Result<Resident, DomainError> {
        actor.ensure_manager(apartment_id)?;
        update.validate()?;
        let resident = self
            .modify(apartment_id, resident_id, |resident| {
                update.apply(resident);
                Ok(())
            })
            .await?;
        info!("Resident {} updated", resident_id);
        Ok(resident)
    }

    pub async fn record_payment(
        &self,
        actor: &Actor,
        apartment_id: &str,
        resident_id: &str,
        amount: f64,
    ) -> Result<Resident, DomainError> {
        actor.ensure_manager(apartment_id)?;
        let resident = self
            .modify(apartment_id, resident_id, |resident| resident.apply_payment(amount))
            .await?;
        info!(
            "Payment of {:.2} recorded for resident {} (remaining {:.2})",
            amount, resident_id, resident.remaining_amount
        );
        Ok(resident)
    }

    /// Add each resident's monthly fee to the amount they owe, once per calendar month.
    pub async fn charge_monthly_fees(&self, actor: &Actor, apartment_id: &str) -> Result<Vec<Resident>, DomainError> {
        let period = Utc::now().format("%Y-%m").to_string();
        self.charge_fees_for_period(actor, apartment_id, &period).await
    }

    /// Rows already charged for `period` are left as they are, so a failed run can be retried.
    /// Ids whose row is gone are skipped.
    pub async fn charge_fees_for_period(
        &self,
        actor: &Actor,
        apartment_id: &str,
        period: &str,
    ) -> Result<Vec<Resident>, DomainError> {
        actor.ensure_manager(apartment_id)?;
        let apartment = self.apartments.get_apartment(apartment_id).await?;

        let mut residents = Vec::with_capacity(apartment.resident_ids.len());
        let mut newly_charged = 0;
        for resident_id in &apartment.resident_ids {
            let mut charged = false;
            let result = self
                .modify(apartment_id, resident_id, |resident| {
                    charged = resident.charge_monthly_fee(period);
                    Ok(())
                })
                .await;
            match result {
                Ok(resident) => {
                    if charged {
                        newly_charged += 1;
                    }
                    residents.push(resident);
                }
                Err(DomainError::NotFound(_)) => {
                    warn!("Skipping missing resident {} of apartment {}", resident_id, apartment_id);
                }
                Err(e) => return Err(e),
            }
        }

        info!(
            "Charged {} monthly fees for {} in apartment {} ({} rows)",
            newly_charged,
            period,
            apartment_id,
            residents.len()
        );
        Ok(residents)
    }

    /// Link a resident row to a user account.
    pub(crate) async fn link_user(
        &self,
        apartment_id: &str,
        resident_id: &str,
        user_id: &str,
    ) -> Result<Resident, DomainError> {
        self.modify(apartment_id, resident_id, |resident| {
            if resident.is_syndic {
                return Err(DomainError::Forbidden("the syndic row cannot be claimed".to_string()));
            }
            resident.link_to(user_id)
        })
        .await
    }

    async fn modify<F>(&self, apartment_id: &str, resident_id: &str, mut apply: F) -> Result<Resident, DomainError>
    where
        F: FnMut(&mut Resident) -> Result<(), DomainError> + Send,
    {
        modify_document(
            self.store.as_ref(),
            COLLECTION_RESIDENTS,
            resident_id,
            "Resident",
            self.max_write_attempts,
            |resident: &mut Resident| {
                if resident.apartment_id != apartment_id {
                    return Err(DomainError::not_found("Resident"));
                }
                apply(resident)
            },
        )
        .await
    }
}
