// ============================================================================
// Syndic Core - Apartment Service
// File: crates/syndic-core/src/services/apartment_service.rs
// ============================================================================

use chrono::Utc;
use futures::future::join_all;
use serde_json::Value;
use std::sync::Arc;
use syndic_shared::constants::{COLLECTION_APARTMENTS, COLLECTION_RESIDENTS};
use tracing::{info, warn};
use validator::Validate;

use super::gateway::{decode, encode, fields, remote_failure};
use crate::domain::{Actor, Apartment, ApartmentData, ApartmentUpdate, JoinCode, Resident};
use crate::error::{DomainError, StoreError};
use crate::repositories::DocumentStore;

pub struct ApartmentService<S: DocumentStore + ?Sized> {
    store: Arc<S>,
}

impl<S: DocumentStore + ?Sized> Clone for ApartmentService<S> {
    fn clone(&self) -> Self {
        Self { store: Arc::clone(&self.store) }
    }
}

impl<S: DocumentStore + ?Sized> ApartmentService<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    pub async fn get_apartment(&self, apartment_id: &str) -> Result<Apartment, DomainError> {
        let document = self
            .store
            .get(COLLECTION_APARTMENTS, apartment_id)
            .await
            .map_err(|e| remote_failure("read", COLLECTION_APARTMENTS, e))?
            .ok_or_else(|| DomainError::not_found("Apartment"))?;
        decode(&document)
    }

    /// Apartment plus its resident rows. Dangling resident ids are skipped.
    pub async fn get_apartment_data(&self, apartment_id: &str) -> Result<ApartmentData, DomainError> {
        let apartment = self.get_apartment(apartment_id).await?;

        let reads = apartment
            .resident_ids
            .iter()
            .map(|id| self.store.get(COLLECTION_RESIDENTS, id));
        let documents = join_all(reads).await;

        let mut residents = Vec::with_capacity(documents.len());
        for (id, document) in apartment.resident_ids.iter().zip(documents) {
            match document.map_err(|e| remote_failure("read", COLLECTION_RESIDENTS, e))? {
                Some(doc) => residents.push(decode::<Resident>(&doc)?),
                None => warn!("Apartment {} lists missing resident {}", apartment_id, id),
            }
        }

        Ok(ApartmentData { apartment, residents })
    }

    pub async fn find_by_join_code(&self, code: &JoinCode) -> Result<Apartment, DomainError> {
        let matches = self
            .store
            .find_by_field(COLLECTION_APARTMENTS, "joinCode", &Value::String(code.to_string()))
            .await
            .map_err(|e| remote_failure("query", COLLECTION_APARTMENTS, e))?;

        if matches.len() > 1 {
            warn!("Join code {} matches {} apartments, using the first", code, matches.len());
        }
        let document = matches
            .first()
            .ok_or_else(|| DomainError::not_found("Apartment"))?;
        decode(document)
    }

    pub async fn update_apartment(
        &self,
        actor: &Actor,
        apartment_id: &str,
        update: ApartmentUpdate,
    ) -> Result<Apartment, DomainError> {
        actor.ensure_manager(apartment_id)?;
        let update = ApartmentUpdate {
            name: update.name.map(|n| n.trim().to_string()),
            ..update
        };
        update.validate()?;

        let mut changes = vec![("updatedAt", encode(&Utc::now())?)];
        if let Some(name) = &update.name {
            changes.push(("name", Value::String(name.clone())));
        }
        if let Some(count) = update.number_of_residents {
            changes.push(("numberOfResidents", Value::from(count)));
        }

        self.store
            .update_fields(COLLECTION_APARTMENTS, apartment_id, fields(changes))
            .await
            .map_err(|e| match e {
                StoreError::NotFound { .. } => DomainError::not_found("Apartment"),
                other => remote_failure("update", COLLECTION_APARTMENTS, other),
            })?;

        info!("Apartment {} updated by {}", apartment_id, actor.user_id);
        self.get_apartment(apartment_id).await
    }
}
