//! Dashboard and residents screens

use tokio::sync::mpsc;

use syndic_core::domain::{Actor, Apartment, ApartmentData, ApartmentUpdate, NewResident, Resident};
use syndic_core::error::DomainError;

use super::{parse_amount, spawn_scoped};
use crate::context::AppContext;
use crate::events::{AppEvent, Outcome};
use crate::i18n::{Translator, UserMessage};

pub struct ApartmentViewModel {
    pub data: Option<ApartmentData>,

    pub resident_name: String,
    pub resident_fee: String,
    pub resident_owed: String,
    pub payment_amount: String,
    pub apartment_name: String,

    pub error: Option<String>,
    pub is_loading: bool,
    ctx: AppContext,
    event_tx: mpsc::UnboundedSender<AppEvent>,
}

impl ApartmentViewModel {
    pub fn new(ctx: AppContext, event_tx: mpsc::UnboundedSender<AppEvent>) -> Self {
        Self {
            data: None,
            resident_name: String::new(),
            resident_fee: String::new(),
            resident_owed: String::new(),
            payment_amount: String::new(),
            apartment_name: String::new(),
            error: None,
            is_loading: false,
            ctx,
            event_tx,
        }
    }

    pub fn residents(&self) -> &[Resident] {
        self.data.as_ref().map(|d| d.residents.as_slice()).unwrap_or(&[])
    }

    pub fn refresh(&mut self, actor: &Actor) {
        let Some(apartment_id) = actor.apartment_id.clone() else {
            return;
        };
        self.is_loading = true;
        let apartments = self.ctx.apartments.clone();
        let actor = actor.clone();
        spawn_scoped(
            &self.ctx,
            &self.event_tx,
            async move {
                actor.ensure_member(&apartment_id)?;
                apartments.get_apartment_data(&apartment_id).await
            },
            AppEvent::ApartmentLoaded,
        );
    }

    pub fn on_loaded(&mut self, result: &Outcome<ApartmentData>, translator: &Translator) {
        self.is_loading = false;
        match result {
            Ok(data) => {
                self.error = None;
                self.apartment_name = data.apartment.name.clone();
                self.data = Some(data.clone());
            }
            Err(e) => self.error = Some(e.user_message(translator)),
        }
    }

    fn resident_form(&self) -> Result<NewResident, DomainError> {
        let monthly_fee = parse_amount(&self.resident_fee, "Monthly fee")?;
        let remaining_amount = if self.resident_owed.trim().is_empty() {
            None
        } else {
            Some(parse_amount(&self.resident_owed, "Remaining amount")?)
        };
        Ok(NewResident {
            name: self.resident_name.trim().to_string(),
            monthly_fee,
            remaining_amount,
        })
    }

    pub fn add_resident(&mut self, actor: &Actor, translator: &Translator) {
        let Some(apartment_id) = actor.apartment_id.clone() else {
            return;
        };
        if self.is_loading {
            return;
        }
        let form = match self.resident_form() {
            Ok(form) => form,
            Err(e) => {
                self.error = Some(e.user_message(translator));
                return;
            }
        };
        self.is_loading = true;
        let residents = self.ctx.residents.clone();
        let actor = actor.clone();
        spawn_scoped(
            &self.ctx,
            &self.event_tx,
            async move { residents.add_resident(&actor, &apartment_id, form).await },
            AppEvent::ResidentSaved,
        );
    }

    pub fn record_payment(&mut self, actor: &Actor, resident_id: &str, translator: &Translator) {
        let Some(apartment_id) = actor.apartment_id.clone() else {
            return;
        };
        if self.is_loading {
            return;
        }
        let amount = match parse_amount(&self.payment_amount, "Payment") {
            Ok(amount) => amount,
            Err(e) => {
                self.error = Some(e.user_message(translator));
                return;
            }
        };
        self.is_loading = true;
        let residents = self.ctx.residents.clone();
        let actor = actor.clone();
        let resident_id = resident_id.to_string();
        spawn_scoped(
            &self.ctx,
            &self.event_tx,
            async move { residents.record_payment(&actor, &apartment_id, &resident_id, amount).await },
            AppEvent::ResidentSaved,
        );
    }

    pub fn on_resident_saved(&mut self, result: &Outcome<Resident>, translator: &Translator) {
        self.is_loading = false;
        match result {
            Ok(resident) => {
                self.error = None;
                self.resident_name.clear();
                self.resident_fee.clear();
                self.resident_owed.clear();
                self.payment_amount.clear();
                if let Some(data) = self.data.as_mut() {
                    match data.residents.iter_mut().find(|r| r.id == resident.id) {
                        Some(existing) => *existing = resident.clone(),
                        None => {
                            data.apartment.resident_ids.push(resident.id.clone());
                            data.residents.push(resident.clone());
                        }
                    }
                }
            }
            Err(e) => self.error = Some(e.user_message(translator)),
        }
    }

    pub fn charge_monthly_fees(&mut self, actor: &Actor) {
        let Some(apartment_id) = actor.apartment_id.clone() else {
            return;
        };
        if self.is_loading {
            return;
        }
        self.is_loading = true;
        let residents = self.ctx.residents.clone();
        let actor = actor.clone();
        spawn_scoped(
            &self.ctx,
            &self.event_tx,
            async move { residents.charge_monthly_fees(&actor, &apartment_id).await },
            AppEvent::FeesCharged,
        );
    }

    pub fn on_fees_charged(&mut self, result: &Outcome<Vec<Resident>>, translator: &Translator) {
        self.is_loading = false;
        match result {
            Ok(charged) => {
                self.error = None;
                if let Some(data) = self.data.as_mut() {
                    data.residents = charged.clone();
                }
            }
            Err(e) => self.error = Some(e.user_message(translator)),
        }
    }

    pub fn rename(&mut self, actor: &Actor) {
        let Some(apartment_id) = actor.apartment_id.clone() else {
            return;
        };
        if self.is_loading {
            return;
        }
        self.is_loading = true;
        let apartments = self.ctx.apartments.clone();
        let actor = actor.clone();
        let update = ApartmentUpdate {
            name: Some(self.apartment_name.clone()),
            number_of_residents: None,
        };
        spawn_scoped(
            &self.ctx,
            &self.event_tx,
            async move { apartments.update_apartment(&actor, &apartment_id, update).await },
            AppEvent::ApartmentSaved,
        );
    }

    pub fn on_apartment_saved(&mut self, result: &Outcome<Apartment>, translator: &Translator) {
        self.is_loading = false;
        match result {
            Ok(apartment) => {
                self.error = None;
                if let Some(data) = self.data.as_mut() {
                    data.apartment = apartment.clone();
                }
            }
            Err(e) => self.error = Some(e.user_message(translator)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use syndic_core::domain::{Language, Role};
    use syndic_core::repositories::MockImageHost;
    use syndic_infrastructure::{FilePreferencesStore, LocalAuthProvider, MemoryDocumentStore};

    fn view_model() -> (ApartmentViewModel, mpsc::UnboundedReceiver<AppEvent>) {
        let ctx = AppContext::new(
            Arc::new(MemoryDocumentStore::new()),
            Arc::new(LocalAuthProvider::new()),
            Arc::new(MockImageHost::new()),
            Arc::new(FilePreferencesStore::new("unused.toml")),
            5,
        );
        let (tx, rx) = mpsc::unbounded_channel();
        (ApartmentViewModel::new(ctx, tx), rx)
    }

    #[tokio::test]
    async fn test_second_tap_while_loading_sends_nothing() {
        let (mut vm, mut rx) = view_model();
        let actor = Actor::new("u-syndic", "Samir").with_membership(Role::Syndic, "apt-1");

        vm.charge_monthly_fees(&actor);
        vm.charge_monthly_fees(&actor);
        vm.payment_amount = "50".into();
        vm.record_payment(&actor, "r-1", &Translator::new(Language::En));
        vm.rename(&actor);
        assert!(vm.is_loading);

        let first = rx.recv().await.unwrap();
        assert!(matches!(
            first,
            AppEvent::Scoped { ref event, .. } if matches!(**event, AppEvent::FeesCharged(_))
        ));
        tokio::task::yield_now().await;
        assert!(rx.try_recv().is_err());
    }
}
