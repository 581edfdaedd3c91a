//! Profile editing and sign-out

use tokio::sync::mpsc;

use syndic_core::domain::{ProfileUpdate, UserProfile};
use syndic_shared::utils::non_empty;

use super::{spawn_request, spawn_scoped};
use crate::context::AppContext;
use crate::events::{AppEvent, Outcome};
use crate::i18n::{Translator, UserMessage};

pub struct SettingsViewModel {
    pub display_name: String,
    pub phone: String,
    pub error: Option<String>,
    pub saved: bool,
    pub is_loading: bool,
    ctx: AppContext,
    event_tx: mpsc::UnboundedSender<AppEvent>,
}

impl SettingsViewModel {
    pub fn new(ctx: AppContext, event_tx: mpsc::UnboundedSender<AppEvent>) -> Self {
        Self {
            display_name: String::new(),
            phone: String::new(),
            error: None,
            saved: false,
            is_loading: false,
            ctx,
            event_tx,
        }
    }

    pub fn fill(&mut self, profile: &UserProfile) {
        self.display_name = profile.display_name.clone();
        self.phone = profile.phone.clone().unwrap_or_default();
        self.saved = false;
    }

    pub fn save(&mut self) {
        if self.is_loading {
            return;
        }
        self.error = None;
        self.saved = false;
        self.is_loading = true;

        let auth = self.ctx.auth.clone();
        let update = ProfileUpdate {
            display_name: non_empty(Some(self.display_name.clone())),
            phone: non_empty(Some(self.phone.clone())),
        };
        spawn_scoped(
            &self.ctx,
            &self.event_tx,
            async move { auth.update_profile(update).await },
            AppEvent::ProfileSaved,
        );
    }

    pub fn on_saved(&mut self, result: &Outcome<UserProfile>, translator: &Translator) {
        self.is_loading = false;
        match result {
            Ok(profile) => {
                self.fill(profile);
                self.saved = true;
            }
            Err(e) => self.error = Some(e.user_message(translator)),
        }
    }

    pub fn sign_out(&mut self) {
        let auth = self.ctx.auth.clone();
        spawn_request(&self.event_tx, async move { auth.sign_out().await }, AppEvent::SignedOut);
    }

    pub fn reset(&mut self) {
        self.display_name.clear();
        self.phone.clear();
        self.error = None;
        self.saved = false;
        self.is_loading = false;
    }
}
