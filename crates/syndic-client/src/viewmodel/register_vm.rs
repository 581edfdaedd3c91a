//! Registration form

use tokio::sync::mpsc;

use syndic_core::repositories::AuthUser;
use syndic_core::services::SignUpForm;

use super::spawn_request;
use crate::context::AppContext;
use crate::events::{AppEvent, Outcome};
use crate::i18n::{Translator, UserMessage};

pub struct RegisterViewModel {
    pub display_name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    pub error: Option<String>,
    pub is_loading: bool,
    ctx: AppContext,
    event_tx: mpsc::UnboundedSender<AppEvent>,
}

impl RegisterViewModel {
    pub fn new(ctx: AppContext, event_tx: mpsc::UnboundedSender<AppEvent>) -> Self {
        Self {
            display_name: String::new(),
            email: String::new(),
            password: String::new(),
            confirm_password: String::new(),
            error: None,
            is_loading: false,
            ctx,
            event_tx,
        }
    }

    pub fn register(&mut self) {
        if self.is_loading {
            return;
        }
        if self.password != self.confirm_password {
            self.error = Some("Passwords do not match".to_string());
            return;
        }

        self.error = None;
        self.is_loading = true;

        let auth = self.ctx.auth.clone();
        let form = SignUpForm {
            display_name: self.display_name.clone(),
            email: self.email.clone(),
            password: self.password.clone(),
        };
        spawn_request(&self.event_tx, async move { auth.sign_up(form).await }, AppEvent::SignedUp);
    }

    pub fn on_result(&mut self, result: &Outcome<AuthUser>, translator: &Translator) {
        self.is_loading = false;
        match result {
            Ok(_) => {
                self.error = None;
                self.password.clear();
                self.confirm_password.clear();
            }
            Err(e) => self.error = Some(e.user_message(translator)),
        }
    }

    pub fn reset(&mut self) {
        self.password.clear();
        self.confirm_password.clear();
        self.error = None;
        self.is_loading = false;
    }
}
