//! Login ViewModel
//!
//! Login form state with async sign-in.

use tokio::sync::mpsc;

use syndic_core::repositories::AuthUser;
use syndic_core::services::SignInForm;

use super::spawn_request;
use crate::context::AppContext;
use crate::events::{AppEvent, Outcome};
use crate::i18n::{Translator, UserMessage};

pub struct LoginViewModel {
    pub email: String,
    pub password: String,
    pub error: Option<String>,
    pub is_loading: bool,
    pub show_password: bool,
    ctx: AppContext,
    event_tx: mpsc::UnboundedSender<AppEvent>,
}

impl LoginViewModel {
    pub fn new(ctx: AppContext, event_tx: mpsc::UnboundedSender<AppEvent>) -> Self {
        Self {
            email: String::new(),
            password: String::new(),
            error: None,
            is_loading: false,
            show_password: false,
            ctx,
            event_tx,
        }
    }

    /// Attempt login - non-blocking
    pub fn login(&mut self) {
        if self.is_loading {
            return;
        }
        if self.email.trim().is_empty() || self.password.is_empty() {
            self.error = Some("Email and password are required".to_string());
            return;
        }

        self.error = None;
        self.is_loading = true;

        let auth = self.ctx.auth.clone();
        let form = SignInForm {
            email: self.email.clone(),
            password: self.password.clone(),
        };
        spawn_request(&self.event_tx, async move { auth.sign_in(form).await }, AppEvent::SignedIn);
    }

    pub fn on_result(&mut self, result: &Outcome<AuthUser>, translator: &Translator) {
        self.is_loading = false;
        match result {
            Ok(_) => {
                self.error = None;
                self.password.clear();
            }
            Err(e) => self.error = Some(e.user_message(translator)),
        }
    }

    pub fn reset(&mut self) {
        self.password.clear();
        self.error = None;
        self.is_loading = false;
    }
}
