//! ViewModel Module
//!
//! Screen state plus the async calls behind it. Each call runs in a
//! spawned task and reports back through an `AppEvent`.

pub mod login_vm;
pub mod register_vm;
pub mod onboarding_vm;
pub mod apartment_vm;
pub mod expense_vm;
pub mod meeting_vm;
pub mod issue_vm;
pub mod settings_vm;

pub use apartment_vm::ApartmentViewModel;
pub use expense_vm::ExpenseViewModel;
pub use issue_vm::IssueViewModel;
pub use login_vm::LoginViewModel;
pub use meeting_vm::MeetingViewModel;
pub use onboarding_vm::OnboardingViewModel;
pub use register_vm::RegisterViewModel;
pub use settings_vm::SettingsViewModel;

use std::future::Future;
use tokio::sync::mpsc;

use syndic_core::error::DomainError;

use crate::context::AppContext;
use crate::events::{AppEvent, Outcome};

/// Run `work` in the background and deliver its outcome as an event.
pub(crate) fn spawn_request<T, F>(event_tx: &mpsc::UnboundedSender<AppEvent>, work: F, into_event: fn(Outcome<T>) -> AppEvent)
where
    T: Send + 'static,
    F: Future<Output = Outcome<T>> + Send + 'static,
{
    let tx = event_tx.clone();
    tokio::spawn(async move {
        let _ = tx.send(into_event(work.await));
    });
}

/// Like `spawn_request`, but tagged with the session it started under so the
/// app can drop the outcome once that session is gone.
pub(crate) fn spawn_scoped<T, F>(
    ctx: &AppContext,
    event_tx: &mpsc::UnboundedSender<AppEvent>,
    work: F,
    into_event: fn(Outcome<T>) -> AppEvent,
) where
    T: Send + 'static,
    F: Future<Output = Outcome<T>> + Send + 'static,
{
    let epoch = ctx.session_epoch.current();
    let tx = event_tx.clone();
    tokio::spawn(async move {
        let event = into_event(work.await);
        let _ = tx.send(AppEvent::Scoped {
            epoch,
            event: Box::new(event),
        });
    });
}

pub(crate) fn parse_amount(input: &str, field: &str) -> Result<f64, DomainError> {
    let value: f64 = input
        .trim()
        .replace(',', ".")
        .parse()
        .map_err(|_| DomainError::validation(format!("{} must be a number", field)))?;
    if !value.is_finite() {
        return Err(DomainError::validation(format!("{} must be a number", field)));
    }
    Ok(value)
}

pub(crate) fn parse_count(input: &str, field: &str) -> Result<u32, DomainError> {
    input
        .trim()
        .parse()
        .map_err(|_| DomainError::validation(format!("{} must be a whole number", field)))
}
