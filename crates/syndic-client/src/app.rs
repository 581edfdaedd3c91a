//! Root Application
//!
//! Owns the event channel, the session observer, the onboarding status
//! resolver and the navigation gate. Background tasks report through
//! `AppEvent`; `process_events` folds them into screen state on the UI loop.

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use syndic_core::domain::{Actor, Language};
use syndic_core::error::DomainError;
use syndic_core::repositories::AuthUser;

use crate::context::AppContext;
use crate::events::AppEvent;
use crate::i18n::{I18nController, RenderConfig, Translator, UserMessage};
use crate::navigation::{GateState, NavigationGate, Route};
use crate::session::SessionObserver;
use crate::status::StatusResolver;
use crate::theme::Theme;
use crate::viewmodel::{
    ApartmentViewModel, ExpenseViewModel, IssueViewModel, LoginViewModel, MeetingViewModel, OnboardingViewModel,
    RegisterViewModel, SettingsViewModel,
};

pub struct App {
    pub login_vm: LoginViewModel,
    pub register_vm: RegisterViewModel,
    pub onboarding_vm: OnboardingViewModel,
    pub apartment_vm: ApartmentViewModel,
    pub expense_vm: ExpenseViewModel,
    pub meeting_vm: MeetingViewModel,
    pub issue_vm: IssueViewModel,
    pub settings_vm: SettingsViewModel,

    ctx: AppContext,
    event_tx: mpsc::UnboundedSender<AppEvent>,
    event_rx: mpsc::UnboundedReceiver<AppEvent>,
    session: SessionObserver,
    resolver: StatusResolver,
    gate: NavigationGate,
    i18n: I18nController,
    theme: Theme,
    deferred_route: Option<Route>,
}

impl App {
    pub async fn new(ctx: AppContext, default_language: Language) -> Self {
        let (event_tx, event_rx) = mpsc::unbounded_channel();

        let session = SessionObserver::spawn(ctx.auth.subscribe(), event_tx.clone());
        let resolver = StatusResolver::new(ctx.profiles.clone(), event_tx.clone());
        let i18n = I18nController::load(ctx.preferences.clone(), default_language).await;
        let theme = Theme::resolve(i18n.theme(), false);

        let mut app = Self {
            login_vm: LoginViewModel::new(ctx.clone(), event_tx.clone()),
            register_vm: RegisterViewModel::new(ctx.clone(), event_tx.clone()),
            onboarding_vm: OnboardingViewModel::new(ctx.clone(), event_tx.clone()),
            apartment_vm: ApartmentViewModel::new(ctx.clone(), event_tx.clone()),
            expense_vm: ExpenseViewModel::new(ctx.clone(), event_tx.clone()),
            meeting_vm: MeetingViewModel::new(ctx.clone(), event_tx.clone()),
            issue_vm: IssueViewModel::new(ctx.clone(), event_tx.clone()),
            settings_vm: SettingsViewModel::new(ctx.clone(), event_tx.clone()),
            ctx,
            event_tx,
            event_rx,
            session,
            resolver,
            gate: NavigationGate::new(),
            i18n,
            theme,
            deferred_route: None,
        };

        // Restored session: hold on the splash screen until the status is known.
        if let Some(user) = app.session.current_user().cloned() {
            app.gate.transition(GateState::OnboardingUnknown);
            app.resolver.resolve(&user.id);
        }
        app
    }

    pub fn gate(&self) -> &NavigationGate {
        &self.gate
    }

    pub fn current_route(&self) -> &Route {
        self.gate.current()
    }

    pub fn current_user(&self) -> Option<&AuthUser> {
        self.session.current_user()
    }

    pub fn render_config(&self) -> RenderConfig {
        self.i18n.render_config()
    }

    pub fn translator(&self) -> Translator {
        self.i18n.translator()
    }

    pub fn is_rtl(&self) -> bool {
        self.i18n.is_rtl()
    }

    pub fn is_changing_language(&self) -> bool {
        self.i18n.is_changing_language()
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    pub fn context(&self) -> &AppContext {
        &self.ctx
    }

    /// Caller identity for building-scoped calls. Only available once onboarding is complete.
    pub fn actor(&self) -> Option<Actor> {
        let user = self.session.current_user()?;
        match self.gate.state() {
            GateState::OnboardingComplete { role, apartment_id } => {
                Some(Actor::new(user.id.clone(), user.display_name.clone()).with_membership(*role, apartment_id.clone()))
            }
            _ => None,
        }
    }

    /// Navigation is frozen while the layout direction is being switched.
    pub fn navigate(&mut self, route: Route) -> &Route {
        if self.i18n.is_changing_language() {
            debug!("Ignoring navigation to {:?} during language change", route);
            return self.gate.current();
        }
        self.gate.navigate(route)
    }

    pub fn back(&mut self) -> bool {
        if self.i18n.is_changing_language() {
            return false;
        }
        self.gate.back()
    }

    /// Re-check onboarding after a write, e.g. "continue" on the success screen.
    pub fn refresh_status(&mut self) -> bool {
        match self.session.current_user() {
            Some(user) => {
                let user_id = user.id.clone();
                self.resolver.refresh(&user_id)
            }
            None => false,
        }
    }

    /// Persist the language in the background; the switch lands with `LanguageSaved`.
    pub fn change_language(&mut self, language: Language) -> bool {
        let Some(preferences) = self.i18n.begin_change(language) else {
            return false;
        };
        let store = self.i18n.store();
        let tx = self.event_tx.clone();
        tokio::spawn(async move {
            let result = store.save(&preferences).await;
            let _ = tx.send(AppEvent::LanguageSaved { language, result });
        });
        true
    }

    pub async fn toggle_theme(&mut self) -> Result<Theme, DomainError> {
        let next = self.theme.toggled();
        self.i18n.set_theme(next.as_preference()).await?;
        self.theme = next;
        Ok(next)
    }

    /// Drain every pending event without waiting. Returns how many were handled.
    pub fn process_events(&mut self) -> usize {
        let mut handled = 0;
        while let Ok(event) = self.event_rx.try_recv() {
            self.handle_event(event);
            handled += 1;
        }
        handled
    }

    /// Wait for the next event and handle it.
    pub async fn next_event(&mut self) -> bool {
        match self.event_rx.recv().await {
            Some(event) => {
                self.handle_event(event);
                true
            }
            None => false,
        }
    }

    fn handle_event(&mut self, event: AppEvent) {
        let translator = self.i18n.translator();
        match event {
            AppEvent::SessionChanged(user) => self.on_session_changed(user),
            AppEvent::StatusResolved {
                generation,
                user_id,
                status,
            } => {
                if let Some(status) = self.resolver.accept(generation, &user_id, status) {
                    let state = match (status.completed, status.role, status.apartment_id) {
                        (true, Some(role), Some(apartment_id)) => GateState::OnboardingComplete { role, apartment_id },
                        _ => GateState::OnboardingIncomplete,
                    };
                    if self.gate.transition(state) && matches!(self.gate.state(), GateState::OnboardingComplete { .. }) {
                        self.load_home();
                    }
                }
            }
            AppEvent::LanguageSaved { language, result } => {
                self.i18n.finish_change(language, result);
                if let Some(route) = self.deferred_route.take() {
                    self.gate.navigate(route);
                }
            }
            AppEvent::Scoped { epoch, event } => {
                if epoch == self.ctx.session_epoch.current() {
                    self.handle_event(*event);
                } else {
                    debug!("Dropping result from session epoch {}", epoch);
                }
            }

            AppEvent::SignedIn(result) => self.login_vm.on_result(&result, &translator),
            AppEvent::SignedUp(result) => self.register_vm.on_result(&result, &translator),
            AppEvent::SignedOut(result) => {
                if let Err(e) = result {
                    warn!("Sign-out failed: {}", e);
                    self.settings_vm.error = Some(e.user_message(&translator));
                }
            }

            AppEvent::ApartmentCreated(result) => {
                self.onboarding_vm.on_created(&result, &translator);
                if let Ok(apartment) = result {
                    self.navigate_or_defer(Route::OnboardingSuccess {
                        join_code: apartment.join_code,
                    });
                }
            }
            AppEvent::JoinCodeResolved(result) => {
                self.onboarding_vm.on_join_resolved(&result, &translator);
                if let Ok(data) = result {
                    self.navigate_or_defer(Route::SelectResident {
                        apartment_id: data.apartment.id,
                    });
                }
            }
            AppEvent::ResidentClaimed(result) => {
                self.onboarding_vm.on_claimed(&result, &translator);
                if result.is_ok() {
                    self.refresh_status();
                }
            }

            AppEvent::ApartmentLoaded(result) => self.apartment_vm.on_loaded(&result, &translator),
            AppEvent::ApartmentSaved(result) => self.apartment_vm.on_apartment_saved(&result, &translator),
            AppEvent::ResidentSaved(result) => self.apartment_vm.on_resident_saved(&result, &translator),
            AppEvent::FeesCharged(result) => self.apartment_vm.on_fees_charged(&result, &translator),

            AppEvent::ExpensesLoaded(result) => self.expense_vm.on_loaded(&result, &translator),
            AppEvent::ExpenseSaved(result) => self.expense_vm.on_saved(&result, &translator),
            AppEvent::ExpenseDeleted(result) => self.expense_vm.on_deleted(&result, &translator),

            AppEvent::MeetingsLoaded(result) => self.meeting_vm.on_loaded(&result, &translator),
            AppEvent::MeetingSaved(result) => self.meeting_vm.on_saved(&result, &translator),
            AppEvent::MeetingDeleted(result) => self.meeting_vm.on_deleted(&result, &translator),

            AppEvent::IssuesLoaded(result) => self.issue_vm.on_loaded(&result, &translator),
            AppEvent::IssueSaved(result) => self.issue_vm.on_saved(&result, &translator),

            AppEvent::ProfileSaved(result) => self.settings_vm.on_saved(&result, &translator),
        }
    }

    fn on_session_changed(&mut self, user: Option<AuthUser>) {
        if !self.session.apply(user.clone()) {
            return;
        }
        let epoch = self.ctx.session_epoch.advance();
        debug!("Session epoch {}", epoch);
        self.deferred_route = None;
        match user {
            Some(user) => {
                info!("Resolving onboarding for {}", user.id);
                self.gate.transition(GateState::OnboardingUnknown);
                self.resolver.resolve(&user.id);
                self.settings_vm.display_name = user.display_name;
            }
            None => {
                self.resolver.clear();
                self.gate.transition(GateState::Unauthenticated);
                self.reset_screens();
            }
        }
    }

    /// Result-driven navigation waits for a pending language switch to land.
    fn navigate_or_defer(&mut self, route: Route) {
        if self.i18n.is_changing_language() {
            debug!("Deferring navigation to {:?} until the language is saved", route);
            self.deferred_route = Some(route);
        } else {
            self.gate.navigate(route);
        }
    }

    fn load_home(&mut self) {
        let Some(actor) = self.actor() else {
            return;
        };
        self.apartment_vm.refresh(&actor);
        self.expense_vm.refresh(&actor);
        self.meeting_vm.refresh(&actor);
        self.issue_vm.refresh(&actor);
    }

    fn reset_screens(&mut self) {
        let (ctx, tx) = (&self.ctx, &self.event_tx);
        self.login_vm.reset();
        self.register_vm.reset();
        self.onboarding_vm.reset();
        self.apartment_vm = ApartmentViewModel::new(ctx.clone(), tx.clone());
        self.expense_vm = ExpenseViewModel::new(ctx.clone(), tx.clone());
        self.meeting_vm = MeetingViewModel::new(ctx.clone(), tx.clone());
        self.issue_vm = IssueViewModel::new(ctx.clone(), tx.clone());
        self.settings_vm.reset();
    }
}
