//! Session, onboarding and navigation flows through the root `App`

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{Map, Value};
use tempfile::TempDir;

use syndic_client::{App, AppContext, Direction, GateState, HomeTab, Route};
use syndic_core::domain::{ExpenseType, Language, Role};
use syndic_core::error::StoreError;
use syndic_core::repositories::{Document, DocumentStore, MockImageHost, Revision};
use syndic_infrastructure::{FilePreferencesStore, LocalAuthProvider, MemoryDocumentStore};
use syndic_shared::constants::COLLECTION_EXPENSES;

/// Memory store whose expense reads can be held back.
#[derive(Default)]
struct SlowExpenses {
    inner: MemoryDocumentStore,
    hold: AtomicBool,
}

#[async_trait]
impl DocumentStore for SlowExpenses {
    async fn get(&self, collection: &str, key: &str) -> Result<Option<Document>, StoreError> {
        if collection == COLLECTION_EXPENSES && self.hold.load(Ordering::SeqCst) {
            tokio::time::sleep(Duration::from_millis(200)).await;
        }
        self.inner.get(collection, key).await
    }

    async fn set(&self, collection: &str, key: &str, body: Value) -> Result<Revision, StoreError> {
        self.inner.set(collection, key, body).await
    }

    async fn update_fields(
        &self,
        collection: &str,
        key: &str,
        fields: Map<String, Value>,
    ) -> Result<Revision, StoreError> {
        self.inner.update_fields(collection, key, fields).await
    }

    async fn array_union(
        &self,
        collection: &str,
        key: &str,
        field: &str,
        values: Vec<Value>,
    ) -> Result<Revision, StoreError> {
        self.inner.array_union(collection, key, field, values).await
    }

    async fn replace_if(
        &self,
        collection: &str,
        key: &str,
        expected: Option<Revision>,
        body: Value,
    ) -> Result<Revision, StoreError> {
        self.inner.replace_if(collection, key, expected, body).await
    }

    async fn find_by_field(&self, collection: &str, field: &str, value: &Value) -> Result<Vec<Document>, StoreError> {
        self.inner.find_by_field(collection, field, value).await
    }
}

async fn app(dir: &TempDir) -> App {
    app_with_store(dir, Arc::new(MemoryDocumentStore::new())).await
}

async fn app_with_store(dir: &TempDir, store: Arc<dyn DocumentStore>) -> App {
    let ctx = AppContext::new(
        store,
        Arc::new(LocalAuthProvider::new()),
        Arc::new(MockImageHost::new()),
        Arc::new(FilePreferencesStore::new(dir.path().join("preferences.toml"))),
        5,
    );
    App::new(ctx, Language::En).await
}

/// Handle events until `done` holds.
async fn pump_until(app: &mut App, done: impl Fn(&App) -> bool) {
    while !done(app) {
        let handled = tokio::time::timeout(Duration::from_secs(10), app.next_event())
            .await
            .expect("timed out waiting for app event");
        assert!(handled, "event channel closed");
    }
}

async fn register(app: &mut App, name: &str, email: &str) {
    app.navigate(Route::Register);
    app.register_vm.display_name = name.to_string();
    app.register_vm.email = email.to_string();
    app.register_vm.password = "secret123".to_string();
    app.register_vm.confirm_password = "secret123".to_string();
    app.register_vm.register();
    pump_until(app, |a| !a.register_vm.is_loading && a.gate().state() == &GateState::OnboardingIncomplete).await;
}

async fn sign_out(app: &mut App) {
    app.settings_vm.sign_out();
    pump_until(app, |a| a.gate().state() == &GateState::Unauthenticated).await;
}

/// Syndic onboarding for "Sunset Villas"; returns the join code shown on the success screen.
async fn create_sunset_villas(app: &mut App) -> String {
    register(app, "Samir", "samir@example.com").await;

    app.navigate(Route::CreateApartment);
    app.onboarding_vm.apartment_name = "Sunset Villas".to_string();
    app.onboarding_vm.number_of_residents = "12".to_string();
    app.onboarding_vm.syndic_name = "Samir".to_string();
    app.onboarding_vm.monthly_fee = "250".to_string();
    let user = app.current_user().cloned().unwrap();
    let translator = app.translator();
    app.onboarding_vm.create_apartment(&user, &translator);

    pump_until(app, |a| matches!(a.current_route(), Route::OnboardingSuccess { .. })).await;
    match app.current_route() {
        Route::OnboardingSuccess { join_code } => join_code.as_str().to_string(),
        other => panic!("unexpected route {:?}", other),
    }
}

#[tokio::test]
async fn unauthenticated_start_shows_login() {
    let dir = TempDir::new().unwrap();
    let mut app = app(&dir).await;

    assert_eq!(app.gate().state(), &GateState::Unauthenticated);
    assert_eq!(app.gate().stack(), &[Route::Login]);
    assert!(app.actor().is_none());

    app.navigate(Route::Home(HomeTab::Expenses));
    assert_eq!(app.current_route(), &Route::Login);

    app.navigate(Route::Register);
    assert_eq!(app.gate().stack(), &[Route::Login, Route::Register]);
    assert!(app.back());
    assert!(!app.back());
}

#[tokio::test]
async fn new_account_lands_on_role_choice_and_deep_links_redirect() {
    let dir = TempDir::new().unwrap();
    let mut app = app(&dir).await;

    register(&mut app, "Samir", "samir@example.com").await;
    assert_eq!(app.gate().stack(), &[Route::ChooseRole]);

    app.navigate(Route::Home(HomeTab::Expenses));
    assert_eq!(app.gate().stack(), &[Route::ChooseRole]);

    app.navigate(Route::JoinApartment);
    assert_eq!(app.current_route(), &Route::JoinApartment);
    app.navigate(Route::Login);
    assert_eq!(app.gate().stack(), &[Route::ChooseRole]);
}

#[tokio::test]
async fn syndic_onboarding_reaches_home_after_refresh() {
    let dir = TempDir::new().unwrap();
    let mut app = app(&dir).await;

    let code = create_sunset_villas(&mut app).await;
    let created = app.onboarding_vm.created.clone().unwrap();
    assert_eq!(created.name, "Sunset Villas");
    assert_eq!(created.number_of_residents, 12);
    assert_eq!(created.join_code.as_str(), code);
    assert_eq!(code.len(), 8);
    // Still onboarding until the user continues.
    assert_eq!(app.gate().state(), &GateState::OnboardingIncomplete);

    assert!(app.refresh_status());
    pump_until(&mut app, |a| matches!(a.gate().state(), GateState::OnboardingComplete { .. })).await;

    assert_eq!(app.gate().stack(), &[Route::Home(HomeTab::Dashboard)]);
    assert_eq!(app.gate().tabs().len(), 6);
    let actor = app.actor().unwrap();
    assert_eq!(actor.role, Some(Role::Syndic));
    assert_eq!(actor.apartment_id.as_deref(), Some(created.id.as_str()));

    app.navigate(Route::AddExpense);
    assert_eq!(app.current_route(), &Route::AddExpense);

    sign_out(&mut app).await;
    assert_eq!(app.gate().stack(), &[Route::Login]);
    assert!(app.actor().is_none());
    assert!(app.apartment_vm.data.is_none());
}

#[tokio::test]
async fn resident_joins_with_code_and_claims_a_row() {
    let dir = TempDir::new().unwrap();
    let mut app = app(&dir).await;

    let code = create_sunset_villas(&mut app).await;
    app.refresh_status();
    pump_until(&mut app, |a| a.apartment_vm.data.is_some()).await;

    let syndic = app.actor().unwrap();
    app.apartment_vm.resident_name = "Karim".to_string();
    app.apartment_vm.resident_fee = "300".to_string();
    let translator = app.translator();
    app.apartment_vm.add_resident(&syndic, &translator);
    pump_until(&mut app, |a| a.apartment_vm.residents().iter().any(|r| r.name == "Karim")).await;

    sign_out(&mut app).await;
    register(&mut app, "Karim", "karim@example.com").await;

    app.navigate(Route::JoinApartment);
    app.onboarding_vm.set_join_code(&code.to_lowercase());
    let user = app.current_user().cloned().unwrap();
    app.onboarding_vm.lookup_join_code(&user, &translator);
    pump_until(&mut app, |a| matches!(a.current_route(), Route::SelectResident { .. })).await;

    let joined = app.onboarding_vm.joined.clone().unwrap();
    assert_eq!(joined.residents.len(), 1);
    assert!(joined.residents.iter().all(|r| !r.is_syndic));

    app.onboarding_vm.claim(&user, &joined.residents[0].id);
    pump_until(&mut app, |a| matches!(a.gate().state(), GateState::OnboardingComplete { .. })).await;

    assert_eq!(app.gate().tabs().len(), 5);
    assert_eq!(app.actor().unwrap().role, Some(Role::Resident));
    app.navigate(Route::Home(HomeTab::Residents));
    assert_eq!(app.gate().stack(), &[Route::Home(HomeTab::Dashboard)]);
    app.navigate(Route::AddExpense);
    assert_eq!(app.gate().stack(), &[Route::Home(HomeTab::Dashboard)]);
}

#[tokio::test]
async fn results_from_a_previous_session_are_dropped() {
    let dir = TempDir::new().unwrap();
    let store = Arc::new(SlowExpenses::default());
    let mut app = app_with_store(&dir, store.clone()).await;

    create_sunset_villas(&mut app).await;
    app.refresh_status();
    pump_until(&mut app, |a| a.actor().is_some() && !a.expense_vm.is_loading).await;

    let actor = app.actor().unwrap();
    let translator = app.translator();
    app.expense_vm.expense_type = ExpenseType::Water;
    app.expense_vm.amount = "40".to_string();
    app.expense_vm.submit(&actor, &translator);
    pump_until(&mut app, |a| a.expense_vm.expenses.len() == 1).await;

    // Reload in flight while the user signs out.
    store.hold.store(true, Ordering::SeqCst);
    app.expense_vm.refresh(&actor);
    sign_out(&mut app).await;
    assert!(app.expense_vm.expenses.is_empty());

    tokio::time::sleep(Duration::from_millis(400)).await;
    app.process_events();
    assert!(app.expense_vm.expenses.is_empty());
    assert_eq!(app.expense_vm.summary.total, 0.0);
    assert_eq!(app.gate().state(), &GateState::Unauthenticated);
}

#[tokio::test]
async fn join_lookup_during_language_switch_lands_after_save() {
    let dir = TempDir::new().unwrap();
    let mut app = app(&dir).await;
    let code = create_sunset_villas(&mut app).await;
    sign_out(&mut app).await;
    register(&mut app, "Karim", "karim@example.com").await;

    app.navigate(Route::JoinApartment);
    app.onboarding_vm.set_join_code(&code);
    let user = app.current_user().cloned().unwrap();
    let translator = app.translator();
    app.onboarding_vm.lookup_join_code(&user, &translator);
    assert!(app.change_language(Language::Fr));

    pump_until(&mut app, |a| a.onboarding_vm.joined.is_some() && !a.is_changing_language()).await;
    assert!(matches!(app.current_route(), Route::SelectResident { .. }));
    assert_eq!(app.render_config().language, Language::Fr);
}

#[tokio::test]
async fn language_switch_freezes_navigation_until_saved() {
    let dir = TempDir::new().unwrap();
    let mut app = app(&dir).await;
    assert_eq!(app.render_config().version, 0);

    assert!(app.change_language(Language::Ar));
    assert!(app.is_changing_language());
    app.navigate(Route::Register);
    assert_eq!(app.current_route(), &Route::Login);

    pump_until(&mut app, |a| !a.is_changing_language()).await;
    let config = app.render_config();
    assert_eq!(config.language, Language::Ar);
    assert_eq!(config.direction, Direction::Rtl);
    assert_eq!(config.version, 1);
    assert!(app.is_rtl());

    // Reloading picks up the saved language.
    let reloaded = self::app(&dir).await;
    assert_eq!(reloaded.render_config().language, Language::Ar);
}
