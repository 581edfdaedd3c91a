//! Service wiring shared by the app and its view-models

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use syndic_core::repositories::{AuthProvider, DocumentStore, ImageHost, PreferencesStore};
use syndic_core::services::{
    ApartmentService, AuthService, ExpenseService, IssueService, MeetingService, OnboardingService, ProfileService,
    ResidentService,
};

pub type Store = dyn DocumentStore;

/// Bumped each time the signed-in identity changes. Building-scoped
/// requests carry the value they started under.
#[derive(Clone, Default)]
pub struct SessionEpoch(Arc<AtomicU64>);

impl SessionEpoch {
    pub fn current(&self) -> u64 {
        self.0.load(Ordering::SeqCst)
    }

    pub(crate) fn advance(&self) -> u64 {
        self.0.fetch_add(1, Ordering::SeqCst) + 1
    }
}

/// Built once at startup and cloned into every view-model.
#[derive(Clone)]
pub struct AppContext {
    pub auth: Arc<AuthService<dyn AuthProvider, Store>>,
    pub profiles: Arc<ProfileService<Store>>,
    pub onboarding: Arc<OnboardingService<Store>>,
    pub apartments: Arc<ApartmentService<Store>>,
    pub residents: Arc<ResidentService<Store>>,
    pub expenses: Arc<ExpenseService<Store>>,
    pub meetings: Arc<MeetingService<Store>>,
    pub issues: Arc<IssueService<Store, dyn ImageHost>>,
    pub preferences: Arc<dyn PreferencesStore>,
    pub session_epoch: SessionEpoch,
}

impl AppContext {
    pub fn new(
        store: Arc<Store>,
        auth: Arc<dyn AuthProvider>,
        images: Arc<dyn ImageHost>,
        preferences: Arc<dyn PreferencesStore>,
        max_write_attempts: u32,
    ) -> Self {
        Self {
            auth: Arc::new(AuthService::new(auth, Arc::clone(&store))),
            profiles: Arc::new(ProfileService::new(Arc::clone(&store))),
            onboarding: Arc::new(OnboardingService::with_max_write_attempts(
                Arc::clone(&store),
                max_write_attempts,
            )),
            apartments: Arc::new(ApartmentService::new(Arc::clone(&store))),
            residents: Arc::new(
                ResidentService::new(Arc::clone(&store)).with_max_write_attempts(max_write_attempts),
            ),
            expenses: Arc::new(
                ExpenseService::new(Arc::clone(&store)).with_max_write_attempts(max_write_attempts),
            ),
            meetings: Arc::new(
                MeetingService::new(Arc::clone(&store)).with_max_write_attempts(max_write_attempts),
            ),
            issues: Arc::new(IssueService::new(store, images).with_max_write_attempts(max_write_attempts)),
            preferences,
            session_epoch: SessionEpoch::default(),
        }
    }
}
