//! Application Events
//!
//! Results of background tasks, drained by the root `App` on the UI loop.

use syndic_core::domain::{
    Apartment, ApartmentData, Expense, ExpenseSummary, Issue, Language, Meeting, OnboardingStatus, Resident,
    UserProfile,
};
use syndic_core::error::DomainError;
use syndic_core::repositories::AuthUser;

pub type Outcome<T> = Result<T, DomainError>;

#[derive(Debug, Clone)]
pub enum AppEvent {
    /// Auth provider session changed
    SessionChanged(Option<AuthUser>),
    /// Onboarding status lookup finished
    StatusResolved {
        generation: u64,
        user_id: String,
        status: OnboardingStatus,
    },
    /// Language preference persisted (or failed to)
    LanguageSaved { language: Language, result: Outcome<()> },
    /// A building-scoped result tagged with the session epoch it started under
    Scoped { epoch: u64, event: Box<AppEvent> },

    SignedIn(Outcome<AuthUser>),
    SignedUp(Outcome<AuthUser>),
    SignedOut(Outcome<()>),

    ApartmentCreated(Outcome<Apartment>),
    JoinCodeResolved(Outcome<ApartmentData>),
    ResidentClaimed(Outcome<Resident>),

    ApartmentLoaded(Outcome<ApartmentData>),
    ApartmentSaved(Outcome<Apartment>),
    ResidentSaved(Outcome<Resident>),
    FeesCharged(Outcome<Vec<Resident>>),

    ExpensesLoaded(Outcome<(Vec<Expense>, ExpenseSummary)>),
    ExpenseSaved(Outcome<Expense>),
    ExpenseDeleted(Outcome<String>),

    MeetingsLoaded(Outcome<Vec<Meeting>>),
    MeetingSaved(Outcome<Meeting>),
    MeetingDeleted(Outcome<String>),

    IssuesLoaded(Outcome<Vec<Issue>>),
    IssueSaved(Outcome<Issue>),

    ProfileSaved(Outcome<UserProfile>),
}
