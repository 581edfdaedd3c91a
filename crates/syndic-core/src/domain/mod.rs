//! # Syndic Core - Domain Module
//! 
//! Domain entities for the building management client.

pub mod user;
pub mod apartment;
pub mod resident;
pub mod expense;
pub mod issue;
pub mod meeting;
pub mod preferences;
pub mod schedule;

// Re-export all entities and enums
pub use user::{Actor, OnboardingStatus, ProfileUpdate, Role, UserProfile};
pub use apartment::{Apartment, ApartmentData, ApartmentUpdate, JoinCode, NewApartment};
pub use resident::{NewResident, Resident, ResidentUpdate};
pub use expense::{Expense, ExpenseSummary, ExpenseType, ExpenseUpdate, NewExpense};
pub use issue::{Issue, IssueStatus, IssueType, NewIssue};
pub use meeting::{Meeting, MeetingType, MeetingUpdate, NewMeeting};
pub use preferences::{Language, Preferences, ThemePreference};
