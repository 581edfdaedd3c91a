//! Gateway services (business logic over the ports)

mod gateway;
#[cfg(test)]
pub(crate) mod testing;

pub mod auth_service;
pub mod profile_service;
pub mod onboarding_service;
pub mod apartment_service;
pub mod resident_service;
pub mod expense_service;
pub mod issue_service;
pub mod meeting_service;
pub mod upload_service;

pub use auth_service::{AuthService, SignInForm, SignUpForm};
pub use profile_service::ProfileService;
pub use onboarding_service::OnboardingService;
pub use apartment_service::ApartmentService;
pub use resident_service::ResidentService;
pub use expense_service::ExpenseService;
pub use issue_service::IssueService;
pub use meeting_service::MeetingService;
pub use upload_service::ImageUploader;
