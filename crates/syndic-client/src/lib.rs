//! # Syndic Client
//!
//! Client state for the building management app: session and onboarding
//! gating, typed navigation, view-models, language and theme.

pub mod app;
pub mod context;
pub mod events;
pub mod i18n;
pub mod navigation;
pub mod session;
pub mod status;
pub mod theme;
pub mod viewmodel;

pub use app::App;
pub use context::{AppContext, SessionEpoch};
pub use events::{AppEvent, Outcome};
pub use i18n::{Direction, I18nController, RenderConfig, Translator, UserMessage};
pub use navigation::{GateState, HomeTab, NavigationGate, Route};
pub use theme::Theme;
