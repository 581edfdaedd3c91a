//! Preferences persistence

pub mod file_preferences_store;

pub use file_preferences_store::FilePreferencesStore;
