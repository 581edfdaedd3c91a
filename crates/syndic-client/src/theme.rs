//! Theme Handler
//!
//! Resolves the stored light/dark/system preference to a concrete theme.

use syndic_core::domain::ThemePreference;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    /// `system_dark` is what the platform currently reports.
    pub fn resolve(preference: ThemePreference, system_dark: bool) -> Self {
        match preference {
            ThemePreference::Light => Theme::Light,
            ThemePreference::Dark => Theme::Dark,
            ThemePreference::System if system_dark => Theme::Dark,
            ThemePreference::System => Theme::Light,
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }

    /// Pinned preference for the theme the user switched to.
    pub fn as_preference(self) -> ThemePreference {
        match self {
            Theme::Light => ThemePreference::Light,
            Theme::Dark => ThemePreference::Dark,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_follows_platform() {
        assert_eq!(Theme::resolve(ThemePreference::System, true), Theme::Dark);
        assert_eq!(Theme::resolve(ThemePreference::System, false), Theme::Light);
        assert_eq!(Theme::resolve(ThemePreference::Light, true), Theme::Light);
        assert_eq!(Theme::Light.toggled().as_preference(), ThemePreference::Dark);
    }
}
