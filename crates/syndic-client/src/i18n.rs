//! Internationalization and layout direction

use std::sync::Arc;
use tracing::{error, info, warn};

use syndic_core::domain::{Language, Preferences, ThemePreference};
use syndic_core::error::DomainError;
use syndic_core::repositories::PreferencesStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Ltr,
    Rtl,
}

impl Direction {
    pub fn for_language(language: Language) -> Self {
        if language.is_rtl() {
            Direction::Rtl
        } else {
            Direction::Ltr
        }
    }
}

/// Immutable snapshot handed down to every screen. A new `version`
/// means the tree must be rebuilt with the new direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderConfig {
    pub language: Language,
    pub direction: Direction,
    pub version: u64,
}

/// Lookup into the built-in string tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Translator {
    language: Language,
}

impl Translator {
    pub fn new(language: Language) -> Self {
        Self { language }
    }

    pub fn language(&self) -> Language {
        self.language
    }

    /// Unknown keys come back unchanged.
    pub fn t<'a>(&self, key: &'a str) -> &'a str {
        lookup(self.language, key)
            .or_else(|| lookup(Language::En, key))
            .unwrap_or(key)
    }

    /// Display name of an entity such as "Meeting"; unknown names come back unchanged.
    pub fn entity<'a>(&self, name: &'a str) -> &'a str {
        let key = format!("entities.{}", name.to_lowercase());
        lookup(self.language, &key)
            .or_else(|| lookup(Language::En, &key))
            .unwrap_or(name)
    }
}

fn lookup(language: Language, key: &str) -> Option<&'static str> {
    let text = match (language, key) {
        (Language::En, "errors.not_authenticated") => "Please sign in to continue",
        (Language::En, "errors.invalid_credentials") => "Incorrect email or password",
        (Language::En, "errors.email_in_use") => "This email is already in use",
        (Language::En, "errors.not_found") => "{entity} not found",
        (Language::En, "errors.forbidden") => "You are not allowed to do this",
        (Language::En, "errors.generic") => "Something went wrong. Please try again",
        (Language::En, "errors.upload_failed") => "Image upload failed",
        (Language::En, "entities.apartment") => "Apartment",
        (Language::En, "entities.resident") => "Resident",
        (Language::En, "entities.expense") => "Expense",
        (Language::En, "entities.meeting") => "Meeting",
        (Language::En, "entities.issue") => "Issue",
        (Language::En, "entities.profile") => "Profile",

        (Language::Fr, "errors.not_authenticated") => "Veuillez vous connecter pour continuer",
        (Language::Fr, "errors.invalid_credentials") => "E-mail ou mot de passe incorrect",
        (Language::Fr, "errors.email_in_use") => "Cet e-mail est déjà utilisé",
        (Language::Fr, "errors.not_found") => "{entity} introuvable",
        (Language::Fr, "errors.forbidden") => "Vous n'êtes pas autorisé à effectuer cette action",
        (Language::Fr, "errors.generic") => "Une erreur est survenue. Veuillez réessayer",
        (Language::Fr, "errors.upload_failed") => "Échec de l'envoi de l'image",
        (Language::Fr, "entities.apartment") => "Immeuble",
        (Language::Fr, "entities.resident") => "Résident",
        (Language::Fr, "entities.expense") => "Dépense",
        (Language::Fr, "entities.meeting") => "Réunion",
        (Language::Fr, "entities.issue") => "Signalement",
        (Language::Fr, "entities.profile") => "Profil",

        (Language::Ar, "errors.not_authenticated") => "يرجى تسجيل الدخول للمتابعة",
        (Language::Ar, "errors.invalid_credentials") => "البريد الإلكتروني أو كلمة المرور غير صحيحة",
        (Language::Ar, "errors.email_in_use") => "هذا البريد الإلكتروني مستخدم بالفعل",
        (Language::Ar, "errors.not_found") => "{entity} غير موجود",
        (Language::Ar, "errors.forbidden") => "غير مسموح لك بالقيام بذلك",
        (Language::Ar, "errors.generic") => "حدث خطأ ما. يرجى المحاولة مرة أخرى",
        (Language::Ar, "errors.upload_failed") => "فشل رفع الصورة",
        (Language::Ar, "entities.apartment") => "العمارة",
        (Language::Ar, "entities.resident") => "الساكن",
        (Language::Ar, "entities.expense") => "المصروف",
        (Language::Ar, "entities.meeting") => "الاجتماع",
        (Language::Ar, "entities.issue") => "البلاغ",
        (Language::Ar, "entities.profile") => "الملف الشخصي",
        _ => return None,
    };
    Some(text)
}

/// User-facing text for a gateway error.
pub trait UserMessage {
    fn user_message(&self, translator: &Translator) -> String;
}

impl UserMessage for DomainError {
    fn user_message(&self, translator: &Translator) -> String {
        match self {
            // Validation text is already written for the user.
            DomainError::ValidationError(message) => message.clone(),
            DomainError::NotFound(entity) => translator
                .t(self.message_key())
                .replace("{entity}", translator.entity(entity)),
            _ => translator.t(self.message_key()).to_string(),
        }
    }
}

pub struct I18nController {
    store: Arc<dyn PreferencesStore>,
    preferences: Preferences,
    config: RenderConfig,
    changing: bool,
}

impl I18nController {
    /// Restore saved preferences, falling back to `default_language`.
    pub async fn load(store: Arc<dyn PreferencesStore>, default_language: Language) -> Self {
        let preferences = match store.load().await {
            Ok(preferences) => preferences,
            Err(e) => {
                warn!("Could not load preferences, using defaults: {}", e);
                Preferences::default()
            }
        };
        let language = preferences.language.unwrap_or(default_language);

        Self {
            store,
            preferences,
            config: RenderConfig {
                language,
                direction: Direction::for_language(language),
                version: 0,
            },
            changing: false,
        }
    }

    pub fn current_language(&self) -> Language {
        self.config.language
    }

    pub fn is_rtl(&self) -> bool {
        self.config.direction == Direction::Rtl
    }

    pub fn is_changing_language(&self) -> bool {
        self.changing
    }

    pub fn render_config(&self) -> RenderConfig {
        self.config
    }

    pub fn translator(&self) -> Translator {
        Translator::new(self.config.language)
    }

    pub fn theme(&self) -> ThemePreference {
        self.preferences.theme
    }

    pub fn store(&self) -> Arc<dyn PreferencesStore> {
        Arc::clone(&self.store)
    }

    /// Mark a switch as started. Returns the preferences to persist, or
    /// `None` if nothing needs to change.
    pub fn begin_change(&mut self, language: Language) -> Option<Preferences> {
        if self.changing {
            warn!("Language change already in progress");
            return None;
        }
        if language == self.config.language && self.preferences.language == Some(language) {
            return None;
        }
        self.changing = true;
        Some(Preferences {
            language: Some(language),
            ..self.preferences
        })
    }

    /// Apply the new language once persistence settled. A failed save still
    /// switches the running session.
    pub fn finish_change(&mut self, language: Language, saved: Result<(), DomainError>) -> RenderConfig {
        if let Err(e) = saved {
            error!("Language preference not saved: {}", e);
        }
        self.preferences.language = Some(language);
        self.config = RenderConfig {
            language,
            direction: Direction::for_language(language),
            version: self.config.version + 1,
        };
        self.changing = false;
        info!(
            "Language is now {} ({:?}, version {})",
            language.code(),
            self.config.direction,
            self.config.version
        );
        self.config
    }

    /// Persist and apply in one call, for callers without an event loop.
    pub async fn change_language(&mut self, language: Language) -> RenderConfig {
        match self.begin_change(language) {
            Some(preferences) => {
                let saved = self.store.save(&preferences).await;
                self.finish_change(language, saved)
            }
            None => self.config,
        }
    }

    pub async fn set_theme(&mut self, theme: ThemePreference) -> Result<(), DomainError> {
        let next = Preferences {
            theme,
            ..self.preferences
        };
        self.store.save(&next).await?;
        self.preferences = next;
        info!("Theme preference set to {:?}", theme);
        Ok(())
    }
}
