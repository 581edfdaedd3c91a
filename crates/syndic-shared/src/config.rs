//! Configuration management

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

use crate::constants::{DEFAULT_MAX_WRITE_ATTEMPTS, DEFAULT_UPLOAD_TIMEOUT_SECONDS};

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub app: AppSettings,
    pub log: LogSettings,
    pub store: StoreSettings,
    pub image_host: ImageHostSettings,
    pub preferences: PreferencesSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppSettings {
    pub env: String,
    pub name: String,
    pub default_language: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LogSettings {
    pub level: String,
    pub json: bool,
    /// Daily rolling log files are written here when set.
    pub directory: Option<String>,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum StoreBackend {
    Memory,
    Postgres,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StoreSettings {
    pub backend: StoreBackend,
    pub url: Option<String>,
    pub max_connections: u32,
    pub max_write_attempts: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ImageHostSettings {
    pub upload_url: String,
    pub upload_preset: String,
    pub timeout_seconds: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct PreferencesSettings {
    pub path: String,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        let env = std::env::var("APP_ENV").unwrap_or_else(|_| "development".into());
        let config = Self::builder()?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", env)).required(false))
            .add_source(
                Environment::with_prefix("SYNDIC")
                    .separator("__")
                    .try_parsing(true),
            )
            .set_override("app.env", env)?
            .build()?;
        config.try_deserialize()
    }

    /// Defaults only, without files or environment.
    pub fn defaults() -> Result<Self, ConfigError> {
        Self::builder()?.build()?.try_deserialize()
    }

    fn builder() -> Result<config::ConfigBuilder<config::builder::DefaultState>, ConfigError> {
        Config::builder()
            .set_default("app.env", "development")?
            .set_default("app.name", "syndic")?
            .set_default("app.default_language", "en")?
            .set_default("log.level", "info")?
            .set_default("log.json", false)?
            .set_default("store.backend", "memory")?
            .set_default("store.max_connections", 5)?
            .set_default("store.max_write_attempts", DEFAULT_MAX_WRITE_ATTEMPTS)?
            .set_default("image_host.upload_url", "https://api.cloudinary.com/v1_1/demo/image/upload")?
            .set_default("image_host.upload_preset", "syndic_unsigned")?
            .set_default("image_host.timeout_seconds", DEFAULT_UPLOAD_TIMEOUT_SECONDS)?
            .set_default("preferences.path", "syndic_preferences.toml")
    }
}
