//! Language and theme kept in a small TOML file

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tracing::{debug, error, warn};

use syndic_core::domain::Preferences;
use syndic_core::error::DomainError;
use syndic_core::repositories::PreferencesStore;

pub struct FilePreferencesStore {
    path: PathBuf,
}

impl FilePreferencesStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn storage_failure(operation: &str, detail: impl std::fmt::Display) -> DomainError {
    error!("Preferences {} failed: {}", operation, detail);
    DomainError::RemoteOperationFailed(format!("{} preferences", operation))
}

#[async_trait]
impl PreferencesStore for FilePreferencesStore {
    /// A missing or unreadable file yields the defaults.
    async fn load(&self) -> Result<Preferences, DomainError> {
        let raw = match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("No preferences file at {}", self.path.display());
                return Ok(Preferences::default());
            }
            Err(e) => return Err(storage_failure("load", e)),
        };

        match toml::from_str(&raw) {
            Ok(preferences) => Ok(preferences),
            Err(e) => {
                warn!("Ignoring malformed preferences file {}: {}", self.path.display(), e);
                Ok(Preferences::default())
            }
        }
    }

    async fn save(&self, preferences: &Preferences) -> Result<(), DomainError> {
        let raw = toml::to_string_pretty(preferences).map_err(|e| storage_failure("encode", e))?;
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| storage_failure("save", e))?;
        }
        tokio::fs::write(&self.path, raw)
            .await
            .map_err(|e| storage_failure("save", e))?;
        debug!("Preferences saved to {}", self.path.display());
        Ok(())
    }
}
