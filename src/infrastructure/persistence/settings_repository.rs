//! File and in-memory implementations of the settings repository.

use async_trait::async_trait;
use serde_json::json;
use std::path::{Path, PathBuf};
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::domain::entities::DuplicateSettings;
use crate::domain::repositories::SettingsRepository;
use crate::error::DuplicateError;

/// Settings stored as a pretty-printed JSON document on disk.
///
/// A missing file is treated as default settings.
#[derive(Debug, Clone)]
pub struct FileSettingsRepository {
    path: PathBuf,
}

impl FileSettingsRepository {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl SettingsRepository for FileSettingsRepository {
    async fn load(&self) -> Result<DuplicateSettings, DuplicateError> {
        let raw = match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "Settings file not found, using defaults");
                return Ok(DuplicateSettings::default());
            }
            Err(e) => return Err(e.into()),
        };

        serde_json::from_str(&raw).map_err(|e| {
            DuplicateError::configuration(
                "Settings file is not valid",
                json!({ "path": self.path.display().to_string(), "reason": e.to_string() }),
            )
        })
    }

    async fn save(&self, settings: &DuplicateSettings) -> Result<(), DuplicateError> {
        let raw = serde_json::to_string_pretty(settings)?;
        tokio::fs::write(&self.path, raw).await?;
        info!(path = %self.path.display(), "Settings saved");
        Ok(())
    }
}

/// Settings held in memory, used by tests and embedders.
#[derive(Debug, Default)]
pub struct MemorySettingsRepository {
    settings: RwLock<DuplicateSettings>,
}

impl MemorySettingsRepository {
    pub fn new(settings: DuplicateSettings) -> Self {
        Self {
            settings: RwLock::new(settings),
        }
    }
}

#[async_trait]
impl SettingsRepository for MemorySettingsRepository {
    async fn load(&self) -> Result<DuplicateSettings, DuplicateError> {
        Ok(self.settings.read().await.clone())
    }

    async fn save(&self, settings: &DuplicateSettings) -> Result<(), DuplicateError> {
        *self.settings.write().await = settings.clone();
        Ok(())
    }
}
