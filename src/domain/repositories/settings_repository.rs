//! Repository trait for persisted duplication settings.

use crate::domain::entities::DuplicateSettings;
use crate::error::DuplicateError;
use async_trait::async_trait;

/// Storage for [`DuplicateSettings`].
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::FileSettingsRepository`] - JSON file
/// - [`crate::infrastructure::persistence::MemorySettingsRepository`] - In-memory
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SettingsRepository: Send + Sync {
    /// Loads the current settings. Missing settings yield the defaults.
    ///
    /// # Errors
    ///
    /// Returns [`DuplicateError::Configuration`] if stored settings cannot be parsed.
    async fn load(&self) -> Result<DuplicateSettings, DuplicateError>;

    /// Replaces the stored settings.
    ///
    /// # Errors
    ///
    /// Returns [`DuplicateError::Persistence`] when the backend fails.
    async fn save(&self, settings: &DuplicateSettings) -> Result<(), DuplicateError>;
}
