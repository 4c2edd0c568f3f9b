//! Shared application state for the command-line surface.

use std::sync::Arc;

use tracing::info;

use crate::application::services::{DuplicationService, SettingsService};
use crate::config::Config;
use crate::error::DuplicateError;
use crate::infrastructure::grouping::MemoryGroupRepository;
use crate::infrastructure::persistence::{ContentFile, FileSettingsRepository, MemoryEntityRepository};
use crate::infrastructure::schema::SchemaRegistry;

pub type AppDuplicationService =
    DuplicationService<MemoryEntityRepository, MemoryGroupRepository, FileSettingsRepository>;

/// Repositories and services wired from a [`Config`].
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub entities: Arc<MemoryEntityRepository>,
    pub groups: Arc<MemoryGroupRepository>,
    pub schema: Arc<SchemaRegistry>,
    pub duplication_service: Arc<AppDuplicationService>,
    pub settings_service: Arc<SettingsService<FileSettingsRepository>>,
}

impl AppState {
    /// Loads the content store and schema and wires the services.
    ///
    /// # Errors
    ///
    /// Returns [`DuplicateError::Configuration`] if the content or schema
    /// file cannot be parsed, or the schema file is missing.
    pub async fn load(config: Config) -> Result<Self, DuplicateError> {
        let content = ContentFile::load(&config.content_path).await?;
        let schema = Arc::new(SchemaRegistry::load(&config.schema_path).await?);
        info!(
            entities = content.entities.len(),
            groups = content.groups.len(),
            entity_types = schema.entity_types.len(),
            "Content store loaded"
        );

        let entities = Arc::new(MemoryEntityRepository::with_entities(content.entities));
        let groups = Arc::new(MemoryGroupRepository::with_state(
            content.groups,
            content.memberships,
        ));
        let settings = Arc::new(FileSettingsRepository::new(config.settings_path.clone()));

        let duplication_service = DuplicationService::new(
            entities.clone(),
            groups.clone(),
            settings.clone(),
            schema.clone(),
            schema.clone(),
        )
        .with_engine_settings(config.engine_settings())
        .with_operation_tag(config.operation_tag.clone());

        let settings_service = SettingsService::new(settings, schema.clone());

        Ok(Self {
            config: Arc::new(config),
            entities,
            groups,
            schema,
            duplication_service: Arc::new(duplication_service),
            settings_service: Arc::new(settings_service),
        })
    }

    /// Current contents of the stores as a content file document.
    pub async fn content(&self) -> ContentFile {
        ContentFile {
            entities: self.entities.roots().await,
            groups: self.groups.groups().await,
            memberships: self.groups.memberships().await,
        }
    }

    /// Writes the stores back to the content file.
    ///
    /// # Errors
    ///
    /// Returns [`DuplicateError::Persistence`] if the file cannot be written.
    pub async fn persist(&self) -> Result<(), DuplicateError> {
        self.content().await.save(&self.config.content_path).await?;
        info!(path = %self.config.content_path.display(), "Content store saved");
        Ok(())
    }
}
