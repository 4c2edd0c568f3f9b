//! Entry point for duplicating stored content.

use std::sync::Arc;

use serde::Serialize;
use serde_json::json;
use tracing::{info, warn};

use super::membership_service::MembershipService;
use crate::domain::collaborators::{EntityFactory, FieldMetadataProvider};
use crate::domain::duplication::{
    AlterHooks, DuplicateOptions, DuplicationContext, DuplicationEngine, EngineSettings,
    ExclusionPolicy, options::DEFAULT_OPERATION_TAG,
};
use crate::domain::entities::{Entity, GroupRef};
use crate::domain::repositories::{EntityRepository, GroupRepository, SettingsRepository};
use crate::error::DuplicateError;

/// An unsaved duplicate together with what is needed to commit it.
#[derive(Debug, Clone, Serialize)]
pub struct PreparedDuplicate {
    /// The cloned tree, without ids.
    pub entity: Entity,
    /// Groups of the source, captured before cloning.
    pub memberships: Vec<GroupRef>,
    pub source: Entity,
}

/// Service for duplicating a stored entity with its nested entities.
///
/// Duplication runs in two steps. [`Self::prepare`] loads the source, takes
/// a settings snapshot and builds the clone in memory. [`Self::commit`] saves
/// the tree and only then reattaches group memberships. Dropping a prepared
/// duplicate leaves no trace.
pub struct DuplicationService<E, G, S>
where
    E: EntityRepository,
    G: GroupRepository,
    S: SettingsRepository,
{
    entity_repository: Arc<E>,
    settings_repository: Arc<S>,
    memberships: MembershipService<G>,
    metadata: Arc<dyn FieldMetadataProvider>,
    factory: Arc<dyn EntityFactory>,
    hooks: AlterHooks,
    engine_settings: EngineSettings,
    operation_tag: String,
}

impl<E, G, S> DuplicationService<E, G, S>
where
    E: EntityRepository,
    G: GroupRepository,
    S: SettingsRepository,
{
    /// Creates a new duplication service with no alteration hooks.
    pub fn new(
        entity_repository: Arc<E>,
        group_repository: Arc<G>,
        settings_repository: Arc<S>,
        metadata: Arc<dyn FieldMetadataProvider>,
        factory: Arc<dyn EntityFactory>,
    ) -> Self {
        Self {
            entity_repository,
            settings_repository,
            memberships: MembershipService::new(group_repository),
            metadata,
            factory,
            hooks: AlterHooks::new(),
            engine_settings: EngineSettings::default(),
            operation_tag: DEFAULT_OPERATION_TAG.to_string(),
        }
    }

    pub fn with_hooks(mut self, hooks: AlterHooks) -> Self {
        self.hooks = hooks;
        self
    }

    pub fn with_engine_settings(mut self, engine_settings: EngineSettings) -> Self {
        self.engine_settings = engine_settings;
        self
    }

    pub fn with_operation_tag(mut self, operation_tag: impl Into<String>) -> Self {
        self.operation_tag = operation_tag.into();
        self
    }

    /// Builds the duplicate of a stored entity without saving it.
    ///
    /// # Errors
    ///
    /// Returns [`DuplicateError::NotFound`] if no entity matches. Nothing is
    /// cloned in that case.
    /// Returns [`DuplicateError::Configuration`] if the nested entities form
    /// a cycle or nest too deeply.
    pub async fn prepare(
        &self,
        entity_type: &str,
        id: u64,
        actor: u64,
    ) -> Result<PreparedDuplicate, DuplicateError> {
        let source = self.load_source(entity_type, id).await?;
        let memberships = self.memberships.capture_memberships(&source).await?;
        let entity = self.duplicate_loaded(&source, actor).await?;

        Ok(PreparedDuplicate {
            entity,
            memberships,
            source,
        })
    }

    /// Clones an already loaded entity using the stored settings.
    ///
    /// # Errors
    ///
    /// See [`DuplicationEngine::duplicate`].
    pub async fn duplicate_loaded(&self, source: &Entity, actor: u64) -> Result<Entity, DuplicateError> {
        let snapshot = self.settings_repository.load().await?.snapshot();
        let policy = ExclusionPolicy::from_config(&snapshot);
        let options = DuplicateOptions::from_config(&snapshot, self.operation_tag.as_str());

        let engine = DuplicationEngine::new(
            self.metadata.as_ref(),
            self.factory.as_ref(),
            &policy,
            &self.hooks,
            &self.engine_settings,
        );
        engine.duplicate(source, &DuplicationContext::new(actor), &options)
    }

    /// Saves a prepared duplicate and reattaches its group memberships.
    ///
    /// # Errors
    ///
    /// Returns the repository error if the tree cannot be saved. Memberships
    /// are not touched in that case.
    ///
    /// Returns [`DuplicateError::MembershipsIncomplete`] if the tree was saved
    /// but a membership could not be attached. The saved duplicate stays in
    /// the store and its `entity_type` and `id` are in the error details.
    pub async fn commit(&self, prepared: PreparedDuplicate) -> Result<Entity, DuplicateError> {
        let PreparedDuplicate {
            entity,
            memberships,
            source,
        } = prepared;

        let saved = match self.entity_repository.save_tree(entity).await {
            Ok(saved) => saved,
            Err(e) => {
                warn!(
                    entity_type = %source.entity_type,
                    source_id = ?source.id,
                    error = %e,
                    "The duplicate could not be saved"
                );
                return Err(e);
            }
        };

        let groups = match self.memberships.apply_memberships(&saved, &memberships).await {
            Ok(groups) => groups,
            Err(e) => {
                warn!(
                    entity_type = %saved.entity_type,
                    id = ?saved.id,
                    error = %e,
                    "The duplicate was saved without all of its group memberships"
                );
                return Err(DuplicateError::memberships_incomplete(
                    "Duplicate saved without all of its group memberships",
                    json!({
                        "entity_type": saved.entity_type,
                        "bundle": saved.bundle,
                        "id": saved.id,
                        "cause": e.code(),
                        "reason": e.to_string(),
                    }),
                ));
            }
        };

        let title = self.title_of(&saved).unwrap_or_default();
        info!(
            entity_type = %saved.entity_type,
            id = ?saved.id,
            source_id = ?source.id,
            groups,
            operation = %self.operation_tag,
            "{}: added {} (duplicate)",
            saved.bundle,
            title
        );

        Ok(saved)
    }

    /// Duplicates a stored entity and saves the result.
    ///
    /// # Errors
    ///
    /// See [`Self::prepare`] and [`Self::commit`].
    pub async fn duplicate_entity(
        &self,
        entity_type: &str,
        id: u64,
        actor: u64,
    ) -> Result<Entity, DuplicateError> {
        let prepared = self.prepare(entity_type, id, actor).await?;
        self.commit(prepared).await
    }

    /// Title shown while editing a duplicate: the configured prefix, a space
    /// and the source title.
    pub async fn duplicate_page_title(&self, source: &Entity) -> Result<String, DuplicateError> {
        let settings = self.settings_repository.load().await?;
        let title = self.title_of(source).unwrap_or_default();

        Ok(match settings.title_prefix() {
            Some(prefix) => format!("{prefix} {title}"),
            None => title.to_string(),
        })
    }

    async fn load_source(&self, entity_type: &str, id: u64) -> Result<Entity, DuplicateError> {
        self.entity_repository
            .find_by_id(entity_type, id)
            .await?
            .ok_or_else(|| {
                DuplicateError::not_found(
                    "Entity not found",
                    json!({ "entity_type": entity_type, "id": id }),
                )
            })
    }

    fn title_of<'e>(&self, entity: &'e Entity) -> Option<&'e str> {
        let keys = self.metadata.entity_keys(&entity.entity_type);
        entity.string_in(&entity.default_langcode, keys.label.as_deref()?)
    }
}
