//! Repository trait for content entity storage.

use crate::domain::entities::Entity;
use crate::error::DuplicateError;
use async_trait::async_trait;

/// Storage collaborator for content entities.
///
/// The duplication core never persists anything itself. Callers load the
/// source through this trait and hand the finished tree back to it.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::MemoryEntityRepository`] - In-memory store with JSON dump
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EntityRepository: Send + Sync {
    /// Finds a stored entity by type and id, with nested entities loaded.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(Entity))` if found
    /// - `Ok(None)` if not found
    ///
    /// # Errors
    ///
    /// Returns [`DuplicateError::Persistence`] when the backend fails.
    async fn find_by_id(&self, entity_type: &str, id: u64) -> Result<Option<Entity>, DuplicateError>;

    /// Persists a new entity together with every nested entity it holds.
    ///
    /// Either the whole tree is stored and returned with assigned ids, or
    /// nothing is stored. Nested copies sharing a uuid are one entity and
    /// receive the same id.
    ///
    /// # Errors
    ///
    /// Returns [`DuplicateError::Validation`] if the root is not new.
    /// Returns [`DuplicateError::Persistence`] when the backend fails.
    async fn save_tree(&self, entity: Entity) -> Result<Entity, DuplicateError>;
}
