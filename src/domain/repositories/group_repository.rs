//! Repository trait for group memberships.

use crate::domain::entities::{EntityRef, GroupRef};
use crate::error::DuplicateError;
use async_trait::async_trait;

/// Grouping capability: which collections a content entity belongs to.
///
/// # Implementations
///
/// - [`crate::infrastructure::grouping::MemoryGroupRepository`] - In-memory memberships
/// - [`crate::infrastructure::grouping::NullGroupRepository`] - No grouping capability
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GroupRepository: Send + Sync {
    /// Returns `false` when the environment has no grouping capability.
    fn is_available(&self) -> bool;

    /// Groups the entity currently belongs to.
    ///
    /// # Errors
    ///
    /// Returns [`DuplicateError::Persistence`] when the backend fails.
    async fn memberships_of(&self, entity: &EntityRef) -> Result<Vec<GroupRef>, DuplicateError>;

    /// Adds the entity to a group using the given relation plugin.
    ///
    /// # Errors
    ///
    /// Returns [`DuplicateError::NotFound`] if the group does not exist.
    /// Returns [`DuplicateError::Persistence`] when the backend fails.
    async fn add_membership(
        &self,
        group: &GroupRef,
        entity: &EntityRef,
        plugin_id: &str,
    ) -> Result<(), DuplicateError>;
}
