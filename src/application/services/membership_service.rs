//! Group-membership propagation from a source entity to its duplicate.

use std::sync::Arc;

use serde_json::json;
use tracing::debug;

use crate::domain::entities::{Entity, GroupRef, membership_plugin_id};
use crate::domain::repositories::GroupRepository;
use crate::error::DuplicateError;

/// Captures the groups of a source entity and reattaches a duplicate to them.
///
/// Without a grouping capability both operations are no-ops.
pub struct MembershipService<G: GroupRepository> {
    group_repository: Arc<G>,
}

impl<G: GroupRepository> MembershipService<G> {
    pub fn new(group_repository: Arc<G>) -> Self {
        Self { group_repository }
    }

    /// Lists the groups `source` belongs to.
    ///
    /// Returns an empty list when grouping is unavailable or the source has
    /// never been stored.
    ///
    /// # Errors
    ///
    /// Returns [`DuplicateError::Persistence`] when the grouping backend fails.
    pub async fn capture_memberships(&self, source: &Entity) -> Result<Vec<GroupRef>, DuplicateError> {
        if !self.group_repository.is_available() {
            return Ok(Vec::new());
        }
        let Some(reference) = source.reference() else {
            return Ok(Vec::new());
        };

        let groups = self.group_repository.memberships_of(&reference).await?;
        debug!(
            entity_type = %reference.entity_type,
            id = reference.id,
            groups = groups.len(),
            "Captured group memberships"
        );
        Ok(groups)
    }

    /// Adds a persisted entity to every group in `groups`.
    ///
    /// Returns the number of groups the entity was added to.
    ///
    /// # Errors
    ///
    /// Returns [`DuplicateError::Validation`] if the entity has no id yet.
    /// Returns [`DuplicateError::NotFound`] if one of the groups no longer exists.
    pub async fn apply_memberships(
        &self,
        entity: &Entity,
        groups: &[GroupRef],
    ) -> Result<usize, DuplicateError> {
        if !self.group_repository.is_available() || groups.is_empty() {
            return Ok(0);
        }

        let reference = entity.reference().ok_or_else(|| {
            DuplicateError::validation(
                "Memberships can only be applied to a stored entity",
                json!({ "entity_type": entity.entity_type, "bundle": entity.bundle }),
            )
        })?;
        let plugin_id = membership_plugin_id(&entity.bundle);

        for group in groups {
            self.group_repository
                .add_membership(group, &reference, &plugin_id)
                .await?;
        }

        debug!(
            entity_type = %reference.entity_type,
            id = reference.id,
            groups = groups.len(),
            plugin_id = %plugin_id,
            "Applied group memberships"
        );
        Ok(groups.len())
    }
}
