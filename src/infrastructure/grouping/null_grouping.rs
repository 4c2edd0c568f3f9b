//! No-op grouping for environments without group support.

use async_trait::async_trait;
use tracing::debug;

use crate::domain::entities::{EntityRef, GroupRef};
use crate::domain::repositories::GroupRepository;
use crate::error::DuplicateError;

/// A grouping implementation that does nothing.
///
/// Memberships are always empty and additions are discarded.
pub struct NullGroupRepository;

impl NullGroupRepository {
    pub fn new() -> Self {
        debug!("Using NullGroupRepository (grouping disabled)");
        Self
    }
}

impl Default for NullGroupRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl GroupRepository for NullGroupRepository {
    fn is_available(&self) -> bool {
        false
    }

    async fn memberships_of(&self, _entity: &EntityRef) -> Result<Vec<GroupRef>, DuplicateError> {
        Ok(Vec::new())
    }

    async fn add_membership(
        &self,
        _group: &GroupRef,
        _entity: &EntityRef,
        _plugin_id: &str,
    ) -> Result<(), DuplicateError> {
        Ok(())
    }
}
