//! In-memory group memberships.

use async_trait::async_trait;
use serde_json::json;
use std::collections::BTreeMap;
use tokio::sync::RwLock;
use tracing::debug;

use crate::domain::entities::{EntityRef, GroupRef, Membership};
use crate::domain::repositories::GroupRepository;
use crate::error::DuplicateError;

#[derive(Debug, Default)]
struct GroupState {
    groups: BTreeMap<u64, GroupRef>,
    memberships: Vec<Membership>,
}

/// Groups and memberships kept in process memory.
#[derive(Debug, Default)]
pub struct MemoryGroupRepository {
    state: RwLock<GroupState>,
}

impl MemoryGroupRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a repository from existing groups and memberships.
    pub fn with_state(
        groups: impl IntoIterator<Item = GroupRef>,
        memberships: impl IntoIterator<Item = Membership>,
    ) -> Self {
        let state = GroupState {
            groups: groups.into_iter().map(|g| (g.id, g)).collect(),
            memberships: memberships.into_iter().collect(),
        };
        Self {
            state: RwLock::new(state),
        }
    }

    pub async fn groups(&self) -> Vec<GroupRef> {
        self.state.read().await.groups.values().cloned().collect()
    }

    pub async fn memberships(&self) -> Vec<Membership> {
        self.state.read().await.memberships.clone()
    }
}

#[async_trait]
impl GroupRepository for MemoryGroupRepository {
    fn is_available(&self) -> bool {
        true
    }

    async fn memberships_of(&self, entity: &EntityRef) -> Result<Vec<GroupRef>, DuplicateError> {
        let state = self.state.read().await;
        Ok(state
            .memberships
            .iter()
            .filter(|m| &m.entity == entity)
            .filter_map(|m| state.groups.get(&m.group_id).cloned())
            .collect())
    }

    async fn add_membership(
        &self,
        group: &GroupRef,
        entity: &EntityRef,
        plugin_id: &str,
    ) -> Result<(), DuplicateError> {
        let mut state = self.state.write().await;
        if !state.groups.contains_key(&group.id) {
            return Err(DuplicateError::not_found(
                "Group not found",
                json!({ "group_id": group.id }),
            ));
        }

        let membership = Membership {
            group_id: group.id,
            entity: entity.clone(),
            plugin_id: plugin_id.to_string(),
        };
        if state.memberships.contains(&membership) {
            debug!(group_id = group.id, entity_id = entity.id, "Membership already present");
            return Ok(());
        }
        state.memberships.push(membership);
        Ok(())
    }
}
