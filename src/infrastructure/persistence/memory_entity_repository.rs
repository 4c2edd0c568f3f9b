//! In-memory implementation of the entity repository.

use async_trait::async_trait;
use serde_json::json;
use std::collections::{BTreeMap, BTreeSet};
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use crate::domain::entities::{Entity, EntityRef};
use crate::domain::repositories::EntityRepository;
use crate::error::DuplicateError;

#[derive(Debug, Default)]
struct Store {
    entities: BTreeMap<EntityRef, Entity>,
    next_ids: BTreeMap<String, u64>,
    next_revision: u64,
}

impl Store {
    fn bump_counters(&mut self, entity: &Entity) {
        if let Some(id) = entity.id {
            let next = self.next_ids.entry(entity.entity_type.clone()).or_insert(1);
            *next = (*next).max(id + 1);
        }
        if let Some(revision) = entity.revision_id {
            self.next_revision = self.next_revision.max(revision + 1);
        }
    }

    fn uuids(&self) -> BTreeSet<Uuid> {
        self.entities.values().filter_map(|e| e.uuid).collect()
    }

    /// Indexes `entity` and each nested entity it holds under its own reference.
    fn index(&mut self, entity: &Entity) {
        self.bump_counters(entity);
        for nested in entity.nested_entities() {
            self.bump_counters(nested);
            if let Some(reference) = nested.reference() {
                self.entities.insert(reference, nested.clone());
            }
        }
        if let Some(reference) = entity.reference() {
            self.entities.insert(reference, entity.clone());
        }
    }
}

/// Entity storage kept in process memory.
///
/// Stores root entities with their nested entities inline and also indexes
/// every nested entity by its own reference. [`EntityRepository::save_tree`]
/// assigns ids to the whole tree before anything becomes visible.
#[derive(Debug, Default)]
pub struct MemoryEntityRepository {
    store: RwLock<Store>,
}

impl MemoryEntityRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a repository pre-populated with stored entities.
    ///
    /// Entities without an id are ignored.
    pub fn with_entities(entities: impl IntoIterator<Item = Entity>) -> Self {
        let mut store = Store::default();
        for entity in entities {
            if entity.is_new() {
                debug!(entity_type = %entity.entity_type, "Skipping seed entity without id");
                continue;
            }
            store.index(&entity);
        }
        Self {
            store: RwLock::new(store),
        }
    }

    /// Root entities, i.e. those not held by another stored entity.
    pub async fn roots(&self) -> Vec<Entity> {
        let store = self.store.read().await;
        let nested: BTreeSet<EntityRef> = store
            .entities
            .values()
            .flat_map(|e| e.nested_entities())
            .filter_map(Entity::reference)
            .collect();

        store
            .entities
            .iter()
            .filter(|(reference, _)| !nested.contains(reference))
            .map(|(_, entity)| entity.clone())
            .collect()
    }

    pub async fn len(&self) -> usize {
        self.store.read().await.entities.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl EntityRepository for MemoryEntityRepository {
    async fn find_by_id(&self, entity_type: &str, id: u64) -> Result<Option<Entity>, DuplicateError> {
        let store = self.store.read().await;
        Ok(store.entities.get(&EntityRef::new(entity_type, id)).cloned())
    }

    async fn save_tree(&self, mut entity: Entity) -> Result<Entity, DuplicateError> {
        if !entity.is_new() {
            return Err(DuplicateError::validation(
                "Only new entities can be saved as a tree",
                json!({ "entity_type": entity.entity_type, "id": entity.id }),
            ));
        }

        let mut store = self.store.write().await;
        let mut next_ids = store.next_ids.clone();
        let mut next_revision = store.next_revision.max(1);
        let stored = store.uuids();
        // Copies of one nested entity share a uuid and receive the same ids.
        let mut staged: BTreeMap<Uuid, (Option<u64>, Option<u64>)> = BTreeMap::new();
        let mut conflict = None;

        let mut assign = |e: &mut Entity| {
            let uuid = *e.uuid.get_or_insert_with(Uuid::new_v4);
            if stored.contains(&uuid) {
                if conflict.is_none() {
                    conflict = Some((e.entity_type.clone(), uuid));
                }
                return;
            }
            if let Some(&(id, revision_id)) = staged.get(&uuid) {
                e.id = id;
                e.revision_id = revision_id;
                return;
            }
            if e.id.is_none() {
                let next = next_ids.entry(e.entity_type.clone()).or_insert(1);
                e.id = Some(*next);
                *next += 1;
                e.revision_id = Some(next_revision);
                next_revision += 1;
            }
            staged.insert(uuid, (e.id, e.revision_id));
        };

        entity.for_each_nested_mut(&mut assign);
        assign(&mut entity);

        if let Some((entity_type, uuid)) = conflict {
            return Err(DuplicateError::persistence(
                "UUID already exists",
                json!({ "entity_type": entity_type, "uuid": uuid }),
            ));
        }

        store.next_ids = next_ids;
        store.next_revision = next_revision;
        store.index(&entity);

        debug!(
            entity_type = %entity.entity_type,
            id = ?entity.id,
            nested = entity.nested_entities().len(),
            "Saved entity tree"
        );

        Ok(entity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::FieldItem;

    fn tree() -> Entity {
        let paragraph = Entity::new("paragraph", "text", "en")
            .with_field("field_body", vec![FieldItem::text("text")]);
        Entity::new("node", "article", "en")
            .with_field("title", vec![FieldItem::text("Launch Plan")])
            .with_field("field_paragraphs", vec![FieldItem::nested(paragraph)])
    }

    #[tokio::test]
    async fn test_save_tree_assigns_ids() {
        let repo = MemoryEntityRepository::with_entities([Entity::new("node", "page", "en").with_id(4)]);

        let saved = repo.save_tree(tree()).await.unwrap();

        assert_eq!(saved.id, Some(5));
        assert!(saved.uuid.is_some());
        let nested = saved.nested_entities();
        assert_eq!(nested[0].id, Some(1));
        assert!(nested[0].revision_id.is_some());

        let found = repo.find_by_id("paragraph", 1).await.unwrap();
        assert_eq!(found.unwrap().string_in("en", "field_body"), Some("text"));
        assert_eq!(repo.len().await, 3);
    }

    #[tokio::test]
    async fn test_save_tree_rejects_stored_entity() {
        let repo = MemoryEntityRepository::new();
        let result = repo.save_tree(Entity::new("node", "page", "en").with_id(1)).await;

        assert!(matches!(result, Err(DuplicateError::Validation { .. })));
        assert!(repo.is_empty().await);
    }

    #[tokio::test]
    async fn test_uuid_conflict_saves_nothing() {
        let existing = Entity::new("node", "page", "en").with_id(1);
        let uuid = existing.uuid;
        let repo = MemoryEntityRepository::with_entities([existing]);

        let mut clash = tree();
        clash.uuid = uuid;
        let result = repo.save_tree(clash).await;

        assert!(matches!(result, Err(DuplicateError::Persistence { .. })));
        assert_eq!(repo.len().await, 1);
        assert!(repo.find_by_id("paragraph", 1).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_shared_nested_entity_gets_one_id() {
        let repo = MemoryEntityRepository::new();
        let mut paragraph = Entity::new("paragraph", "text", "en")
            .with_field("field_body", vec![FieldItem::text("shared")]);
        paragraph.uuid = Some(Uuid::new_v4());

        let mut fr = crate::domain::entities::FieldSet::new();
        fr.insert("field_paragraphs".to_string(), vec![FieldItem::nested(paragraph.clone())]);
        let node = Entity::new("node", "page", "en")
            .with_field("field_paragraphs", vec![FieldItem::nested(paragraph)])
            .with_translation("fr", fr);

        let saved = repo.save_tree(node).await.unwrap();

        let nested = saved.nested_entities();
        assert_eq!(nested.len(), 2);
        assert_eq!(nested[0].id, Some(1));
        assert_eq!(nested[1].id, Some(1));
        assert_eq!(nested[0].revision_id, nested[1].revision_id);
        assert_eq!(repo.len().await, 2);
    }

    #[tokio::test]
    async fn test_find_missing() {
        let repo = MemoryEntityRepository::new();
        assert!(repo.find_by_id("node", 99).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_roots_exclude_nested() {
        let repo = MemoryEntityRepository::new();
        repo.save_tree(tree()).await.unwrap();

        let roots = repo.roots().await;
        assert_eq!(roots.len(), 1);
        assert_eq!(roots[0].entity_type, "node");
    }
}
