//! Recursive duplication engine.

use std::collections::{BTreeSet, HashMap};

use serde_json::json;
use tracing::{debug, warn};

use super::cloner::{DuplicationContext, EntityCloner};
use super::exclusion::ExclusionPolicy;
use super::hooks::{AlterHooks, NestedAlterContext, RootAlterContext};
use super::options::DuplicateOptions;
use super::walker::FieldWalker;
use crate::domain::collaborators::{EntityFactory, FieldMetadataProvider};
use crate::domain::entities::{Entity, EntityKeys, FieldItem};
use crate::error::DuplicateError;

pub const DEFAULT_COMPOSED_TYPE: &str = "paragraph";
pub const DEFAULT_MAX_NESTING_DEPTH: usize = 16;

/// Structural settings of the engine that do not change between calls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineSettings {
    /// Target entity types whose references are always owned.
    pub composed_types: BTreeSet<String>,
    /// Deepest allowed nesting below the root.
    pub max_depth: usize,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            composed_types: BTreeSet::from([DEFAULT_COMPOSED_TYPE.to_string()]),
            max_depth: DEFAULT_MAX_NESTING_DEPTH,
        }
    }
}

/// Identity used to detect a nested entity that composes one of its ancestors.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum Identity {
    Id(String, u64),
    Uuid(String, uuid::Uuid),
}

fn identity_of(entity: &Entity) -> Option<Identity> {
    match (entity.id, entity.uuid) {
        (Some(id), _) => Some(Identity::Id(entity.entity_type.clone(), id)),
        (None, Some(uuid)) => Some(Identity::Uuid(entity.entity_type.clone(), uuid)),
        (None, None) => None,
    }
}

/// Clones a root entity and every entity it composes, across all translations.
///
/// The engine borrows its collaborators and an exclusion snapshot for the
/// duration of one call. It never persists anything.
pub struct DuplicationEngine<'a> {
    metadata: &'a dyn FieldMetadataProvider,
    factory: &'a dyn EntityFactory,
    policy: &'a ExclusionPolicy,
    hooks: &'a AlterHooks,
    settings: &'a EngineSettings,
    cloner: EntityCloner,
}

/// Traversal state threaded through the recursion.
struct Walk<'c> {
    ctx: &'c DuplicationContext,
    options: &'c DuplicateOptions,
    ancestors: Vec<Identity>,
    /// Finished clones by source identity. A nested entity held by several
    /// translations or fields is cloned once and shared.
    clones: HashMap<Identity, Entity>,
}

impl<'a> DuplicationEngine<'a> {
    pub fn new(
        metadata: &'a dyn FieldMetadataProvider,
        factory: &'a dyn EntityFactory,
        policy: &'a ExclusionPolicy,
        hooks: &'a AlterHooks,
        settings: &'a EngineSettings,
    ) -> Self {
        Self {
            metadata,
            factory,
            policy,
            hooks,
            settings,
            cloner: EntityCloner,
        }
    }

    /// Duplicates `source` into a new, unsaved entity tree.
    ///
    /// For every translation, in order: owned nested entities are cloned
    /// recursively, root alteration hooks run, root exclusions are removed,
    /// the publication status policy is applied and the title is prefixed.
    ///
    /// A nested entity held in several places (translations or fields) is
    /// cloned once. Every place receives the same clone, including its uuid.
    ///
    /// # Errors
    ///
    /// Returns [`DuplicateError::Configuration`] if the composition graph
    /// contains a cycle or nests deeper than [`EngineSettings::max_depth`].
    /// No partial tree is returned in that case.
    pub fn duplicate(
        &self,
        source: &Entity,
        ctx: &DuplicationContext,
        options: &DuplicateOptions,
    ) -> Result<Entity, DuplicateError> {
        let mut clone = self.cloner.duplicate(source, ctx);
        let keys = self.metadata.entity_keys(&source.entity_type);
        let default_status = if options.preserve_publication_status {
            None
        } else {
            self.bundle_default_status(source, &keys)
        };

        let mut walk = Walk {
            ctx,
            options,
            ancestors: identity_of(source).into_iter().collect(),
            clones: HashMap::new(),
        };

        for langcode in clone.langcodes() {
            self.duplicate_nested_fields(&mut clone, &langcode, &mut walk, 1)?;

            let root_ctx = RootAlterContext {
                source,
                langcode: &langcode,
                operation: &options.operation_tag,
            };
            self.hooks.invoke_root(&mut clone, &root_ctx);

            let removed = self.policy.apply(&mut clone, &langcode);
            if !removed.is_empty() {
                debug!(langcode = %langcode, fields = ?removed, "Removed excluded root fields");
            }

            if let (Some(key), Some(status)) = (&keys.published, &default_status) {
                clone.set_in(&langcode, key.as_str(), status.clone());
            }

            if let Some(label_key) = &keys.label
                && let Some(title) = clone.string_in(&langcode, label_key)
            {
                let title = options.prefixed_title(title);
                clone.set_in(&langcode, label_key.as_str(), vec![FieldItem::String(title)]);
            }
        }

        debug!(
            entity_type = %source.entity_type,
            bundle = %source.bundle,
            source_id = ?source.id,
            translations = clone.translations.len(),
            nested = clone.nested_entities().len(),
            operation = %options.operation_tag,
            "Duplicated entity tree"
        );

        Ok(clone)
    }

    /// Published-flag value of a freshly created entity of the source bundle.
    fn bundle_default_status(&self, source: &Entity, keys: &EntityKeys) -> Option<Vec<FieldItem>> {
        let key = keys.published.as_deref()?;
        let empty = self.factory.create_empty(&source.entity_type, &source.bundle);
        let status = empty.get_in(&empty.default_langcode, key).cloned();

        if status.is_none() {
            debug!(
                entity_type = %source.entity_type,
                bundle = %source.bundle,
                "Bundle has no default publication status, keeping source value"
            );
        }
        status
    }

    /// Replaces every nested entity of the owned fields of one translation with its clone.
    fn duplicate_nested_fields(
        &self,
        holder: &mut Entity,
        langcode: &str,
        walk: &mut Walk<'_>,
        depth: usize,
    ) -> Result<(), DuplicateError> {
        let walker = FieldWalker::new(self.metadata, &self.settings.composed_types);

        for field in walker.owned_fields(holder, langcode) {
            let Some(items) = holder
                .translation_mut(langcode)
                .and_then(|fields| fields.get_mut(&field))
            else {
                continue;
            };

            for item in items.iter_mut() {
                match item {
                    FieldItem::Entity(nested) => {
                        let identity = identity_of(nested);
                        let cached = identity.as_ref().and_then(|id| walk.clones.get(id)).cloned();
                        let copy = match cached {
                            Some(copy) => {
                                debug!(
                                    field = %field,
                                    entity_type = %nested.entity_type,
                                    source_id = ?nested.id,
                                    "Reusing clone of shared nested entity"
                                );
                                copy
                            }
                            None => {
                                let copy = self.duplicate_nested_entity(nested, &field, langcode, walk, depth)?;
                                if let Some(identity) = identity {
                                    walk.clones.insert(identity, copy.clone());
                                }
                                copy
                            }
                        };
                        **nested = copy;
                    }
                    FieldItem::Reference(target) => warn!(
                        field = %field,
                        target_type = %target.entity_type,
                        target_id = target.id,
                        "Owned reference is not loaded, leaving it unchanged"
                    ),
                    other => debug!(field = %field, item = ?other, "Skipping non-entity item in owned field"),
                }
            }
        }

        Ok(())
    }

    fn duplicate_nested_entity(
        &self,
        source: &Entity,
        parent_field: &str,
        langcode: &str,
        walk: &mut Walk<'_>,
        depth: usize,
    ) -> Result<Entity, DuplicateError> {
        if depth > self.settings.max_depth {
            return Err(DuplicateError::configuration(
                "Nested entity composition is deeper than allowed",
                json!({
                    "entity_type": source.entity_type,
                    "bundle": source.bundle,
                    "field": parent_field,
                    "max_depth": self.settings.max_depth,
                }),
            ));
        }

        let identity = identity_of(source);
        if let Some(identity) = &identity
            && walk.ancestors.contains(identity)
        {
            return Err(DuplicateError::configuration(
                "Nested entity composes one of its own ancestors",
                json!({
                    "entity_type": source.entity_type,
                    "bundle": source.bundle,
                    "id": source.id,
                    "field": parent_field,
                }),
            ));
        }

        let mut clone = self.cloner.duplicate(source, walk.ctx);

        let pushed = identity.is_some();
        walk.ancestors.extend(identity);
        for nested_langcode in clone.langcodes() {
            self.duplicate_nested_fields(&mut clone, &nested_langcode, walk, depth + 1)?;
        }
        if pushed {
            walk.ancestors.pop();
        }

        for nested_langcode in clone.langcodes() {
            self.policy.apply(&mut clone, &nested_langcode);
        }

        let definitions = self
            .metadata
            .field_definitions(&clone.entity_type, &clone.bundle);
        let mut hook_ctx = NestedAlterContext {
            source,
            parent_field,
            field: None,
            depth,
            langcode,
            operation: &walk.options.operation_tag,
        };
        self.hooks.invoke_nested(&mut clone, &hook_ctx);
        for definition in &definitions {
            hook_ctx.field = Some(definition);
            self.hooks.invoke_nested(&mut clone, &hook_ctx);
        }

        Ok(clone)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::collaborators::{MockEntityFactory, MockFieldMetadataProvider};
    use crate::domain::entities::{EntityRef, FieldDefinition};
    use std::sync::{Arc, Mutex};

    fn metadata() -> MockFieldMetadataProvider {
        let mut metadata = MockFieldMetadataProvider::new();
        metadata
            .expect_field_definitions()
            .returning(|entity_type, bundle| match (entity_type, bundle) {
                ("node", _) => vec![
                    FieldDefinition::scalar("title", "string").base(),
                    FieldDefinition::scalar("status", "boolean").base(),
                    FieldDefinition::reference("field_paragraphs", "paragraph"),
                    FieldDefinition::reference("field_tags", "taxonomy_term"),
                ],
                ("paragraph", "section") => vec![
                    FieldDefinition::scalar("field_heading", "string"),
                    FieldDefinition::reference("field_items", "paragraph"),
                ],
                ("paragraph", _) => vec![FieldDefinition::scalar("field_body", "text_long")],
                _ => vec![],
            });
        metadata.expect_entity_keys().returning(|entity_type| match entity_type {
            "node" => EntityKeys::node(),
            _ => EntityKeys::default(),
        });
        metadata
    }

    fn factory(default_status: bool) -> MockEntityFactory {
        let mut factory = MockEntityFactory::new();
        factory.expect_create_empty().returning(move |entity_type, bundle| {
            Entity::new(entity_type, bundle, "en")
                .with_field("status", vec![FieldItem::Boolean(default_status)])
        });
        factory
    }

    fn text_paragraph(id: u64, body: &str) -> Entity {
        Entity::new("paragraph", "text", "en")
            .with_id(id)
            .with_field("field_body", vec![FieldItem::text(body)])
    }

    fn node() -> Entity {
        Entity::new("node", "article", "en")
            .with_id(1)
            .with_owner(5)
            .with_field("title", vec![FieldItem::text("Launch Plan")])
            .with_field("status", vec![FieldItem::Boolean(true)])
            .with_field("field_paragraphs", vec![FieldItem::nested(text_paragraph(10, "text"))])
            .with_field(
                "field_tags",
                vec![FieldItem::Reference(EntityRef::new("taxonomy_term", 3))],
            )
    }

    #[test]
    fn test_nested_paragraph_is_cloned() {
        let (metadata, factory) = (metadata(), factory(true));
        let (policy, hooks, settings) = (ExclusionPolicy::default(), AlterHooks::new(), EngineSettings::default());
        let engine = DuplicationEngine::new(&metadata, &factory, &policy, &hooks, &settings);

        let source = node();
        let clone = engine
            .duplicate(&source, &DuplicationContext::new(9), &DuplicateOptions::default())
            .unwrap();

        let nested = clone.nested_entities();
        assert_eq!(nested.len(), 1);
        assert!(nested[0].is_new());
        assert_ne!(nested[0].uuid, source.nested_entities()[0].uuid);
        assert_eq!(nested[0].string_in("en", "field_body"), Some("text"));
        assert_eq!(
            clone.get("field_tags"),
            Some(&vec![FieldItem::Reference(EntityRef::new("taxonomy_term", 3))])
        );
    }

    #[test]
    fn test_deeply_nested_paragraphs_are_cloned_and_filtered() {
        let (metadata, factory) = (metadata(), factory(true));
        let mut policy = ExclusionPolicy::default();
        policy.insert("paragraph", "text", ["field_body"]);
        let (hooks, settings) = (AlterHooks::new(), EngineSettings::default());
        let engine = DuplicationEngine::new(&metadata, &factory, &policy, &hooks, &settings);

        let section = Entity::new("paragraph", "section", "en")
            .with_id(20)
            .with_field("field_heading", vec![FieldItem::text("Intro")])
            .with_field("field_items", vec![FieldItem::nested(text_paragraph(21, "deep"))]);
        let source = node().with_field("field_paragraphs", vec![FieldItem::nested(section)]);

        let clone = engine
            .duplicate(&source, &DuplicationContext::new(9), &DuplicateOptions::default())
            .unwrap();

        let nested = clone.nested_entities();
        assert_eq!(nested.len(), 2);
        assert!(nested.iter().all(|e| e.is_new()));
        assert_eq!(nested[0].string_in("en", "field_heading"), Some("Intro"));
        assert!(nested[1].get("field_body").is_none());
    }

    #[test]
    fn test_cycle_is_configuration_error() {
        let (metadata, factory) = (metadata(), factory(true));
        let (policy, hooks, settings) = (ExclusionPolicy::default(), AlterHooks::new(), EngineSettings::default());
        let engine = DuplicationEngine::new(&metadata, &factory, &policy, &hooks, &settings);

        let inner = Entity::new("paragraph", "section", "en").with_id(30);
        let outer = Entity::new("paragraph", "section", "en")
            .with_id(30)
            .with_field("field_items", vec![FieldItem::nested(inner)]);
        let source = node().with_field("field_paragraphs", vec![FieldItem::nested(outer)]);

        let result = engine.duplicate(&source, &DuplicationContext::new(1), &DuplicateOptions::default());

        assert!(matches!(result, Err(DuplicateError::Configuration { .. })));
    }

    #[test]
    fn test_depth_limit() {
        let (metadata, factory) = (metadata(), factory(true));
        let (policy, hooks) = (ExclusionPolicy::default(), AlterHooks::new());
        let settings = EngineSettings {
            max_depth: 1,
            ..EngineSettings::default()
        };
        let engine = DuplicationEngine::new(&metadata, &factory, &policy, &hooks, &settings);

        let section = Entity::new("paragraph", "section", "en")
            .with_id(40)
            .with_field("field_items", vec![FieldItem::nested(text_paragraph(41, "x"))]);
        let source = node().with_field("field_paragraphs", vec![FieldItem::nested(section)]);

        let result = engine.duplicate(&source, &DuplicationContext::new(1), &DuplicateOptions::default());
        assert!(matches!(result, Err(DuplicateError::Configuration { .. })));
    }

    #[test]
    fn test_status_reset_to_bundle_default() {
        let (metadata, factory) = (metadata(), factory(false));
        let (policy, hooks, settings) = (ExclusionPolicy::default(), AlterHooks::new(), EngineSettings::default());
        let engine = DuplicationEngine::new(&metadata, &factory, &policy, &hooks, &settings);

        let reset = engine
            .duplicate(&node(), &DuplicationContext::new(1), &DuplicateOptions::default())
            .unwrap();
        assert_eq!(reset.bool_in("en", "status"), Some(false));

        let kept = engine
            .duplicate(
                &node(),
                &DuplicationContext::new(1),
                &DuplicateOptions::default().preserving_status(true),
            )
            .unwrap();
        assert_eq!(kept.bool_in("en", "status"), Some(true));
    }

    #[test]
    fn test_hooks_are_invoked() {
        let (metadata, factory) = (metadata(), factory(true));
        let policy = ExclusionPolicy::default();
        let settings = EngineSettings::default();
        let seen = Arc::new(Mutex::new(Vec::new()));

        let mut hooks = AlterHooks::new();
        hooks.on_root_duplicated(|clone, ctx| {
            assert_eq!(ctx.operation, "duplicate_node");
            clone.set_in(ctx.langcode, "field_note", vec![FieldItem::text("altered")]);
        });
        let recorder = Arc::clone(&seen);
        hooks.on_nested_duplicated(move |clone, ctx| {
            recorder.lock().unwrap().push((
                clone.bundle.clone(),
                ctx.parent_field.to_string(),
                ctx.field.map(|f| f.name.clone()),
                ctx.depth,
            ));
        });

        let engine = DuplicationEngine::new(&metadata, &factory, &policy, &hooks, &settings);
        let clone = engine
            .duplicate(&node(), &DuplicationContext::new(1), &DuplicateOptions::default())
            .unwrap();

        assert_eq!(clone.string_in("en", "field_note"), Some("altered"));
        let seen = seen.lock().unwrap();
        assert_eq!(
            *seen,
            vec![
                ("text".to_string(), "field_paragraphs".to_string(), None, 1),
                (
                    "text".to_string(),
                    "field_paragraphs".to_string(),
                    Some("field_body".to_string()),
                    1
                ),
            ]
        );
    }

    #[test]
    fn test_unloaded_owned_reference_left_unchanged() {
        let (metadata, factory) = (metadata(), factory(true));
        let (policy, hooks, settings) = (ExclusionPolicy::default(), AlterHooks::new(), EngineSettings::default());
        let engine = DuplicationEngine::new(&metadata, &factory, &policy, &hooks, &settings);

        let reference = FieldItem::Reference(EntityRef::new("paragraph", 77));
        let source = node().with_field("field_paragraphs", vec![reference.clone()]);
        let clone = engine
            .duplicate(&source, &DuplicationContext::new(1), &DuplicateOptions::default())
            .unwrap();

        assert_eq!(clone.get("field_paragraphs"), Some(&vec![reference]));
    }

    #[test]
    fn test_shared_nested_entity_is_cloned_once() {
        let (metadata, factory) = (metadata(), factory(true));
        let (policy, settings) = (ExclusionPolicy::default(), EngineSettings::default());
        let calls = Arc::new(Mutex::new(0));
        let counter = Arc::clone(&calls);
        let mut hooks = AlterHooks::new();
        hooks.on_nested_duplicated(move |_, ctx| {
            if ctx.field.is_none() {
                *counter.lock().unwrap() += 1;
            }
        });
        let engine = DuplicationEngine::new(&metadata, &factory, &policy, &hooks, &settings);

        let shared = text_paragraph(10, "text");
        let mut source = node().with_field(
            "field_paragraphs",
            vec![FieldItem::nested(shared.clone()), FieldItem::nested(shared.clone())],
        );
        source.set_in("fr", "title", vec![FieldItem::text("Plan de lancement")]);
        source.set_in("fr", "field_paragraphs", vec![FieldItem::nested(shared)]);

        let clone = engine
            .duplicate(&source, &DuplicationContext::new(1), &DuplicateOptions::default())
            .unwrap();

        let nested = clone.nested_entities();
        assert_eq!(nested.len(), 3);
        assert!(nested.iter().all(|p| p.uuid == nested[0].uuid));
        assert_ne!(nested[0].uuid, source.nested_entities()[0].uuid);
        assert_eq!(*calls.lock().unwrap(), 1);
    }
}
