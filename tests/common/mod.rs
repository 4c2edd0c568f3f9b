#![allow(dead_code)]

use indexmap::IndexMap;
use std::collections::BTreeMap;
use std::sync::Arc;

use duplicate_node::application::services::{DuplicationService, SettingsService};
use duplicate_node::domain::duplication::AlterHooks;
use duplicate_node::domain::entities::{
    DuplicateSettings, Entity, EntityKeys, EntityRef, FieldDefinition, FieldItem, FieldSet,
    GroupRef, Membership, membership_plugin_id,
};
use duplicate_node::infrastructure::grouping::{MemoryGroupRepository, NullGroupRepository};
use duplicate_node::infrastructure::persistence::{MemoryEntityRepository, MemorySettingsRepository};
use duplicate_node::infrastructure::schema::SchemaRegistry;

pub type TestService =
    DuplicationService<MemoryEntityRepository, MemoryGroupRepository, MemorySettingsRepository>;

/// Node bundles `article` and `page`, paragraph bundles `text` and `section`,
/// with unpublished as the bundle default for articles.
pub fn schema() -> SchemaRegistry {
    let node_fields = vec![
        FieldDefinition::scalar("title", "string").base(),
        FieldDefinition::scalar("status", "boolean").base(),
        FieldDefinition::scalar("field_summary", "string"),
        FieldDefinition::reference("field_paragraphs", "paragraph"),
        FieldDefinition::reference("field_sidebar", "paragraph"),
        FieldDefinition::reference("field_tags", "taxonomy_term"),
    ];

    SchemaRegistry::new()
        .with_entity_type("node", EntityKeys::node())
        .with_entity_type("paragraph", EntityKeys::default())
        .with_bundle(
            "node",
            "article",
            node_fields.clone(),
            IndexMap::from([("status".to_string(), vec![FieldItem::Boolean(false)])]),
        )
        .with_bundle(
            "node",
            "page",
            node_fields,
            IndexMap::from([("status".to_string(), vec![FieldItem::Boolean(true)])]),
        )
        .with_bundle(
            "paragraph",
            "text",
            vec![FieldDefinition::scalar("body", "text_long")],
            IndexMap::new(),
        )
        .with_bundle(
            "paragraph",
            "section",
            vec![
                FieldDefinition::scalar("field_heading", "string"),
                FieldDefinition::reference("field_items", "paragraph"),
            ],
            IndexMap::new(),
        )
}

pub fn text_paragraph(id: u64, body: &str) -> Entity {
    Entity::new("paragraph", "text", "en")
        .with_id(id)
        .with_field("body", vec![FieldItem::text(body)])
}

/// "Launch Plan": published article with one text paragraph and a tag.
pub fn launch_plan() -> Entity {
    Entity::new("node", "article", "en")
        .with_id(1)
        .with_owner(5)
        .with_field("title", vec![FieldItem::text("Launch Plan")])
        .with_field("status", vec![FieldItem::Boolean(true)])
        .with_field("field_summary", vec![FieldItem::text("Q3 rollout")])
        .with_field("field_paragraphs", vec![FieldItem::nested(text_paragraph(10, "text"))])
        .with_field(
            "field_tags",
            vec![FieldItem::Reference(EntityRef::new("taxonomy_term", 3))],
        )
}

/// Page with an English and a French translation.
pub fn bilingual_page() -> Entity {
    let mut fr = FieldSet::new();
    fr.insert("title".to_string(), vec![FieldItem::text("Bonjour")]);
    fr.insert(
        "field_paragraphs".to_string(),
        vec![FieldItem::nested(text_paragraph(21, "texte"))],
    );

    Entity::new("node", "page", "en")
        .with_id(2)
        .with_field("title", vec![FieldItem::text("Hello")])
        .with_field("status", vec![FieldItem::Boolean(true)])
        .with_field("field_paragraphs", vec![FieldItem::nested(text_paragraph(20, "text"))])
        .with_translation("fr", fr)
}

/// Page whose English and French translations hold the same paragraph.
pub fn shared_paragraph_page() -> Entity {
    let shared = text_paragraph(10, "text");
    let mut fr = FieldSet::new();
    fr.insert("title".to_string(), vec![FieldItem::text("Bonjour")]);
    fr.insert("field_paragraphs".to_string(), vec![FieldItem::nested(shared.clone())]);

    Entity::new("node", "page", "en")
        .with_id(2)
        .with_field("title", vec![FieldItem::text("Hello")])
        .with_field("field_paragraphs", vec![FieldItem::nested(shared)])
        .with_translation("fr", fr)
}

/// Article whose section paragraph holds another text paragraph.
pub fn nested_article() -> Entity {
    let section = Entity::new("paragraph", "section", "en")
        .with_id(30)
        .with_field("field_heading", vec![FieldItem::text("Intro")])
        .with_field("field_items", vec![FieldItem::nested(text_paragraph(31, "deep"))]);

    Entity::new("node", "article", "en")
        .with_id(3)
        .with_field("title", vec![FieldItem::text("Roadmap")])
        .with_field("status", vec![FieldItem::Boolean(false)])
        .with_field("field_paragraphs", vec![FieldItem::nested(section)])
}

pub fn settings(prefix: Option<&str>, duplicate_status: bool) -> DuplicateSettings {
    DuplicateSettings {
        prefix_for_node_title: prefix.map(str::to_string),
        duplicate_status,
        ..DuplicateSettings::default()
    }
}

pub fn exclude(settings: &mut DuplicateSettings, entity_type: &str, bundle: &str, fields: &[&str]) {
    settings
        .exclude
        .entry(entity_type.to_string())
        .or_insert_with(BTreeMap::new)
        .insert(
            bundle.to_string(),
            fields.iter().map(|f| f.to_string()).collect(),
        );
}

pub fn groups() -> Vec<GroupRef> {
    vec![GroupRef::new(100, "Marketing"), GroupRef::new(200, "Launch team")]
}

/// Memberships placing `entity` in every group of [`groups`].
pub fn memberships_of(entity: &Entity) -> Vec<Membership> {
    groups()
        .into_iter()
        .map(|g| Membership {
            group_id: g.id,
            entity: EntityRef::new(entity.entity_type.clone(), entity.id.unwrap_or_default()),
            plugin_id: membership_plugin_id(&entity.bundle),
        })
        .collect()
}

pub struct TestContext {
    pub service: TestService,
    pub entities: Arc<MemoryEntityRepository>,
    pub groups: Arc<MemoryGroupRepository>,
    pub settings: Arc<MemorySettingsRepository>,
    pub schema: Arc<SchemaRegistry>,
}

pub fn create_test_context(
    entities: Vec<Entity>,
    memberships: Vec<Membership>,
    settings: DuplicateSettings,
) -> TestContext {
    create_test_context_with_hooks(entities, memberships, settings, AlterHooks::new())
}

pub fn create_test_context_with_hooks(
    entities: Vec<Entity>,
    memberships: Vec<Membership>,
    settings: DuplicateSettings,
    hooks: AlterHooks,
) -> TestContext {
    let entities = Arc::new(MemoryEntityRepository::with_entities(entities));
    let groups = Arc::new(MemoryGroupRepository::with_state(groups(), memberships));
    let settings = Arc::new(MemorySettingsRepository::new(settings));
    let schema = Arc::new(schema());

    let service = DuplicationService::new(
        entities.clone(),
        groups.clone(),
        settings.clone(),
        schema.clone(),
        schema.clone(),
    )
    .with_hooks(hooks);

    TestContext {
        service,
        entities,
        groups,
        settings,
        schema,
    }
}

/// Service over a store without any grouping capability.
pub fn create_ungrouped_service(
    entities: Vec<Entity>,
    settings: DuplicateSettings,
) -> DuplicationService<MemoryEntityRepository, NullGroupRepository, MemorySettingsRepository> {
    let schema = Arc::new(schema());
    DuplicationService::new(
        Arc::new(MemoryEntityRepository::with_entities(entities)),
        Arc::new(NullGroupRepository::new()),
        Arc::new(MemorySettingsRepository::new(settings)),
        schema.clone(),
        schema,
    )
}

pub fn create_settings_service(
    settings: DuplicateSettings,
) -> (SettingsService<MemorySettingsRepository>, Arc<MemorySettingsRepository>) {
    let repo = Arc::new(MemorySettingsRepository::new(settings));
    (SettingsService::new(repo.clone(), Arc::new(schema())), repo)
}

/// Field names of every translation, and of every nested entity, in a
/// form that ignores identifiers.
pub fn shape(entity: &Entity) -> Vec<(String, String, Vec<String>)> {
    let mut out: Vec<_> = entity
        .translations
        .iter()
        .map(|(langcode, fields)| {
            (
                format!("{}:{}", entity.entity_type, entity.bundle),
                langcode.clone(),
                fields.keys().cloned().collect(),
            )
        })
        .collect();
    for nested in entity.nested_entities() {
        out.extend(nested.translations.iter().map(|(langcode, fields)| {
            (
                format!("{}:{}", nested.entity_type, nested.bundle),
                langcode.clone(),
                fields.keys().cloned().collect(),
            )
        }));
    }
    out
}
