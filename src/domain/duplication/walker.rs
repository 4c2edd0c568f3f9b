//! Field graph walker.
//!
//! Enumerates an entity's fields in schema order and classifies each one as a
//! plain value, a shared reference or an owned (composed) reference.

use std::collections::BTreeSet;

use crate::domain::collaborators::FieldMetadataProvider;
use crate::domain::entities::{Entity, FieldDefinition, FieldItem};

/// How a field takes part in duplication.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Copied by value.
    Scalar,
    /// Reference copied by value; the target is not cloned.
    SharedReference,
    /// Reference to entities composed into the holder; targets are cloned.
    OwnedReference,
}

/// One field of an entity as seen by the walker.
#[derive(Debug, Clone)]
pub struct WalkedField<'e> {
    pub definition: FieldDefinition,
    pub kind: FieldKind,
    /// `None` when the field is unset on the walked translation.
    pub value: Option<&'e [FieldItem]>,
}

impl WalkedField<'_> {
    pub fn name(&self) -> &str {
        &self.definition.name
    }

    pub fn is_empty(&self) -> bool {
        self.value.is_none_or(<[FieldItem]>::is_empty)
    }
}

/// Walks field definitions supplied by a [`FieldMetadataProvider`].
pub struct FieldWalker<'a> {
    metadata: &'a dyn FieldMetadataProvider,
    composed_types: &'a BTreeSet<String>,
}

impl<'a> FieldWalker<'a> {
    /// `composed_types` lists target entity types whose references are owned.
    pub fn new(metadata: &'a dyn FieldMetadataProvider, composed_types: &'a BTreeSet<String>) -> Self {
        Self {
            metadata,
            composed_types,
        }
    }

    /// Classifies a field from its declared capability and target type.
    pub fn classify(&self, definition: &FieldDefinition) -> FieldKind {
        match &definition.target_type {
            _ if definition.owned_reference => FieldKind::OwnedReference,
            Some(target) if self.composed_types.contains(target) => FieldKind::OwnedReference,
            Some(_) => FieldKind::SharedReference,
            None => FieldKind::Scalar,
        }
    }

    pub fn definitions(&self, entity: &Entity) -> Vec<FieldDefinition> {
        self.metadata
            .field_definitions(&entity.entity_type, &entity.bundle)
    }

    /// Fields of one translation in definition order.
    pub fn enumerate_fields<'e>(&self, entity: &'e Entity, langcode: &str) -> Vec<WalkedField<'e>> {
        self.definitions(entity)
            .into_iter()
            .map(|definition| {
                let value = entity
                    .get_in(langcode, &definition.name)
                    .map(Vec::as_slice);
                WalkedField {
                    kind: self.classify(&definition),
                    definition,
                    value,
                }
            })
            .collect()
    }

    /// Names of owned reference fields that hold at least one item.
    pub fn owned_fields(&self, entity: &Entity, langcode: &str) -> Vec<String> {
        self.enumerate_fields(entity, langcode)
            .into_iter()
            .filter(|field| field.kind == FieldKind::OwnedReference && !field.is_empty())
            .map(|field| field.definition.name)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::collaborators::MockFieldMetadataProvider;

    fn composed() -> BTreeSet<String> {
        BTreeSet::from(["paragraph".to_string()])
    }

    fn article_metadata() -> MockFieldMetadataProvider {
        let mut metadata = MockFieldMetadataProvider::new();
        metadata.expect_field_definitions().returning(|_, _| {
            vec![
                FieldDefinition::scalar("title", "string").base(),
                FieldDefinition::reference("field_tags", "taxonomy_term"),
                FieldDefinition::reference("field_paragraphs", "paragraph"),
                FieldDefinition::owned("field_blocks", "block_content"),
                FieldDefinition::scalar("body", "text_long"),
            ]
        });
        metadata
    }

    #[test]
    fn test_classify() {
        let metadata = MockFieldMetadataProvider::new();
        let types = composed();
        let walker = FieldWalker::new(&metadata, &types);

        assert_eq!(
            walker.classify(&FieldDefinition::scalar("body", "text_long")),
            FieldKind::Scalar
        );
        assert_eq!(
            walker.classify(&FieldDefinition::reference("field_tags", "taxonomy_term")),
            FieldKind::SharedReference
        );
        assert_eq!(
            walker.classify(&FieldDefinition::reference("field_p", "paragraph")),
            FieldKind::OwnedReference
        );
        assert_eq!(
            walker.classify(&FieldDefinition::owned("field_b", "block_content")),
            FieldKind::OwnedReference
        );
    }

    #[test]
    fn test_enumerate_keeps_definition_order() {
        let metadata = article_metadata();
        let types = composed();
        let walker = FieldWalker::new(&metadata, &types);
        let entity = Entity::new("node", "article", "en")
            .with_field("body", vec![FieldItem::text("b")])
            .with_field("title", vec![FieldItem::text("t")]);

        let fields = walker.enumerate_fields(&entity, "en");
        let names: Vec<_> = fields.iter().map(WalkedField::name).collect();

        assert_eq!(
            names,
            vec!["title", "field_tags", "field_paragraphs", "field_blocks", "body"]
        );
        assert!(fields[1].value.is_none());
        assert!(fields[1].is_empty());
        assert!(!fields[4].is_empty());
    }

    #[test]
    fn test_owned_fields_skip_empty() {
        let metadata = article_metadata();
        let types = composed();
        let walker = FieldWalker::new(&metadata, &types);
        let entity = Entity::new("node", "article", "en")
            .with_field("field_paragraphs", vec![])
            .with_field(
                "field_blocks",
                vec![FieldItem::nested(Entity::new("block_content", "basic", "en"))],
            );

        assert_eq!(walker.owned_fields(&entity, "en"), vec!["field_blocks"]);
        assert!(walker.owned_fields(&entity, "fr").is_empty());
    }
}
