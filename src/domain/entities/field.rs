//! Static field metadata.

use serde::{Deserialize, Serialize};

/// Metadata describing one field of a bundle.
///
/// `target_type` is set for reference fields. `owned_reference` marks the
/// field as composing its targets regardless of the target type.
#[serde_with::skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDefinition {
    pub name: String,
    pub field_type: String,
    pub label: Option<String>,
    pub target_type: Option<String>,
    #[serde(default)]
    pub owned_reference: bool,
    /// Base fields are defined by the entity type itself and are not offered
    /// for exclusion.
    #[serde(default)]
    pub base_field: bool,
}

impl FieldDefinition {
    /// A plain value field.
    pub fn scalar(name: impl Into<String>, field_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            field_type: field_type.into(),
            label: None,
            target_type: None,
            owned_reference: false,
            base_field: false,
        }
    }

    /// A reference field pointing at `target_type`.
    pub fn reference(name: impl Into<String>, target_type: impl Into<String>) -> Self {
        Self {
            target_type: Some(target_type.into()),
            ..Self::scalar(name, "entity_reference")
        }
    }

    /// A reference field whose targets are part of the holder's composition.
    pub fn owned(name: impl Into<String>, target_type: impl Into<String>) -> Self {
        Self {
            target_type: Some(target_type.into()),
            owned_reference: true,
            ..Self::scalar(name, "entity_reference_revisions")
        }
    }

    pub fn base(mut self) -> Self {
        self.base_field = true;
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn is_reference(&self) -> bool {
        self.target_type.is_some()
    }
}

/// Names of the fields an entity type uses for its label and published flag.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityKeys {
    pub label: Option<String>,
    pub published: Option<String>,
}

impl EntityKeys {
    pub fn new(label: Option<&str>, published: Option<&str>) -> Self {
        Self {
            label: label.map(str::to_string),
            published: published.map(str::to_string),
        }
    }

    /// Keys used by content nodes.
    pub fn node() -> Self {
        Self::new(Some("title"), Some("status"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_constructors() {
        let body = FieldDefinition::scalar("body", "text_long");
        assert!(!body.is_reference());
        assert!(!body.owned_reference);

        let tags = FieldDefinition::reference("field_tags", "taxonomy_term");
        assert_eq!(tags.target_type.as_deref(), Some("taxonomy_term"));
        assert!(!tags.owned_reference);

        let paragraphs = FieldDefinition::owned("field_paragraphs", "paragraph");
        assert!(paragraphs.owned_reference);
        assert_eq!(paragraphs.field_type, "entity_reference_revisions");
    }

    #[test]
    fn test_deserialize_defaults() {
        let def: FieldDefinition =
            serde_json::from_str(r#"{"name":"title","field_type":"string"}"#).unwrap();

        assert!(!def.owned_reference);
        assert!(!def.base_field);
        assert!(def.target_type.is_none());
    }

    #[test]
    fn test_node_keys() {
        let keys = EntityKeys::node();
        assert_eq!(keys.label.as_deref(), Some("title"));
        assert_eq!(keys.published.as_deref(), Some("status"));
        assert_eq!(EntityKeys::default().label, None);
    }
}
