//! Field metadata and bundle defaults loaded from a JSON schema document.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::BTreeMap;
use std::path::Path;

use crate::domain::collaborators::{EntityFactory, FieldMetadataProvider};
use crate::domain::entities::{Entity, EntityKeys, FieldDefinition, FieldItem};
use crate::error::DuplicateError;

fn default_langcode() -> String {
    "en".to_string()
}

/// Fields and default values of one bundle.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BundleSchema {
    #[serde(default)]
    pub fields: Vec<FieldDefinition>,
    /// Values a freshly created entity of the bundle starts with.
    #[serde(default)]
    pub defaults: IndexMap<String, Vec<FieldItem>>,
}

/// Keys and bundles of one entity type.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EntityTypeSchema {
    #[serde(default)]
    pub keys: EntityKeys,
    #[serde(default)]
    pub bundles: BTreeMap<String, BundleSchema>,
}

/// In-memory schema registry.
///
/// ```json
/// {
///   "default_langcode": "en",
///   "entity_types": {
///     "node": {
///       "keys": { "label": "title", "published": "status" },
///       "bundles": {
///         "article": {
///           "fields": [{ "name": "title", "field_type": "string", "base_field": true }],
///           "defaults": { "status": [{ "boolean": true }] }
///         }
///       }
///     }
///   }
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaRegistry {
    #[serde(default = "default_langcode")]
    pub default_langcode: String,
    #[serde(default)]
    pub entity_types: BTreeMap<String, EntityTypeSchema>,
}

impl Default for SchemaRegistry {
    fn default() -> Self {
        Self {
            default_langcode: default_langcode(),
            entity_types: BTreeMap::new(),
        }
    }
}

impl SchemaRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads a schema document from disk.
    ///
    /// # Errors
    ///
    /// Returns [`DuplicateError::Configuration`] if the file is missing or invalid.
    pub async fn load(path: &Path) -> Result<Self, DuplicateError> {
        let raw = tokio::fs::read_to_string(path).await.map_err(|e| {
            DuplicateError::configuration(
                "Schema file cannot be read",
                json!({ "path": path.display().to_string(), "reason": e.to_string() }),
            )
        })?;

        serde_json::from_str(&raw).map_err(|e| {
            DuplicateError::configuration(
                "Schema file is not valid",
                json!({ "path": path.display().to_string(), "reason": e.to_string() }),
            )
        })
    }

    pub fn with_entity_type(mut self, entity_type: &str, keys: EntityKeys) -> Self {
        self.entity_types.entry(entity_type.to_string()).or_default().keys = keys;
        self
    }

    pub fn with_bundle(
        mut self,
        entity_type: &str,
        bundle: &str,
        fields: Vec<FieldDefinition>,
        defaults: IndexMap<String, Vec<FieldItem>>,
    ) -> Self {
        self.entity_types
            .entry(entity_type.to_string())
            .or_default()
            .bundles
            .insert(bundle.to_string(), BundleSchema { fields, defaults });
        self
    }

    pub fn bundle(&self, entity_type: &str, bundle: &str) -> Option<&BundleSchema> {
        self.entity_types.get(entity_type)?.bundles.get(bundle)
    }

    pub fn has_bundle(&self, entity_type: &str, bundle: &str) -> bool {
        self.bundle(entity_type, bundle).is_some()
    }
}

impl FieldMetadataProvider for SchemaRegistry {
    fn field_definitions(&self, entity_type: &str, bundle: &str) -> Vec<FieldDefinition> {
        self.bundle(entity_type, bundle)
            .map(|b| b.fields.clone())
            .unwrap_or_default()
    }

    fn entity_keys(&self, entity_type: &str) -> EntityKeys {
        self.entity_types
            .get(entity_type)
            .map(|t| t.keys.clone())
            .unwrap_or_default()
    }
}

impl EntityFactory for SchemaRegistry {
    fn create_empty(&self, entity_type: &str, bundle: &str) -> Entity {
        let mut entity = Entity::new(entity_type, bundle, self.default_langcode.clone());
        if let Some(schema) = self.bundle(entity_type, bundle) {
            for (field, items) in &schema.defaults {
                entity.set(field.clone(), items.clone());
            }
        }
        entity
    }
}
