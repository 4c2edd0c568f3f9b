//! Persisted duplication settings and their read-only snapshot.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use validator::Validate;

use crate::domain::collaborators::ConfigReader;

/// Exclusion lists: entity type → bundle → field names.
pub type ExclusionMap = BTreeMap<String, BTreeMap<String, Vec<String>>>;

/// Module settings as stored by the settings repository.
///
/// ```json
/// {
///   "prefix_for_node_title": "Duplicate of",
///   "duplicate_status": false,
///   "exclude": { "paragraph": { "text": ["field_body"] } }
/// }
/// ```
#[serde_with::skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
pub struct DuplicateSettings {
    #[validate(length(max = 128, message = "Title prefix is too long"))]
    pub prefix_for_node_title: Option<String>,
    #[serde(default)]
    pub duplicate_status: bool,
    #[serde(default)]
    pub exclude: ExclusionMap,
}

impl DuplicateSettings {
    /// Freezes the settings into a key/value snapshot for one duplication call.
    pub fn snapshot(&self) -> SettingsSnapshot {
        SettingsSnapshot::new(serde_json::to_value(self).unwrap_or_default())
    }

    /// Configured title prefix, `None` when unset or empty.
    pub fn title_prefix(&self) -> Option<&str> {
        self.prefix_for_node_title.as_deref().filter(|p| !p.is_empty())
    }

    pub fn excluded_fields(&self, entity_type: &str, bundle: &str) -> &[String] {
        self.exclude
            .get(entity_type)
            .and_then(|bundles| bundles.get(bundle))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

/// Immutable view over a settings document addressed by dotted keys.
///
/// `get_setting("exclude.node.article")` walks `exclude` → `node` → `article`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SettingsSnapshot {
    root: Value,
}

impl SettingsSnapshot {
    pub fn new(root: Value) -> Self {
        Self { root }
    }
}

impl ConfigReader for SettingsSnapshot {
    fn get_setting(&self, key: &str) -> Option<Value> {
        let mut current = &self.root;
        for part in key.split('.') {
            current = current.as_object()?.get(part)?;
        }
        if current.is_null() {
            return None;
        }
        Some(current.clone())
    }
}
