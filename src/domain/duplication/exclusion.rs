//! Exclusion policy store.
//!
//! Reads `exclude.<entity_type>.<bundle>` lists from a configuration snapshot
//! once per duplication call. Malformed entries are reported and treated as
//! "no exclusions" so a bad setting never blocks duplication.

use std::collections::BTreeMap;

use indexmap::IndexSet;
use serde_json::Value;
use tracing::{debug, warn};

use crate::domain::collaborators::ConfigReader;
use crate::domain::entities::Entity;

const EXCLUDE_KEY: &str = "exclude";

/// Immutable per-(entity type, bundle) field exclusion lists.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExclusionPolicy {
    rules: BTreeMap<(String, String), IndexSet<String>>,
}

impl ExclusionPolicy {
    /// Builds the policy from the `exclude` tree of a configuration reader.
    ///
    /// Entries that are not lists of strings are logged and skipped.
    pub fn from_config(reader: &dyn ConfigReader) -> Self {
        let mut policy = Self::default();

        let Some(tree) = reader.get_setting(EXCLUDE_KEY) else {
            return policy;
        };
        let Some(entity_types) = tree.as_object() else {
            warn!(value = %tree, "Ignoring exclusion settings: expected a map of entity types");
            return policy;
        };

        for (entity_type, bundles) in entity_types {
            let Some(bundles) = bundles.as_object() else {
                warn!(entity_type, "Ignoring exclusion settings: expected a map of bundles");
                continue;
            };
            for (bundle, fields) in bundles {
                match parse_field_list(fields) {
                    Some(fields) => policy.insert(entity_type, bundle, fields),
                    None => warn!(
                        entity_type,
                        bundle,
                        value = %fields,
                        "Ignoring exclusion list: expected a list of field names"
                    ),
                }
            }
        }

        policy
    }

    /// Adds exclusions for a bundle, keeping first-seen order and dropping duplicates.
    pub fn insert<I, S>(&mut self, entity_type: &str, bundle: &str, fields: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.rules
            .entry((entity_type.to_string(), bundle.to_string()))
            .or_default()
            .extend(fields.into_iter().map(Into::into));
    }

    /// Field names to omit for a bundle. Unconfigured bundles yield an empty set.
    pub fn excluded_fields(&self, entity_type: &str, bundle: &str) -> Vec<&str> {
        self.rules
            .get(&(entity_type.to_string(), bundle.to_string()))
            .map(|fields| fields.iter().map(String::as_str).collect())
            .unwrap_or_default()
    }

    pub fn is_excluded(&self, entity_type: &str, bundle: &str, field: &str) -> bool {
        self.rules
            .get(&(entity_type.to_string(), bundle.to_string()))
            .is_some_and(|fields| fields.contains(field))
    }

    pub fn is_empty(&self) -> bool {
        self.rules.values().all(IndexSet::is_empty)
    }

    /// Unsets every excluded field on one translation of `entity`.
    ///
    /// Returns the names that were actually removed. Names that are not
    /// present on the entity are no-ops.
    pub fn apply(&self, entity: &mut Entity, langcode: &str) -> Vec<String> {
        let mut removed = Vec::new();

        for field in self.excluded_fields(&entity.entity_type, &entity.bundle) {
            if entity.unset_in(langcode, field).is_some() {
                removed.push(field.to_string());
            } else {
                debug!(
                    entity_type = %entity.entity_type,
                    bundle = %entity.bundle,
                    langcode,
                    field,
                    "Excluded field not present on entity"
                );
            }
        }

        removed
    }
}

fn parse_field_list(value: &Value) -> Option<Vec<String>> {
    value
        .as_array()?
        .iter()
        .map(|v| v.as_str().map(str::to_string))
        .collect()
}
