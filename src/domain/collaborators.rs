//! Synchronous collaborator interfaces consumed by the duplication core.
//!
//! These are lookups over already-resolved data (a settings snapshot, the
//! field schema). Storage and grouping, which do I/O, are async repository
//! traits in [`crate::domain::repositories`].

use serde_json::Value;

use crate::domain::entities::{Entity, EntityKeys, FieldDefinition};

/// Read-only access to configuration by dotted key.
pub trait ConfigReader: Send + Sync {
    /// Returns the value stored under `key`, or `None` when not configured.
    fn get_setting(&self, key: &str) -> Option<Value>;
}

/// Field schema per entity type and bundle.
///
/// # Implementations
///
/// - [`crate::infrastructure::schema::SchemaRegistry`] - JSON-loadable registry
#[cfg_attr(test, mockall::automock)]
pub trait FieldMetadataProvider: Send + Sync {
    /// Field definitions of a bundle in their declared order.
    ///
    /// Unknown bundles yield an empty list.
    fn field_definitions(&self, entity_type: &str, bundle: &str) -> Vec<FieldDefinition>;

    /// Label and published-flag keys of an entity type.
    fn entity_keys(&self, entity_type: &str) -> EntityKeys;
}

/// Builds empty entities carrying bundle-level defaults.
#[cfg_attr(test, mockall::automock)]
pub trait EntityFactory: Send + Sync {
    /// Creates a new, unsaved entity of the bundle with default values populated.
    fn create_empty(&self, entity_type: &str, bundle: &str) -> Entity;
}
