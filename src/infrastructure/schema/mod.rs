//! Schema collaborators: field metadata and bundle defaults.

mod schema_registry;

pub use schema_registry::{BundleSchema, EntityTypeSchema, SchemaRegistry};
