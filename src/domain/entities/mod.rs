//! Core domain entities representing the duplication data model.
//!
//! Entities are plain data structures. The duplication algorithm lives in
//! [`crate::domain::duplication`].
//!
//! # Entity Types
//!
//! - [`Entity`] - A content record with translations and nested entity values
//! - [`FieldDefinition`] - Static metadata about one field of a bundle
//! - [`GroupRef`] - A collection the content can belong to
//! - [`DuplicateSettings`] - Persisted module settings

pub mod entity;
pub mod field;
pub mod group;
pub mod settings;

pub use entity::{Entity, EntityRef, FieldItem, FieldSet};
pub use field::{EntityKeys, FieldDefinition};
pub use group::{GroupRef, Membership, membership_plugin_id};
pub use settings::{DuplicateSettings, ExclusionMap, SettingsSnapshot};
