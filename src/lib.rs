//! # Duplicate Node
//!
//! Duplicates a content entity together with the nested entities it composes,
//! across every translation, while applying field exclusions, alteration hooks,
//! a title prefix and a publication status policy.
//!
//! ## Architecture
//!
//! This crate follows Clean Architecture principles with clear layer separation:
//!
//! - **Domain Layer** ([`domain`]) - Entities, collaborator traits and the duplication engine
//! - **Application Layer** ([`application`]) - Duplication, membership and settings services
//! - **Infrastructure Layer** ([`infrastructure`]) - In-memory stores, JSON files and the schema registry
//!
//! ## Features
//!
//! - Recursive duplication of owned nested entities (paragraphs and configured types)
//! - Per entity type and bundle field exclusions
//! - Root and nested alteration hooks
//! - Group membership propagation after the duplicate is saved
//! - Atomic save of the whole duplicated tree
//!
//! ## Quick Start
//!
//! ```bash
//! export CONTENT_STORE_PATH="content.json"
//! export SCHEMA_PATH="schema.json"
//!
//! cargo run -- duplicate node 1
//! ```
//!
//! ## Configuration
//!
//! Tool configuration is loaded from environment variables via [`config::Config`].
//! See [`config`] module for available options.

pub mod application;
pub mod config;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod state;
pub mod utils;

pub use error::DuplicateError;
pub use state::AppState;

/// Commonly used types for external consumers.
///
/// Re-exports frequently used types to simplify imports for library users
/// and integration tests.
pub mod prelude {
    pub use crate::application::services::{
        DuplicationService, MembershipService, PreparedDuplicate, SettingsService,
    };
    pub use crate::domain::collaborators::{ConfigReader, EntityFactory, FieldMetadataProvider};
    pub use crate::domain::duplication::{
        AlterHooks, DuplicateOptions, DuplicationContext, DuplicationEngine, EngineSettings,
        ExclusionPolicy,
    };
    pub use crate::domain::entities::{
        DuplicateSettings, Entity, EntityKeys, EntityRef, FieldDefinition, FieldItem, GroupRef,
    };
    pub use crate::error::DuplicateError;
}
