//! The duplication core.
//!
//! # Components
//!
//! - [`exclusion`] - Per-(entity type, bundle) field exclusion lists
//! - [`walker`] - Field enumeration and owned-reference classification
//! - [`cloner`] - Identity-stripped copy of a single entity
//! - [`engine`] - Recursive duplication of a root and the entities it composes
//! - [`hooks`] - Alteration callbacks for surrounding systems
//! - [`options`] - Title prefix, status policy and operation tag
//!
//! # Flow
//!
//! 1. The root is copied by [`cloner::EntityCloner`]
//! 2. For each translation, [`walker::FieldWalker`] finds owned reference fields
//! 3. Every nested entity in them is cloned, recursively, and filtered by [`exclusion::ExclusionPolicy`]
//! 4. Root hooks run, root exclusions are removed, status and title policy are applied
//!
//! The engine is synchronous and keeps no state between calls.

pub mod cloner;
pub mod engine;
pub mod exclusion;
pub mod hooks;
pub mod options;
pub mod walker;

pub use cloner::{DuplicationContext, EntityCloner};
pub use engine::{DuplicationEngine, EngineSettings};
pub use exclusion::ExclusionPolicy;
pub use hooks::{AlterHooks, NestedAlterContext, RootAlterContext};
pub use options::DuplicateOptions;
pub use walker::{FieldKind, FieldWalker, WalkedField};
