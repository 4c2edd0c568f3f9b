//! Domain layer containing the data model and the duplication core.
//!
//! # Architecture
//!
//! - [`entities`] - Entity, field metadata, group and settings data structures
//! - [`collaborators`] - Synchronous lookups the core consumes (config, schema, bundle defaults)
//! - [`repositories`] - Async storage and grouping trait definitions
//! - [`duplication`] - Exclusion policy, field walker, cloner and recursive engine
//!
//! # Design Principles
//!
//! - Domain layer has no dependencies on infrastructure
//! - The engine works on in-memory trees only; persistence happens in
//!   [`crate::application::services`]

pub mod collaborators;
pub mod duplication;
pub mod entities;
pub mod repositories;
