//! Infrastructure layer for external integrations.
//!
//! This layer implements interfaces defined by the domain layer.
//!
//! # Modules
//!
//! - [`grouping`] - Group membership storage (in-memory and no-op implementations)
//! - [`persistence`] - Entity and settings storage
//! - [`schema`] - Field metadata and bundle defaults

pub mod grouping;
pub mod persistence;
pub mod schema;
