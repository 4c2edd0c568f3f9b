//! Application layer services implementing the duplication workflow.
//!
//! This layer orchestrates domain operations by coordinating repository calls,
//! settings snapshots and the duplication engine. Services consume repository
//! traits and provide a clean API for the command-line surface.
//!
//! # Available Services
//!
//! - [`services::duplication_service::DuplicationService`] - Prepare, commit and title a duplicate
//! - [`services::membership_service::MembershipService`] - Group membership propagation
//! - [`services::settings_service::SettingsService`] - Title and exclusion settings

pub mod services;
