//! Repository trait definitions for the domain layer.
//!
//! These traits abstract the collaborators that perform I/O: entity storage,
//! the grouping capability and settings storage. Concrete implementations live
//! in `crate::infrastructure`.
//!
//! # Available Repositories
//!
//! - [`EntityRepository`] - Load sources and persist duplicated trees
//! - [`GroupRepository`] - Group memberships
//! - [`SettingsRepository`] - Duplication settings
//!
//! Mock implementations are generated via `mockall` for unit tests.

pub mod entity_repository;
pub mod group_repository;
pub mod settings_repository;

pub use entity_repository::EntityRepository;
pub use group_repository::GroupRepository;
pub use settings_repository::SettingsRepository;

#[cfg(test)]
pub use entity_repository::MockEntityRepository;
#[cfg(test)]
pub use group_repository::MockGroupRepository;
#[cfg(test)]
pub use settings_repository::MockSettingsRepository;
