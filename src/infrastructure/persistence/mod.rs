//! Storage implementations.
//!
//! # Repositories
//!
//! - [`MemoryEntityRepository`] - Entity trees kept in memory with atomic tree saves
//! - [`FileSettingsRepository`] - Settings persisted as JSON on disk
//! - [`MemorySettingsRepository`] - Settings kept in memory
//! - [`ContentFile`] - JSON snapshot used to seed and dump the in-memory stores

pub mod content_file;
pub mod memory_entity_repository;
pub mod settings_repository;

pub use content_file::ContentFile;
pub use memory_entity_repository::MemoryEntityRepository;
pub use settings_repository::{FileSettingsRepository, MemorySettingsRepository};
