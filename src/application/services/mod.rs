//! Business logic services for the application layer.

pub mod duplication_service;
pub mod membership_service;
pub mod settings_service;

pub use duplication_service::{DuplicationService, PreparedDuplicate};
pub use membership_service::MembershipService;
pub use settings_service::SettingsService;
