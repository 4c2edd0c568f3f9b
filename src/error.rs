//! Error type shared by the duplication core and its services.
//!
//! Every variant carries a human-readable `message` and a structured JSON
//! `details` payload so callers (the CLI, tests, log records) can report the
//! entity type, bundle or id involved without string parsing.

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

/// Errors surfaced by duplication and settings operations.
///
/// Only [`DuplicateError::NotFound`] and cycle detection abort a duplication.
/// Other anomalies in configuration degrade to defaults and are logged.
#[derive(Debug, Error)]
pub enum DuplicateError {
    /// The root entity does not resolve to a stored record.
    #[error("Not found: {message}")]
    NotFound { message: String, details: Value },

    /// Structurally invalid configuration (exclusion lists, composition cycles).
    #[error("Configuration error: {message}")]
    Configuration { message: String, details: Value },

    /// Invalid input to a settings or commit operation.
    #[error("Validation error: {message}")]
    Validation { message: String, details: Value },

    /// Reported by the storage collaborator; the in-memory tree must be discarded.
    #[error("Persistence failure: {message}")]
    Persistence { message: String, details: Value },

    /// The duplicate was saved but some group memberships were not attached.
    /// `details` carries the saved `entity_type` and `id`.
    #[error("Memberships incomplete: {message}")]
    MembershipsIncomplete { message: String, details: Value },

    #[error("Internal error: {message}")]
    Internal { message: String, details: Value },
}

impl DuplicateError {
    pub fn not_found(message: impl Into<String>, details: Value) -> Self {
        Self::NotFound {
            message: message.into(),
            details,
        }
    }
    pub fn configuration(message: impl Into<String>, details: Value) -> Self {
        Self::Configuration {
            message: message.into(),
            details,
        }
    }
    pub fn validation(message: impl Into<String>, details: Value) -> Self {
        Self::Validation {
            message: message.into(),
            details,
        }
    }
    pub fn persistence(message: impl Into<String>, details: Value) -> Self {
        Self::Persistence {
            message: message.into(),
            details,
        }
    }
    pub fn memberships_incomplete(message: impl Into<String>, details: Value) -> Self {
        Self::MembershipsIncomplete {
            message: message.into(),
            details,
        }
    }
    pub fn internal(message: impl Into<String>, details: Value) -> Self {
        Self::Internal {
            message: message.into(),
            details,
        }
    }

    /// Stable machine-readable code for the variant.
    pub fn code(&self) -> &'static str {
        match self {
            Self::NotFound { .. } => "not_found",
            Self::Configuration { .. } => "configuration_error",
            Self::Validation { .. } => "validation_error",
            Self::Persistence { .. } => "persistence_failure",
            Self::MembershipsIncomplete { .. } => "memberships_incomplete",
            Self::Internal { .. } => "internal_error",
        }
    }

    pub fn details(&self) -> &Value {
        match self {
            Self::NotFound { details, .. }
            | Self::Configuration { details, .. }
            | Self::Validation { details, .. }
            | Self::Persistence { details, .. }
            | Self::MembershipsIncomplete { details, .. }
            | Self::Internal { details, .. } => details,
        }
    }

    /// Serializable body for reporting the error outside the process.
    pub fn to_info(&self) -> ErrorInfo {
        let message = match self {
            Self::NotFound { message, .. }
            | Self::Configuration { message, .. }
            | Self::Validation { message, .. }
            | Self::Persistence { message, .. }
            | Self::MembershipsIncomplete { message, .. }
            | Self::Internal { message, .. } => message.clone(),
        };

        ErrorInfo {
            code: self.code(),
            message,
            details: self.details().clone(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorInfo {
    pub code: &'static str,
    pub message: String,
    pub details: Value,
}

impl From<serde_json::Error> for DuplicateError {
    fn from(e: serde_json::Error) -> Self {
        DuplicateError::internal("JSON error", serde_json::json!({ "reason": e.to_string() }))
    }
}

impl From<std::io::Error> for DuplicateError {
    fn from(e: std::io::Error) -> Self {
        DuplicateError::persistence("I/O error", serde_json::json!({ "reason": e.to_string() }))
    }
}
