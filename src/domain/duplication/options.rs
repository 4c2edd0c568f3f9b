//! Per-call duplication options.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::domain::collaborators::ConfigReader;

pub const DEFAULT_OPERATION_TAG: &str = "duplicate_node";
const PREFIX_KEY: &str = "prefix_for_node_title";
const STATUS_KEY: &str = "duplicate_status";

/// Options recognised by [`super::DuplicationEngine::duplicate`].
#[serde_with::skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DuplicateOptions {
    /// Text placed before every translated title, separated by one space.
    pub title_prefix: Option<String>,
    /// Keep the source publication status instead of the bundle default.
    pub preserve_publication_status: bool,
    pub operation_tag: String,
}

impl Default for DuplicateOptions {
    fn default() -> Self {
        Self {
            title_prefix: None,
            preserve_publication_status: false,
            operation_tag: DEFAULT_OPERATION_TAG.to_string(),
        }
    }
}

impl DuplicateOptions {
    /// Reads the title prefix and status flag from configuration.
    ///
    /// Values of the wrong shape are logged and ignored.
    pub fn from_config(reader: &dyn ConfigReader, operation_tag: impl Into<String>) -> Self {
        let title_prefix = match reader.get_setting(PREFIX_KEY) {
            Some(Value::String(prefix)) => Some(prefix),
            Some(other) => {
                warn!(key = PREFIX_KEY, value = %other, "Ignoring non-string title prefix");
                None
            }
            None => None,
        };

        let preserve_publication_status = match reader.get_setting(STATUS_KEY) {
            Some(Value::Bool(flag)) => flag,
            Some(Value::Number(n)) => n.as_i64().is_some_and(|n| n != 0),
            Some(other) => {
                warn!(key = STATUS_KEY, value = %other, "Ignoring non-boolean status flag");
                false
            }
            None => false,
        };

        Self {
            title_prefix,
            preserve_publication_status,
            operation_tag: operation_tag.into(),
        }
    }

    pub fn with_title_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.title_prefix = Some(prefix.into());
        self
    }

    pub fn preserving_status(mut self, preserve: bool) -> Self {
        self.preserve_publication_status = preserve;
        self
    }

    /// Effective prefix, `None` when unset or empty. Used as configured.
    pub fn prefix(&self) -> Option<&str> {
        self.title_prefix.as_deref().filter(|p| !p.is_empty())
    }

    pub fn prefixed_title(&self, title: &str) -> String {
        match self.prefix() {
            Some(prefix) => format!("{prefix} {title}"),
            None => title.to_string(),
        }
    }
}
