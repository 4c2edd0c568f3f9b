//! Application configuration loaded from environment variables.
//!
//! Configuration is loaded once at startup and validated before any command runs.
//!
//! ```bash
//! export CONTENT_STORE_PATH="content.json"
//! export SCHEMA_PATH="schema.json"
//! export SETTINGS_PATH="duplicate_node.settings.json"
//! export COMPOSED_TYPES="paragraph,layout_section"
//! ```
//!
//! ## Optional Variables
//!
//! - `CONTENT_STORE_PATH` - Entities, groups and memberships (default: `content.json`)
//! - `SCHEMA_PATH` - Field metadata and bundle defaults (default: `schema.json`)
//! - `SETTINGS_PATH` - Title and exclusion settings (default: `duplicate_node.settings.json`)
//! - `COMPOSED_TYPES` - Comma-separated entity types always duplicated with their holder (default: `paragraph`)
//! - `MAX_NESTING_DEPTH` - Deepest nested entity allowed below the root (default: 16, max: 256)
//! - `OPERATION_TAG` - Tag passed to alteration hooks (default: `duplicate_node`)
//! - `DEFAULT_ACTOR` - User id owning duplicates when `--actor` is not given (default: 1)
//! - `RUST_LOG` - Log level (default: `info`)
//! - `LOG_FORMAT` - Log format: `text` or `json` (default: `text`)

use anyhow::{Context, Result};
use std::collections::BTreeSet;
use std::env;
use std::path::PathBuf;

use crate::domain::duplication::EngineSettings;
use crate::domain::duplication::engine::{DEFAULT_COMPOSED_TYPE, DEFAULT_MAX_NESTING_DEPTH};
use crate::domain::duplication::options::DEFAULT_OPERATION_TAG;
use crate::utils::machine_name::MACHINE_NAME_REGEX;

const MAX_ALLOWED_NESTING_DEPTH: usize = 256;

/// Tool configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    pub content_path: PathBuf,
    pub schema_path: PathBuf,
    pub settings_path: PathBuf,
    /// Target entity types whose references are always owned by the holder.
    pub composed_types: BTreeSet<String>,
    pub max_nesting_depth: usize,
    pub operation_tag: String,
    pub default_actor: u64,
    pub log_level: String,
    pub log_format: String,
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if `DEFAULT_ACTOR` or `MAX_NESTING_DEPTH` is set but not a number.
    pub fn from_env() -> Result<Self> {
        let content_path = env::var("CONTENT_STORE_PATH")
            .unwrap_or_else(|_| "content.json".to_string())
            .into();
        let schema_path = env::var("SCHEMA_PATH")
            .unwrap_or_else(|_| "schema.json".to_string())
            .into();
        let settings_path = env::var("SETTINGS_PATH")
            .unwrap_or_else(|_| "duplicate_node.settings.json".to_string())
            .into();

        let composed_types = Self::load_composed_types();

        let max_nesting_depth = match env::var("MAX_NESTING_DEPTH") {
            Ok(v) => v
                .parse()
                .with_context(|| format!("MAX_NESTING_DEPTH must be a number, got '{v}'"))?,
            Err(_) => DEFAULT_MAX_NESTING_DEPTH,
        };

        let operation_tag =
            env::var("OPERATION_TAG").unwrap_or_else(|_| DEFAULT_OPERATION_TAG.to_string());

        let default_actor = match env::var("DEFAULT_ACTOR") {
            Ok(v) => v
                .parse()
                .with_context(|| format!("DEFAULT_ACTOR must be a user id, got '{v}'"))?,
            Err(_) => 1,
        };

        let log_level = env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
        let log_format = env::var("LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

        Ok(Self {
            content_path,
            schema_path,
            settings_path,
            composed_types,
            max_nesting_depth,
            operation_tag,
            default_actor,
            log_level,
            log_format,
        })
    }

    /// Parses `COMPOSED_TYPES` as a comma-separated list.
    ///
    /// Blank entries are skipped. Falls back to `paragraph` when unset.
    fn load_composed_types() -> BTreeSet<String> {
        match env::var("COMPOSED_TYPES") {
            Ok(list) => list
                .split(',')
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .map(str::to_string)
                .collect(),
            Err(_) => BTreeSet::from([DEFAULT_COMPOSED_TYPE.to_string()]),
        }
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `max_nesting_depth` is outside 1-256
    /// - `log_format` is not `text` or `json`
    /// - `composed_types` contains something other than machine names
    /// - `operation_tag` is empty
    pub fn validate(&self) -> Result<()> {
        if self.max_nesting_depth == 0 || self.max_nesting_depth > MAX_ALLOWED_NESTING_DEPTH {
            anyhow::bail!(
                "MAX_NESTING_DEPTH must be between 1 and {}, got {}",
                MAX_ALLOWED_NESTING_DEPTH,
                self.max_nesting_depth
            );
        }

        if self.log_format != "text" && self.log_format != "json" {
            anyhow::bail!(
                "LOG_FORMAT must be 'text' or 'json', got '{}'",
                self.log_format
            );
        }

        if let Some(bad) = self
            .composed_types
            .iter()
            .find(|t| !MACHINE_NAME_REGEX.is_match(t))
        {
            anyhow::bail!("COMPOSED_TYPES must list machine names, got '{}'", bad);
        }

        if self.operation_tag.trim().is_empty() {
            anyhow::bail!("OPERATION_TAG must not be empty");
        }

        Ok(())
    }

    /// Structural engine settings derived from this configuration.
    pub fn engine_settings(&self) -> EngineSettings {
        EngineSettings {
            composed_types: self.composed_types.clone(),
            max_depth: self.max_nesting_depth,
        }
    }

    /// Prints configuration summary.
    pub fn print_summary(&self) {
        tracing::info!("Configuration loaded:");
        tracing::info!("  Content store: {}", self.content_path.display());
        tracing::info!("  Schema: {}", self.schema_path.display());
        tracing::info!("  Settings: {}", self.settings_path.display());
        tracing::info!("  Composed types: {:?}", self.composed_types);
        tracing::info!("  Max nesting depth: {}", self.max_nesting_depth);
        tracing::info!("  Operation tag: {}", self.operation_tag);
        tracing::info!("  Log level: {}", self.log_level);
        tracing::info!("  Log format: {}", self.log_format);
    }
}

/// Loads and validates configuration from environment variables.
///
/// # Errors
///
/// Returns an error if a variable cannot be parsed or validation fails.
///
/// # Note
///
/// This function expects environment variables to be already loaded
/// (e.g., via `dotenvy::dotenv()` in `main.rs`).
pub fn load_from_env() -> Result<Config> {
    let config = Config::from_env()?;
    config.validate()?;
    Ok(config)
}
