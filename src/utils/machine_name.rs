//! Machine name validation for entity types, bundles and field names.

use crate::error::DuplicateError;
use regex::Regex;
use serde_json::json;
use std::sync::LazyLock;

/// Compiled regex for machine names.
pub static MACHINE_NAME_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z0-9_]+$").unwrap());

const MAX_MACHINE_NAME_LENGTH: usize = 128;

/// Validates a machine name such as `field_body` or `article`.
///
/// # Rules
///
/// - Length: 1-128 characters
/// - Allowed characters: lowercase letters, digits, underscores
///
/// # Errors
///
/// Returns [`DuplicateError::Validation`] if any rule is violated. `kind`
/// names what was being validated in the error details.
///
/// # Examples
///
/// ```ignore
/// assert!(validate_machine_name("field", "field_body").is_ok());
/// assert!(validate_machine_name("bundle", "Article").is_err());
/// ```
pub fn validate_machine_name(kind: &str, name: &str) -> Result<(), DuplicateError> {
    if name.is_empty() || name.len() > MAX_MACHINE_NAME_LENGTH {
        return Err(DuplicateError::validation(
            "Machine name must be 1-128 characters",
            json!({ "kind": kind, "provided_length": name.len() }),
        ));
    }

    if !MACHINE_NAME_REGEX.is_match(name) {
        return Err(DuplicateError::validation(
            "Machine name can only contain lowercase letters, digits and underscores",
            json!({ "kind": kind, "name": name }),
        ));
    }

    Ok(())
}
