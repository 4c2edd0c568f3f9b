//! Duplication settings management.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde_json::json;
use tracing::info;
use validator::Validate;

use crate::domain::collaborators::FieldMetadataProvider;
use crate::domain::entities::DuplicateSettings;
use crate::domain::repositories::SettingsRepository;
use crate::error::DuplicateError;
use crate::utils::machine_name::validate_machine_name;

/// Service for reading and updating [`DuplicateSettings`].
///
/// Exclusion lists only accept configurable fields that exist on the bundle.
/// Base fields such as the title cannot be excluded.
pub struct SettingsService<S: SettingsRepository> {
    settings_repository: Arc<S>,
    metadata: Arc<dyn FieldMetadataProvider>,
}

impl<S: SettingsRepository> SettingsService<S> {
    pub fn new(settings_repository: Arc<S>, metadata: Arc<dyn FieldMetadataProvider>) -> Self {
        Self {
            settings_repository,
            metadata,
        }
    }

    /// Returns the current settings.
    ///
    /// # Errors
    ///
    /// Returns [`DuplicateError::Configuration`] if stored settings cannot be parsed.
    pub async fn get(&self) -> Result<DuplicateSettings, DuplicateError> {
        self.settings_repository.load().await
    }

    /// Updates the title prefix and the status flag.
    ///
    /// `None` leaves a value unchanged. The prefix is stored as given and an
    /// empty prefix clears it.
    ///
    /// # Errors
    ///
    /// Returns [`DuplicateError::Validation`] if the prefix is too long.
    pub async fn update_title_settings(
        &self,
        prefix: Option<String>,
        duplicate_status: Option<bool>,
    ) -> Result<DuplicateSettings, DuplicateError> {
        let mut settings = self.settings_repository.load().await?;

        if let Some(prefix) = prefix {
            settings.prefix_for_node_title = (!prefix.is_empty()).then_some(prefix);
        }
        if let Some(flag) = duplicate_status {
            settings.duplicate_status = flag;
        }

        settings.validate().map_err(|e| {
            DuplicateError::validation("Invalid title settings", json!({ "errors": e.to_string() }))
        })?;

        self.settings_repository.save(&settings).await?;
        info!(
            prefix = ?settings.prefix_for_node_title,
            duplicate_status = settings.duplicate_status,
            "Title settings updated"
        );
        Ok(settings)
    }

    /// Replaces the exclusion lists of one entity type.
    ///
    /// `selection` maps bundles to the fields to exclude. Bundles with no
    /// selected fields are dropped, and the entity type is removed entirely
    /// when nothing remains.
    ///
    /// # Errors
    ///
    /// Returns [`DuplicateError::Validation`] if:
    /// - A name is not a machine name
    /// - A field does not exist on the bundle
    /// - A field is a base field
    pub async fn set_exclusions(
        &self,
        entity_type: &str,
        selection: BTreeMap<String, Vec<String>>,
    ) -> Result<DuplicateSettings, DuplicateError> {
        validate_machine_name("entity_type", entity_type)?;

        let mut bundles = BTreeMap::new();
        for (bundle, fields) in selection {
            validate_machine_name("bundle", &bundle)?;

            let mut selected: Vec<String> = Vec::new();
            for field in fields {
                if !selected.contains(&field) {
                    selected.push(field);
                }
            }
            if selected.is_empty() {
                continue;
            }

            self.check_excludable(entity_type, &bundle, &selected)?;
            bundles.insert(bundle, selected);
        }

        let mut settings = self.settings_repository.load().await?;
        if bundles.is_empty() {
            settings.exclude.remove(entity_type);
        } else {
            settings.exclude.insert(entity_type.to_string(), bundles);
        }

        self.settings_repository.save(&settings).await?;
        info!(
            entity_type,
            bundles = settings.exclude.get(entity_type).map_or(0, BTreeMap::len),
            "Exclusion settings updated"
        );
        Ok(settings)
    }

    /// Fields excluded for one bundle.
    pub async fn excluded_fields(
        &self,
        entity_type: &str,
        bundle: &str,
    ) -> Result<Vec<String>, DuplicateError> {
        let settings = self.settings_repository.load().await?;
        Ok(settings.excluded_fields(entity_type, bundle).to_vec())
    }

    fn check_excludable(
        &self,
        entity_type: &str,
        bundle: &str,
        fields: &[String],
    ) -> Result<(), DuplicateError> {
        let definitions = self.metadata.field_definitions(entity_type, bundle);

        for field in fields {
            validate_machine_name("field", field)?;

            match definitions.iter().find(|d| &d.name == field) {
                None => {
                    return Err(DuplicateError::validation(
                        "Field does not exist on this bundle",
                        json!({ "entity_type": entity_type, "bundle": bundle, "field": field }),
                    ));
                }
                Some(definition) if definition.base_field => {
                    return Err(DuplicateError::validation(
                        "Base fields cannot be excluded",
                        json!({ "entity_type": entity_type, "bundle": bundle, "field": field }),
                    ));
                }
                Some(_) => {}
            }
        }

        Ok(())
    }
}
