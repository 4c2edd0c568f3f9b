//! JSON document holding stored content, groups and memberships.

use serde::{Deserialize, Serialize};
use serde_json::json;
use std::path::Path;
use tracing::debug;

use crate::domain::entities::{Entity, GroupRef, Membership};
use crate::error::DuplicateError;

/// On-disk snapshot used to seed and dump the in-memory repositories.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContentFile {
    #[serde(default)]
    pub entities: Vec<Entity>,
    #[serde(default)]
    pub groups: Vec<GroupRef>,
    #[serde(default)]
    pub memberships: Vec<Membership>,
}

impl ContentFile {
    /// Reads a content file. A missing file yields an empty document.
    ///
    /// # Errors
    ///
    /// Returns [`DuplicateError::Configuration`] if the file cannot be parsed.
    pub async fn load(path: &Path) -> Result<Self, DuplicateError> {
        let raw = match tokio::fs::read_to_string(path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "Content file not found, starting empty");
                return Ok(Self::default());
            }
            Err(e) => return Err(e.into()),
        };

        serde_json::from_str(&raw).map_err(|e| {
            DuplicateError::configuration(
                "Content file is not valid",
                json!({ "path": path.display().to_string(), "reason": e.to_string() }),
            )
        })
    }

    pub async fn save(&self, path: &Path) -> Result<(), DuplicateError> {
        let raw = serde_json::to_string_pretty(self)?;
        tokio::fs::write(path, raw).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::{EntityRef, FieldItem};

    #[tokio::test]
    async fn test_roundtrip_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("content.json");
        let file = ContentFile {
            entities: vec![
                Entity::new("node", "page", "en")
                    .with_id(1)
                    .with_field("title", vec![FieldItem::text("Hello")]),
            ],
            groups: vec![GroupRef::new(7, "Editors")],
            memberships: vec![Membership {
                group_id: 7,
                entity: EntityRef::new("node", 1),
                plugin_id: "group_node:page".to_string(),
            }],
        };

        file.save(&path).await.unwrap();
        assert_eq!(ContentFile::load(&path).await.unwrap(), file);
    }

    #[tokio::test]
    async fn test_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let file = ContentFile::load(&dir.path().join("none.json")).await.unwrap();
        assert!(file.entities.is_empty());
    }
}
