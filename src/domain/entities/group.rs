//! Group collection reference.

use serde::{Deserialize, Serialize};

use super::EntityRef;

/// A collection entity that content can be a member of.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GroupRef {
    pub id: u64,
    pub label: String,
}

impl GroupRef {
    pub fn new(id: u64, label: impl Into<String>) -> Self {
        Self {
            id,
            label: label.into(),
        }
    }
}

/// Association of a content entity with a group.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Membership {
    pub group_id: u64,
    pub entity: EntityRef,
    pub plugin_id: String,
}

/// Relation plugin id used when attaching content of `bundle` to a group.
pub fn membership_plugin_id(bundle: &str) -> String {
    format!("group_node:{bundle}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plugin_id() {
        assert_eq!(membership_plugin_id("article"), "group_node:article");
    }
}
