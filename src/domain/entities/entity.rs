//! Content entity with translations and nested entity values.

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// Field values of one language view, keyed by field name in definition order.
///
/// A missing key means the field is unset. An empty list means the field is
/// set but empty.
pub type FieldSet = IndexMap<String, Vec<FieldItem>>;

/// Reference to a stored entity by type and id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityRef {
    pub entity_type: String,
    pub id: u64,
}

impl EntityRef {
    pub fn new(entity_type: impl Into<String>, id: u64) -> Self {
        Self {
            entity_type: entity_type.into(),
            id,
        }
    }
}

/// A single value of a field.
///
/// `Entity` holds a loaded nested entity by value. Duplicating the holder
/// therefore never aliases the nested entity of the source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldItem {
    String(String),
    Integer(i64),
    Float(f64),
    Boolean(bool),
    Timestamp(DateTime<Utc>),
    Json(Value),
    Reference(EntityRef),
    Entity(Box<Entity>),
}

impl FieldItem {
    pub fn text(value: impl Into<String>) -> Self {
        Self::String(value.into())
    }

    pub fn nested(entity: Entity) -> Self {
        Self::Entity(Box::new(entity))
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Boolean(b) => Some(*b),
            Self::Integer(i) => Some(*i != 0),
            _ => None,
        }
    }

    pub fn as_entity(&self) -> Option<&Entity> {
        match self {
            Self::Entity(e) => Some(e),
            _ => None,
        }
    }
}

/// A typed content record with identity metadata and language views.
///
/// The default translation is always present in `translations`. Identity
/// (id, uuid, owner, timestamps) is shared by every translation.
#[serde_with::skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub entity_type: String,
    pub bundle: String,
    pub id: Option<u64>,
    pub uuid: Option<Uuid>,
    pub revision_id: Option<u64>,
    pub owner: Option<u64>,
    pub created: Option<DateTime<Utc>>,
    pub changed: Option<DateTime<Utc>>,
    pub revision_timestamp: Option<DateTime<Utc>>,
    pub default_langcode: String,
    pub translations: IndexMap<String, FieldSet>,
}

impl Entity {
    /// Creates an unsaved entity with an empty default translation.
    pub fn new(
        entity_type: impl Into<String>,
        bundle: impl Into<String>,
        langcode: impl Into<String>,
    ) -> Self {
        let langcode = langcode.into();
        let mut translations = IndexMap::new();
        translations.insert(langcode.clone(), FieldSet::new());

        Self {
            entity_type: entity_type.into(),
            bundle: bundle.into(),
            id: None,
            uuid: None,
            revision_id: None,
            owner: None,
            created: None,
            changed: None,
            revision_timestamp: None,
            default_langcode: langcode,
            translations,
        }
    }

    pub fn with_id(mut self, id: u64) -> Self {
        self.id = Some(id);
        self.uuid.get_or_insert_with(Uuid::new_v4);
        self
    }

    pub fn with_owner(mut self, owner: u64) -> Self {
        self.owner = Some(owner);
        self
    }

    /// Sets a field on the default translation.
    pub fn with_field(mut self, name: impl Into<String>, items: Vec<FieldItem>) -> Self {
        self.set(name, items);
        self
    }

    /// Adds (or replaces) a translation with the given field values.
    pub fn with_translation(mut self, langcode: impl Into<String>, fields: FieldSet) -> Self {
        self.translations.insert(langcode.into(), fields);
        self
    }

    /// Returns a reference to this entity if it has been stored.
    pub fn reference(&self) -> Option<EntityRef> {
        self.id.map(|id| EntityRef::new(self.entity_type.clone(), id))
    }

    pub fn is_new(&self) -> bool {
        self.id.is_none()
    }

    /// Language codes of all translations, default language first.
    pub fn langcodes(&self) -> Vec<String> {
        let mut codes = vec![self.default_langcode.clone()];
        codes.extend(
            self.translations
                .keys()
                .filter(|code| **code != self.default_langcode)
                .cloned(),
        );
        codes
    }

    pub fn has_translation(&self, langcode: &str) -> bool {
        self.translations.contains_key(langcode)
    }

    pub fn translation(&self, langcode: &str) -> Option<&FieldSet> {
        self.translations.get(langcode)
    }

    pub fn translation_mut(&mut self, langcode: &str) -> Option<&mut FieldSet> {
        self.translations.get_mut(langcode)
    }

    /// Field value on the default translation.
    pub fn get(&self, field: &str) -> Option<&Vec<FieldItem>> {
        self.get_in(&self.default_langcode, field)
    }

    pub fn get_in(&self, langcode: &str, field: &str) -> Option<&Vec<FieldItem>> {
        self.translations.get(langcode)?.get(field)
    }

    pub fn set(&mut self, field: impl Into<String>, items: Vec<FieldItem>) {
        let langcode = self.default_langcode.clone();
        self.set_in(&langcode, field, items);
    }

    /// Sets a field on a translation, creating the translation if needed.
    pub fn set_in(&mut self, langcode: &str, field: impl Into<String>, items: Vec<FieldItem>) {
        self.translations
            .entry(langcode.to_string())
            .or_default()
            .insert(field.into(), items);
    }

    /// Unsets a field on a translation, keeping the order of the remaining fields.
    pub fn unset_in(&mut self, langcode: &str, field: &str) -> Option<Vec<FieldItem>> {
        self.translations.get_mut(langcode)?.shift_remove(field)
    }

    /// True when the field is unset or holds no items.
    pub fn is_field_empty(&self, langcode: &str, field: &str) -> bool {
        self.get_in(langcode, field).is_none_or(|items| items.is_empty())
    }

    /// First string value of a field.
    pub fn string_in(&self, langcode: &str, field: &str) -> Option<&str> {
        self.get_in(langcode, field)?.first()?.as_str()
    }

    /// First boolean value of a field.
    pub fn bool_in(&self, langcode: &str, field: &str) -> Option<bool> {
        self.get_in(langcode, field)?.first()?.as_bool()
    }

    /// Nested entities held by this entity in any translation, depth first.
    pub fn nested_entities(&self) -> Vec<&Entity> {
        let mut out = Vec::new();
        for fields in self.translations.values() {
            for items in fields.values() {
                for item in items {
                    if let FieldItem::Entity(nested) = item {
                        out.push(nested.as_ref());
                        out.extend(nested.nested_entities());
                    }
                }
            }
        }
        out
    }

    /// Visits every nested entity mutably, children before their own nested entities.
    pub fn for_each_nested_mut(&mut self, f: &mut dyn FnMut(&mut Entity)) {
        for fields in self.translations.values_mut() {
            for items in fields.values_mut() {
                for item in items.iter_mut() {
                    if let FieldItem::Entity(nested) = item {
                        f(nested);
                        nested.for_each_nested_mut(f);
                    }
                }
            }
        }
    }
}
