use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{Fields, RecordId, RESERVED_FIELDS};

/// Fields searched by [`Product::matches_query`].
const SEARCHABLE_FIELDS: &[&str] = &["title", "type", "specifications"];

/// A rentable catalog item.
///
/// Only the id is typed. Everything else (`title`, `type`, `specifications`,
/// `rent`, `image`, `createdAt`, and whatever a caller adds) is kept exactly
/// as received, so a string `rent` or a `null` image round-trips untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: RecordId,
    #[serde(flatten)]
    pub fields: Fields,
}

impl Product {
    /// Builds a new record from caller fields. `id` and `createdAt` in
    /// `fields` are discarded in favour of the store-assigned values.
    pub fn new(id: RecordId, created_at: String, mut fields: Fields) -> Self {
        for key in RESERVED_FIELDS {
            fields.remove(*key);
        }
        fields.insert("createdAt".to_string(), Value::String(created_at));
        Self { id, fields }
    }

    /// Shallow merge: patch fields overwrite, everything else is kept.
    /// `id` and `createdAt` never change.
    pub fn merged(&self, patch: Fields) -> Self {
        let mut fields = self.fields.clone();
        for (key, value) in patch {
            if RESERVED_FIELDS.contains(&key.as_str()) {
                continue;
            }
            fields.insert(key, value);
        }
        Self {
            id: self.id.clone(),
            fields,
        }
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    fn text(&self, field: &str) -> Option<&str> {
        self.get(field).and_then(Value::as_str)
    }

    pub fn title(&self) -> Option<&str> {
        self.text("title")
    }

    /// The `type` field.
    pub fn kind(&self) -> Option<&str> {
        self.text("type")
    }

    pub fn specifications(&self) -> Option<&str> {
        self.text("specifications")
    }

    pub fn rent(&self) -> Option<&Value> {
        self.get("rent")
    }

    pub fn created_at(&self) -> Option<&str> {
        self.text("createdAt")
    }

    /// Case-insensitive substring match on title, type or specifications.
    /// Non-string values never match. `needle` must already be lowercase.
    pub fn matches_query(&self, needle: &str) -> bool {
        SEARCHABLE_FIELDS
            .iter()
            .filter_map(|field| self.text(field))
            .any(|text| text.to_lowercase().contains(needle))
    }
}
