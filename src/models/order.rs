use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{Fields, RecordId, RESERVED_FIELDS};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    #[default]
    Pending,
    Confirmed,
    Completed,
    Cancelled,
    /// Status written by some other tool; kept as-is.
    #[serde(untagged)]
    Other(String),
}

/// A customer order. Beyond id and status the shape is up to the caller;
/// nothing ties `productId` (or anything else) to the product list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: RecordId,
    #[serde(default)]
    pub status: OrderStatus,
    #[serde(flatten)]
    pub fields: Fields,
}

impl Order {
    /// New orders always start out pending, whatever the caller sent.
    pub fn new(id: RecordId, created_at: String, mut fields: Fields) -> Self {
        for key in RESERVED_FIELDS.iter().chain(&["status"]) {
            fields.remove(*key);
        }
        fields.insert("createdAt".to_string(), Value::String(created_at));
        Self {
            id,
            status: OrderStatus::Pending,
            fields,
        }
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    pub fn created_at(&self) -> Option<&str> {
        self.get("createdAt").and_then(Value::as_str)
    }
}
