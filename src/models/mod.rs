mod id;
mod order;
mod product;

pub use id::RecordId;
pub use order::{Order, OrderStatus};
pub use product::Product;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// On-disk layout of the catalog: one document, two collections.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CatalogDocument {
    #[serde(default)]
    pub products: Vec<Product>,
    #[serde(default)]
    pub orders: Vec<Order>,
}

/// Caller-supplied record fields, accepted without a schema.
pub type Fields = Map<String, Value>;

/// Fields the store owns; callers can never set them.
pub(crate) const RESERVED_FIELDS: &[&str] = &["id", "createdAt"];
