//! The catalog store: products and orders held in memory, optionally
//! mirrored to a JSON file after every mutation.
//!
//! Both collections are keyed by [`RecordId::key`], so lookups by `3` and
//! `"3"` resolve to the same record and ids stay unique under that rule.
//! `IndexMap` keeps insertion order for listing and search.

mod ids;
mod persist;

pub use ids::IdGenerator;
pub use persist::{encode, JsonFile};

use std::path::PathBuf;

use chrono::{SecondsFormat, Utc};
use indexmap::IndexMap;
use tracing::{info, warn};

use crate::error::{StoreError, StoreResult};
use crate::models::{CatalogDocument, Fields, Order, Product, RecordId};
use crate::seed;

// ── Mutation results ──────────────────────────────────────────────────────────

/// What happened when the catalog was written back after a mutation.
#[derive(Debug)]
pub enum FlushOutcome {
    /// The store has no backing file.
    MemoryOnly,
    Persisted,
    /// The write failed; the in-memory change is kept regardless.
    Failed(StoreError),
}

impl FlushOutcome {
    pub fn is_failed(&self) -> bool {
        matches!(self, FlushOutcome::Failed(_))
    }
}

/// A completed in-memory mutation together with its flush outcome.
#[derive(Debug)]
pub struct Mutation<T> {
    pub value: T,
    pub flush: FlushOutcome,
}

impl<T> Mutation<T> {
    /// Strict view: a failed flush becomes an error (the mutation still stands).
    pub fn into_result(self) -> StoreResult<T> {
        match self.flush {
            FlushOutcome::Failed(err) => Err(err),
            _ => Ok(self.value),
        }
    }
}

// ── Store ─────────────────────────────────────────────────────────────────────

#[derive(Debug)]
pub struct CatalogStore {
    products: IndexMap<String, Product>,
    orders: IndexMap<String, Order>,
    ids: IdGenerator,
    file: Option<JsonFile>,
}

impl CatalogStore {
    /// Memory-only store over `document`. Mutations never touch the disk.
    pub fn in_memory(document: CatalogDocument) -> StoreResult<Self> {
        Self::from_document(document, None)
    }

    /// Loads the catalog from `path`. A missing file is created from the seed
    /// catalog; an unreadable or malformed file is an error so that it is
    /// never overwritten.
    pub async fn open(path: impl Into<PathBuf>) -> StoreResult<Self> {
        let file = JsonFile::new(path);

        match file.load().await? {
            Some(document) => {
                info!(
                    path = %file.path().display(),
                    products = document.products.len(),
                    orders = document.orders.len(),
                    "Catalog loaded"
                );
                Self::from_document(document, Some(file))
            }
            None => {
                info!(path = %file.path().display(), "No catalog file found, writing seed catalog");
                let store = Self::from_document(seed::seed_catalog(), Some(file))?;
                store.flush().await;
                Ok(store)
            }
        }
    }

    fn from_document(document: CatalogDocument, file: Option<JsonFile>) -> StoreResult<Self> {
        let ids = IdGenerator::new();

        let mut products = IndexMap::with_capacity(document.products.len());
        for product in document.products {
            let key = product.id.key();
            if let Some(n) = product.id.as_u64() {
                ids.observe(n);
            }
            if products.insert(key.clone(), product).is_some() {
                return Err(StoreError::Validation(format!("duplicate product id {key}")));
            }
        }

        let mut orders = IndexMap::with_capacity(document.orders.len());
        for order in document.orders {
            let key = order.id.key();
            if let Some(n) = order.id.as_u64() {
                ids.observe(n);
            }
            if orders.insert(key.clone(), order).is_some() {
                return Err(StoreError::Validation(format!("duplicate order id {key}")));
            }
        }

        Ok(Self {
            products,
            orders,
            ids,
            file,
        })
    }

    pub fn is_persistent(&self) -> bool {
        self.file.is_some()
    }

    pub fn product_count(&self) -> usize {
        self.products.len()
    }

    pub fn order_count(&self) -> usize {
        self.orders.len()
    }

    /// The whole catalog in its persisted shape.
    pub fn snapshot(&self) -> CatalogDocument {
        CatalogDocument {
            products: self.products.values().cloned().collect(),
            orders: self.orders.values().cloned().collect(),
        }
    }

    /// Writes the full catalog to the backing file, if there is one.
    /// Failures are logged and handed back, never raised.
    pub async fn flush(&self) -> FlushOutcome {
        let Some(file) = &self.file else {
            return FlushOutcome::MemoryOnly;
        };

        match file.save(&self.snapshot()).await {
            Ok(()) => FlushOutcome::Persisted,
            Err(err) => {
                warn!(error = %err, "Catalog flush failed; continuing in memory");
                FlushOutcome::Failed(err)
            }
        }
    }

    // ── Products ──────────────────────────────────────────────────────────────

    pub fn list_products(&self) -> Vec<Product> {
        self.products.values().cloned().collect()
    }

    pub fn get_product(&self, id: &RecordId) -> StoreResult<&Product> {
        self.products
            .get(&id.key())
            .ok_or_else(|| StoreError::product_not_found(id))
    }

    pub async fn create_product(&mut self, fields: Fields) -> Mutation<Product> {
        let id = self.fresh_id(|store, key| store.products.contains_key(key));
        let product = Product::new(id, timestamp(), fields);
        self.products.insert(product.id.key(), product.clone());

        let flush = self.flush().await;
        Mutation {
            value: product,
            flush,
        }
    }

    pub async fn update_product(
        &mut self,
        id: &RecordId,
        patch: Fields,
    ) -> StoreResult<Mutation<Product>> {
        let existing = self
            .products
            .get_mut(&id.key())
            .ok_or_else(|| StoreError::product_not_found(id))?;
        let merged = existing.merged(patch);
        *existing = merged.clone();

        let flush = self.flush().await;
        Ok(Mutation {
            value: merged,
            flush,
        })
    }

    /// Removes the product, keeping the relative order of the rest.
    pub async fn delete_product(&mut self, id: &RecordId) -> StoreResult<Mutation<Product>> {
        let removed = self
            .products
            .shift_remove(&id.key())
            .ok_or_else(|| StoreError::product_not_found(id))?;

        let flush = self.flush().await;
        Ok(Mutation {
            value: removed,
            flush,
        })
    }

    /// Case-insensitive match on title, type or specifications.
    /// An empty query matches every product.
    pub fn search_products(&self, query: &str) -> Vec<Product> {
        let needle = query.to_lowercase();
        if needle.is_empty() {
            return self.list_products();
        }
        self.products
            .values()
            .filter(|p| p.matches_query(&needle))
            .cloned()
            .collect()
    }

    // ── Orders ────────────────────────────────────────────────────────────────

    pub fn list_orders(&self) -> Vec<Order> {
        self.orders.values().cloned().collect()
    }

    /// Same id and timestamp rules as products; `status` is always `pending`.
    pub async fn create_order(&mut self, fields: Fields) -> Mutation<Order> {
        let id = self.fresh_id(|store, key| store.orders.contains_key(key));
        let order = Order::new(id, timestamp(), fields);
        self.orders.insert(order.id.key(), order.clone());

        let flush = self.flush().await;
        Mutation { value: order, flush }
    }

    /// Next generated id not already taken in the target collection
    /// (text ids such as `"abc-1"` are outside the generator's range).
    fn fresh_id(&self, taken: impl Fn(&Self, &str) -> bool) -> RecordId {
        loop {
            let id = self.ids.next_id();
            if !taken(self, &id.key()) {
                return id;
            }
        }
    }
}

/// ISO-8601 creation stamp, always with milliseconds (`2024-05-01T10:00:00.000Z`).
/// Stored as text and never reformatted afterwards.
fn timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};
    use std::collections::HashSet;

    fn fields(value: Value) -> Fields {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected an object"),
        }
    }

    fn seeded() -> CatalogStore {
        CatalogStore::in_memory(seed::seed_catalog()).unwrap()
    }

    #[tokio::test]
    async fn created_product_is_returned_by_get() {
        let mut store = seeded();
        let created = store
            .create_product(fields(json!({ "title": "Stage Light", "type": "lighting", "rent": 25000 })))
            .await;
        assert!(matches!(created.flush, FlushOutcome::MemoryOnly));

        let fetched = store.get_product(&created.value.id).unwrap();
        assert_eq!(fetched, &created.value);
        assert!(fetched.created_at().is_some());
        assert_eq!(store.list_products().last(), Some(&created.value));
    }

    #[tokio::test]
    async fn created_at_always_has_milliseconds() {
        let mut store = seeded();
        for _ in 0..50 {
            let created = store.create_product(Fields::new()).await.value;
            let stamp = created.created_at().unwrap();
            // 2024-05-01T10:00:00.000Z
            assert_eq!(stamp.len(), 24, "{stamp}");
            assert!(stamp.ends_with('Z'));
            assert_eq!(&stamp[19..20], ".");
        }
    }

    #[tokio::test]
    async fn create_never_reuses_an_id() {
        let mut store = CatalogStore::in_memory(CatalogDocument::default()).unwrap();
        let mut seen = HashSet::new();
        for _ in 0..200 {
            let created = store.create_product(Fields::new()).await;
            assert!(seen.insert(created.value.id.key()));
        }
        assert_eq!(store.product_count(), 200);
    }

    #[tokio::test]
    async fn generated_ids_stay_above_loaded_ids() {
        let far_future = Utc::now().timestamp_millis() + 10_000_000;
        let document: CatalogDocument = serde_json::from_value(json!({
            "products": [ { "id": far_future, "title": "From the future" } ]
        }))
        .unwrap();
        let mut store = CatalogStore::in_memory(document).unwrap();

        let created = store.create_product(Fields::new()).await;
        assert!(created.value.id.as_u64().unwrap() > far_future as u64);
        assert_eq!(store.product_count(), 2);
    }

    #[tokio::test]
    async fn fields_are_stored_unchecked() {
        let mut store = seeded();
        let created = store
            .create_product(fields(json!({
                "title": "Par LED",
                "rent": "150000",
                "image": null,
                "tags": ["stage", "outdoor"]
            })))
            .await
            .value;

        let stored = store.get_product(&created.id).unwrap();
        assert_eq!(stored.rent(), Some(&json!("150000")));
        assert_eq!(stored.get("image"), Some(&Value::Null));
        assert_eq!(stored.get("tags"), Some(&json!(["stage", "outdoor"])));
        assert_eq!(store.search_products("par led").len(), 1);
    }

    #[tokio::test]
    async fn update_changes_only_patched_field() {
        let mut store = seeded();
        let before = store.get_product(&RecordId::from(1)).unwrap().clone();

        let updated = store
            .update_product(&RecordId::from(1), fields(json!({ "rent": 200 })))
            .await
            .unwrap()
            .value;

        assert_eq!(updated.rent(), Some(&json!(200)));
        let mut expected = before;
        expected.fields.insert("rent".into(), json!(200));
        assert_eq!(updated, expected);
        assert_eq!(store.get_product(&RecordId::from("1")).unwrap(), &expected);
    }

    #[tokio::test]
    async fn update_accepts_any_value_shape() {
        let mut store = seeded();
        let updated = store
            .update_product(
                &RecordId::from(2),
                fields(json!({ "image": null, "title": ["not", "text"], "rent": "150000" })),
            )
            .await
            .unwrap()
            .value;

        assert_eq!(updated.get("image"), Some(&Value::Null));
        assert_eq!(updated.get("title"), Some(&json!(["not", "text"])));
        assert_eq!(updated.rent(), Some(&json!("150000")));
        // the array title no longer matches, the other text fields still do
        assert!(store.search_products("uslim").is_empty());
        assert_eq!(store.search_products("P2.5").len(), 1);
    }

    #[tokio::test]
    async fn update_keeps_position_in_listing() {
        let mut store = seeded();
        store
            .update_product(&RecordId::from(1), fields(json!({ "title": "Renamed" })))
            .await
            .unwrap();
        let titles: Vec<String> = store
            .list_products()
            .iter()
            .map(|p| p.title().unwrap().to_string())
            .collect();
        assert_eq!(titles[0], "Renamed");
        assert_eq!(titles.len(), 3);
    }

    #[tokio::test]
    async fn update_missing_product_is_not_found() {
        let mut store = seeded();
        let err = store
            .update_product(&RecordId::from(404), fields(json!({ "rent": 1 })))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound { .. }));
    }

    #[tokio::test]
    async fn delete_then_get_is_not_found() {
        let mut store = seeded();
        let removed = store.delete_product(&RecordId::from(2)).await.unwrap();
        assert_eq!(removed.value.id, RecordId::from(2));

        let err = store.get_product(&RecordId::from(2)).unwrap_err();
        assert!(matches!(err, StoreError::NotFound { .. }));

        let ids: Vec<String> = store.list_products().iter().map(|p| p.id.key()).collect();
        assert_eq!(ids, vec!["1", "3"]);
    }

    #[tokio::test]
    async fn delete_missing_product_is_not_found() {
        let mut store = seeded();
        assert!(store.delete_product(&RecordId::from("nope")).await.is_err());
        assert_eq!(store.product_count(), 3);
    }

    #[test]
    fn numeric_lookup_matches_string_id() {
        let store = seeded();
        let product = store.get_product(&RecordId::from(3)).unwrap();
        assert_eq!(product.id, RecordId::from("3"));
        assert_eq!(product.title(), Some("Samsung 60inch TV"));

        // and the other way around
        let product = store.get_product(&RecordId::from("1")).unwrap();
        assert_eq!(product.id, RecordId::from(1));
    }

    #[test]
    fn zero_padded_id_does_not_match() {
        let store = seeded();
        let err = store.get_product(&RecordId::from("03")).unwrap_err();
        assert!(matches!(err, StoreError::NotFound { .. }));
    }

    #[test]
    fn search_led_returns_led_displays() {
        let store = seeded();
        let results = store.search_products("led");
        assert_eq!(results.len(), 2);
        assert!(results.iter().all(|p| p.kind() == Some("led display")));
        let ids: Vec<String> = results.iter().map(|p| p.id.key()).collect();
        assert_eq!(ids, vec!["1", "2"]);
    }

    #[test]
    fn search_is_case_insensitive_across_fields() {
        let store = seeded();
        assert_eq!(store.search_products("SAMSUNG").len(), 1);
        assert_eq!(store.search_products("4k uhd").len(), 1);
        assert_eq!(store.search_products("3840hz").len(), 2);
        assert!(store.search_products("projector").is_empty());
    }

    #[test]
    fn empty_search_matches_everything() {
        let store = seeded();
        assert_eq!(store.search_products(""), store.list_products());
    }

    #[tokio::test]
    async fn order_status_is_forced_to_pending() {
        let mut store = seeded();
        let order = store
            .create_order(fields(json!({ "customer": "Ana", "productId": 1, "status": "confirmed" })))
            .await
            .value;

        assert_eq!(order.status, crate::models::OrderStatus::Pending);
        assert_eq!(order.get("customer"), Some(&json!("Ana")));
        assert!(order.created_at().is_some());
        assert_eq!(store.list_orders(), vec![order]);
    }

    #[tokio::test]
    async fn order_may_reference_unknown_product() {
        let mut store = seeded();
        let created = store.create_order(fields(json!({ "productId": 999 }))).await;
        assert_eq!(created.value.get("productId"), Some(&json!(999)));
    }

    #[test]
    fn duplicate_ids_are_rejected_on_load() {
        let document: CatalogDocument = serde_json::from_value(json!({
            "products": [ { "id": 3 }, { "id": "3" } ]
        }))
        .unwrap();
        let err = CatalogStore::in_memory(document).unwrap_err();
        assert!(matches!(err, StoreError::Validation(_)));
    }

    // ── Persistence ───────────────────────────────────────────────────────────

    #[tokio::test]
    async fn open_missing_file_writes_seed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("db.json");

        let store = CatalogStore::open(&path).await.unwrap();
        assert!(store.is_persistent());
        assert_eq!(store.product_count(), 3);
        assert!(path.exists());
    }

    #[tokio::test]
    async fn mutations_survive_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("db.json");

        let mut store = CatalogStore::open(&path).await.unwrap();
        let created = store
            .create_product(fields(json!({ "title": "Fog Machine", "type": "effects" })))
            .await;
        assert!(matches!(created.flush, FlushOutcome::Persisted));
        store
            .update_product(&RecordId::from(1), fields(json!({ "rent": 200 })))
            .await
            .unwrap();
        store.delete_product(&RecordId::from(2)).await.unwrap();
        store.create_order(fields(json!({ "customer": "Ana" }))).await;

        let reloaded = CatalogStore::open(&path).await.unwrap();
        assert_eq!(reloaded.snapshot(), store.snapshot());
        let ids: Vec<String> = reloaded.list_products().iter().map(|p| p.id.key()).collect();
        assert_eq!(ids, vec!["1".to_string(), "3".to_string(), created.value.id.key()]);
    }

    #[tokio::test]
    async fn loose_values_in_file_load_and_survive_a_flush() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("db.json");
        std::fs::write(
            &path,
            r#"{
  "products": [
    { "id": 1, "title": "Upad IV", "rent": "100000", "image": null, "createdAt": "2024-05-01T10:00:00.000Z" },
    { "id": 2, "title": "Uslim III", "createdAt": "2024-05-01T17:00:00.000+07:00" },
    { "id": 3, "title": "Old import", "createdAt": "yesterday" }
  ],
  "orders": [
    { "id": 9, "status": "pending", "createdAt": "2024-05-01T10:00:00.000Z", "customer": "Ana" }
  ]
}"#,
        )
        .unwrap();

        let mut store = CatalogStore::open(&path).await.unwrap();
        assert_eq!(store.get_product(&RecordId::from(1)).unwrap().rent(), Some(&json!("100000")));

        let flushed = store
            .update_product(&RecordId::from(2), Fields::new())
            .await
            .unwrap();
        assert!(matches!(flushed.flush, FlushOutcome::Persisted));

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains(r#""createdAt": "2024-05-01T10:00:00.000Z""#));
        assert!(text.contains(r#""createdAt": "2024-05-01T17:00:00.000+07:00""#));
        assert!(text.contains(r#""createdAt": "yesterday""#));
        assert!(text.contains(r#""rent": "100000""#));
        assert!(text.contains(r#""image": null"#));

        let reloaded = CatalogStore::open(&path).await.unwrap();
        assert_eq!(reloaded.snapshot(), store.snapshot());
    }

    #[tokio::test]
    async fn open_refuses_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("db.json");
        std::fs::write(&path, "[1, 2").unwrap();

        let err = CatalogStore::open(&path).await.unwrap_err();
        assert!(matches!(err, StoreError::Persistence { .. }));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "[1, 2");
    }

    #[tokio::test]
    async fn failed_flush_keeps_in_memory_change() {
        let dir = tempfile::tempdir().unwrap();
        // the target is a directory, so the final rename fails
        let file = JsonFile::new(dir.path());
        let mut store = CatalogStore::from_document(seed::seed_catalog(), Some(file)).unwrap();

        let created = store
            .create_product(fields(json!({ "title": "Truss" })))
            .await;
        assert!(created.flush.is_failed());
        let id = created.value.id.clone();

        let err = created.into_result().unwrap_err();
        assert!(matches!(err, StoreError::Persistence { .. }));
        assert_eq!(store.get_product(&id).unwrap().title(), Some("Truss"));

        // still usable afterwards
        assert_eq!(store.search_products("truss").len(), 1);
    }
}
