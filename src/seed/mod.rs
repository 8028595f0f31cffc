use serde_json::Value;

use crate::models::{CatalogDocument, Fields, Product, RecordId};

/// Products the catalog starts with when there is no backing file yet.
/// The third id is deliberately a string: real data mixes both forms.
pub fn seed_products() -> Vec<Product> {
    vec![
        product(
            RecordId::from(1),
            "Upad IV Unilumin",
            "led display",
            "P3.9, 500x500mm, 1920Hz, 5500nits, 3840Hz",
            100_000,
            "https://events-be-indol.vercel.app/uploads/upadIV.webp",
        ),
        product(
            RecordId::from(2),
            "Uslim III Unilumin",
            "led display",
            "P2.5, 500x1000mm, 1920Hz, 7500nits, 3840Hz",
            150_000,
            "https://events-be-indol.vercel.app/uploads/uslimIII.webp",
        ),
        product(
            RecordId::from("3"),
            "Samsung 60inch TV",
            "tv",
            "60inch, 4K UHD, Smart TV",
            50_000,
            "https://events-be-indol.vercel.app/uploads/tv60.jpg",
        ),
    ]
}

pub fn seed_catalog() -> CatalogDocument {
    CatalogDocument {
        products: seed_products(),
        orders: Vec::new(),
    }
}

fn product(id: RecordId, title: &str, kind: &str, specifications: &str, rent: u64, image: &str) -> Product {
    let mut fields = Fields::new();
    fields.insert("title".to_string(), Value::from(title));
    fields.insert("type".to_string(), Value::from(kind));
    fields.insert("specifications".to_string(), Value::from(specifications));
    fields.insert("rent".to_string(), Value::from(rent));
    fields.insert("image".to_string(), Value::from(image));
    Product { id, fields }
}
