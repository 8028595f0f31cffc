pub mod orders;
pub mod products;

use axum::{
    extract::{FromRequest, State},
    http::{StatusCode, Uri},
    Json,
};
use chrono::{SecondsFormat, Utc};
use serde_json::{json, Value};

use crate::{error::AppError, AppState};

pub const SERVICE_NAME: &str = "gandrung-events-api";

/// `Json` extractor whose rejections (missing content type, malformed or
/// non-object body) come back as `{ "error": ... }` like every other failure.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct JsonBody<T>(pub T);

const AVAILABLE_ENDPOINTS: &[&str] = &["/", "/api/products", "/api/orders", "/api/health"];

/// `GET /` — what this API offers.
pub async fn index() -> Json<Value> {
    Json(json!({
        "message": "Gandrung Events API is running!",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "products": {
                "getAll": "GET /api/products",
                "getById": "GET /api/products/:id",
                "search": "GET /api/products/search/:query",
                "create": "POST /api/products",
                "update": "PUT /api/products/:id",
                "delete": "DELETE /api/products/:id"
            },
            "orders": {
                "getAll": "GET /api/orders",
                "create": "POST /api/orders"
            },
            "health": "GET /api/health"
        }
    }))
}

pub async fn health(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    let store = state.store.read().await;
    (
        StatusCode::OK,
        Json(json!({
            "status": "healthy",
            "timestamp": Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            "service": SERVICE_NAME,
            "persistent": store.is_persistent(),
            "products": store.product_count(),
            "orders": store.order_count(),
        })),
    )
}

/// Anything no route or static file answered.
pub async fn not_found(uri: Uri) -> (StatusCode, Json<Value>) {
    (
        StatusCode::NOT_FOUND,
        Json(json!({
            "error": "Endpoint not found",
            "requested": uri.to_string(),
            "availableEndpoints": AVAILABLE_ENDPOINTS,
        })),
    )
}
