//! Rental catalog API: products and orders kept in an owned in-memory store,
//! optionally mirrored to a JSON file, served over axum.

pub mod config;
pub mod error;
pub mod handlers;
pub mod models;
pub mod seed;
pub mod store;

use std::sync::Arc;

use axum::{
    handler::HandlerWithoutStateExt,
    http::{header, HeaderValue, Method},
    routing::get,
    Router,
};
use tokio::sync::RwLock;
use tower::ServiceBuilder;
use tower_http::{
    cors::CorsLayer,
    services::ServeDir,
    trace::TraceLayer,
};
use tracing::warn;

use crate::config::Config;
use crate::store::CatalogStore;

/// Shared application state — cheap to clone (the store sits behind an Arc).
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<RwLock<CatalogStore>>,
}

impl AppState {
    pub fn new(store: CatalogStore) -> Self {
        Self {
            store: Arc::new(RwLock::new(store)),
        }
    }
}

pub fn build_router(state: AppState, config: &Config) -> Router {
    use handlers::{orders, products};

    let api = Router::new()
        .route("/health", get(handlers::health))
        // ── Products ────────────────────────────────────────────────────────
        .route(
            "/products",
            get(products::list_products).post(products::create_product),
        )
        .route("/products/search", get(products::search_products_by_param))
        .route("/products/search/:query", get(products::search_products))
        .route(
            "/products/:id",
            get(products::get_product)
                .put(products::update_product)
                .delete(products::delete_product),
        )
        // ── Orders ──────────────────────────────────────────────────────────
        .route(
            "/orders",
            get(orders::list_orders).post(orders::create_order),
        );

    // Static assets (uploads, gallery, ...) with the JSON 404 behind them
    let assets = ServeDir::new(&config.public_dir)
        .call_fallback_on_method_not_allowed(true)
        .not_found_service(handlers::not_found.into_service());

    Router::new()
        .route("/", get(handlers::index))
        .route("/health", get(handlers::health))
        .nest("/api", api)
        .fallback_service(assets)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors_layer(config.cors_origin.as_deref())),
        )
        .with_state(state)
}

fn cors_layer(origin: Option<&str>) -> CorsLayer {
    let Some(origin) = origin else {
        return CorsLayer::permissive();
    };

    match HeaderValue::from_str(origin) {
        Ok(origin) => CorsLayer::new()
            .allow_origin(origin)
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PUT,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]),
        Err(_) => {
            warn!(origin, "CORS_ORIGIN is not a valid header value; allowing any origin");
            CorsLayer::permissive()
        }
    }
}
