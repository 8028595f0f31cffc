use std::time::Instant;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use serde_json::json;
use tracing::info;

use crate::{
    error::AppResult,
    handlers::JsonBody,
    models::{Fields, Product, RecordId},
    AppState,
};

#[derive(Debug, Deserialize, Default)]
pub struct SearchParams {
    #[serde(default)]
    pub q: String,
}

// ── List ──────────────────────────────────────────────────────────────────────

pub async fn list_products(
    State(state): State<AppState>,
) -> AppResult<(StatusCode, Json<Vec<Product>>)> {
    let products = state.store.read().await.list_products();

    info!(count = products.len(), "Listed products");

    Ok((StatusCode::OK, Json(products)))
}

// ── Create ────────────────────────────────────────────────────────────────────

pub async fn create_product(
    State(state): State<AppState>,
    JsonBody(fields): JsonBody<Fields>,
) -> AppResult<(StatusCode, Json<Product>)> {
    let start = Instant::now();
    let mut store = state.store.write().await;
    let mutation = store.create_product(fields).await;
    drop(store);

    info!(
        id = %mutation.value.id,
        flushed = !mutation.flush.is_failed(),
        elapsed_ms = start.elapsed().as_millis(),
        "Created product"
    );

    Ok((StatusCode::CREATED, Json(mutation.value)))
}

// ── Get by ID ─────────────────────────────────────────────────────────────────

pub async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<(StatusCode, Json<Product>)> {
    let id = RecordId::from(id);
    let product = state.store.read().await.get_product(&id)?.clone();

    info!(id = %id, "Fetched product");

    Ok((StatusCode::OK, Json(product)))
}

// ── Update ────────────────────────────────────────────────────────────────────

pub async fn update_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
    JsonBody(patch): JsonBody<Fields>,
) -> AppResult<(StatusCode, Json<Product>)> {
    let id = RecordId::from(id);
    let start = Instant::now();
    let mut store = state.store.write().await;
    let mutation = store.update_product(&id, patch).await?;
    drop(store);

    info!(
        id = %id,
        flushed = !mutation.flush.is_failed(),
        elapsed_ms = start.elapsed().as_millis(),
        "Updated product"
    );

    Ok((StatusCode::OK, Json(mutation.value)))
}

// ── Delete ────────────────────────────────────────────────────────────────────

pub async fn delete_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<(StatusCode, Json<serde_json::Value>)> {
    let id = RecordId::from(id);
    let mut store = state.store.write().await;
    let mutation = store.delete_product(&id).await?;
    drop(store);

    info!(id = %mutation.value.id, flushed = !mutation.flush.is_failed(), "Deleted product");

    Ok((
        StatusCode::OK,
        Json(json!({
            "success": true,
            "message": "Product deleted",
        })),
    ))
}

// ── Search ────────────────────────────────────────────────────────────────────

/// `GET /api/products/search/:query`
pub async fn search_products(
    State(state): State<AppState>,
    Path(query): Path<String>,
) -> AppResult<(StatusCode, Json<Vec<Product>>)> {
    run_search(&state, &query).await
}

/// `GET /api/products/search?q=` — same as above, but an empty query is expressible.
pub async fn search_products_by_param(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> AppResult<(StatusCode, Json<Vec<Product>>)> {
    run_search(&state, &params.q).await
}

async fn run_search(state: &AppState, query: &str) -> AppResult<(StatusCode, Json<Vec<Product>>)> {
    let results = state.store.read().await.search_products(query);

    info!(query, count = results.len(), "Searched products");

    Ok((StatusCode::OK, Json(results)))
}
