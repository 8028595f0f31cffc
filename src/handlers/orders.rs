use axum::{extract::State, http::StatusCode, Json};
use tracing::info;

use crate::{
    error::AppResult,
    handlers::JsonBody,
    models::{Fields, Order},
    AppState,
};

pub async fn list_orders(State(state): State<AppState>) -> AppResult<(StatusCode, Json<Vec<Order>>)> {
    let orders = state.store.read().await.list_orders();

    info!(count = orders.len(), "Listed orders");

    Ok((StatusCode::OK, Json(orders)))
}

/// Orders always start `pending`; a caller-supplied status is dropped.
pub async fn create_order(
    State(state): State<AppState>,
    JsonBody(fields): JsonBody<Fields>,
) -> AppResult<(StatusCode, Json<Order>)> {
    let mut store = state.store.write().await;
    let mutation = store.create_order(fields).await;
    drop(store);

    info!(id = %mutation.value.id, flushed = !mutation.flush.is_failed(), "Created order");

    Ok((StatusCode::CREATED, Json(mutation.value)))
}
