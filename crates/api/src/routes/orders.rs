//! Order status endpoint.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use checkout::CheckoutRecord;
use common::OrderId;
use uuid::Uuid;

use crate::AppState;
use crate::error::ApiError;

/// GET /orders/{id} — returns the checkout record of an order.
pub async fn get(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<CheckoutRecord>, ApiError> {
    let uuid =
        Uuid::parse_str(&id).map_err(|_| ApiError::BadRequest(format!("Invalid order ID: {id}")))?;

    let record = state
        .orchestrator
        .get_order(OrderId::from_uuid(uuid))
        .await
        .ok_or_else(|| ApiError::NotFound(format!("Order not found: {id}")))?;

    Ok(Json(record))
}
