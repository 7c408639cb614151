//! Checkout endpoint.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use checkout::PlacedOrder;
use domain::PlaceOrderRequest;

use crate::AppState;
use crate::error::ApiError;

/// POST /checkout — places an order for the user's cart.
///
/// If the client disconnects, the in-flight checkout is dropped between
/// collaborator calls.
pub async fn place_order(
    State(state): State<Arc<AppState>>,
    Json(request): Json<PlaceOrderRequest>,
) -> Result<(StatusCode, Json<PlacedOrder>), ApiError> {
    if request.user_id.as_str().trim().is_empty() {
        return Err(ApiError::BadRequest("user_id must not be empty".into()));
    }
    if !state.converter.is_supported(&request.user_currency) {
        return Err(ApiError::BadRequest(format!(
            "unsupported currency '{}'",
            request.user_currency
        )));
    }

    let placed = state.orchestrator.place_order(request).await?;
    Ok((StatusCode::CREATED, Json(placed)))
}
