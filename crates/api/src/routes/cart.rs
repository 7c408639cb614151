//! Cart endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use cart_store::CartStore;
use common::{ProductId, UserId};
use domain::Cart;
use serde::Deserialize;

use crate::AppState;
use crate::error::ApiError;

#[derive(Deserialize)]
pub struct AddItemRequest {
    pub product_id: String,
    pub quantity: u32,
}

/// POST /cart/{user_id}/items — adds quantity of a product to the cart.
pub async fn add_item(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
    Json(body): Json<AddItemRequest>,
) -> Result<StatusCode, ApiError> {
    if body.product_id.trim().is_empty() {
        return Err(ApiError::BadRequest("product_id must not be empty".into()));
    }

    state
        .cart
        .add_item(
            &UserId::from(user_id),
            &ProductId::from(body.product_id),
            body.quantity,
        )
        .await?;
    tracing::debug!("cart item added");

    Ok(StatusCode::NO_CONTENT)
}

/// GET /cart/{user_id} — returns the cart, empty for unknown users.
pub async fn get(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
) -> Result<Json<Cart>, ApiError> {
    let cart = state.cart.get_cart(&UserId::from(user_id)).await?;
    Ok(Json(cart))
}

/// DELETE /cart/{user_id} — removes every line from the cart.
pub async fn empty(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.cart.empty_cart(&UserId::from(user_id)).await?;
    Ok(StatusCode::NO_CONTENT)
}
