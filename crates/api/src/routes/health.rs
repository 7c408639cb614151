//! Health check endpoint.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use serde::Serialize;

use crate::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub cart_store: &'static str,
}

/// GET /health — returns system health status, 503 if the cart store is down.
pub async fn check(State(state): State<Arc<AppState>>) -> (StatusCode, Json<HealthResponse>) {
    let healthy = state.cart.ping().await;
    let (status, label) = if healthy {
        (StatusCode::OK, "ok")
    } else {
        tracing::warn!(backend = state.cart.kind(), "cart store ping failed");
        (StatusCode::SERVICE_UNAVAILABLE, "degraded")
    };

    (
        status,
        Json(HealthResponse {
            status: label,
            cart_store: state.cart.kind(),
        }),
    )
}
