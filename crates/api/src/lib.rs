//! HTTP API for the storefront checkout.
//!
//! Provides REST endpoints for carts, currency conversion, checkout and
//! order status, with structured logging (tracing) and Prometheus metrics.

pub mod config;
pub mod error;
pub mod routes;
pub mod state;

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub use state::{AppState, Orchestrator, StartupError};

/// Creates the Axum application router with all routes and shared state.
pub fn create_app(state: Arc<AppState>, metrics_handle: PrometheusHandle) -> Router {
    let metrics_router = Router::new()
        .route("/metrics", get(routes::metrics::get))
        .with_state(metrics_handle);

    Router::new()
        .route("/health", get(routes::health::check))
        .route(
            "/cart/{user_id}",
            get(routes::cart::get).delete(routes::cart::empty),
        )
        .route("/cart/{user_id}/items", post(routes::cart::add_item))
        .route("/currencies", get(routes::currency::list))
        .route("/currencies/convert", post(routes::currency::convert))
        .route("/checkout", post(routes::checkout::place_order))
        .route("/orders/{id}", get(routes::orders::get))
        .with_state(state)
        .merge(metrics_router)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}
