//! Prometheus recorder setup and the scrape endpoint.

use axum::extract::State;
use axum::http::{StatusCode, header};
use axum::response::IntoResponse;
use metrics::Unit;
use metrics_exporter_prometheus::{BuildError, Matcher, PrometheusBuilder, PrometheusHandle};

/// Buckets for `checkout_duration_seconds`; a checkout makes up to seven
/// sequential remote calls.
const CHECKOUT_DURATION_BUCKETS: &[f64] = &[0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0];

/// Installs the global recorder and registers metric descriptions.
///
/// Fails if a recorder is already installed in this process.
pub fn install_recorder() -> Result<PrometheusHandle, BuildError> {
    let handle = PrometheusBuilder::new()
        .set_buckets_for_metric(
            Matcher::Full("checkout_duration_seconds".to_string()),
            CHECKOUT_DURATION_BUCKETS,
        )?
        .install_recorder()?;
    describe();
    Ok(handle)
}

fn describe() {
    metrics::describe_counter!("checkout_orders_total", "Checkouts started");
    metrics::describe_counter!("checkout_orders_completed", "Checkouts that shipped");
    metrics::describe_counter!(
        "checkout_orders_failed",
        "Checkouts aborted, labelled by the failing stage"
    );
    metrics::describe_counter!(
        "checkout_stage_warnings_total",
        "Best-effort stage failures after shipment"
    );
    metrics::describe_histogram!(
        "checkout_duration_seconds",
        Unit::Seconds,
        "Wall time of a checkout"
    );
    metrics::describe_counter!("cart_add_item_total", "Cart lines added, by backend");
    metrics::describe_counter!("cart_empty_total", "Carts emptied, by backend");
}

/// GET /metrics — Prometheus text exposition.
pub async fn get(State(handle): State<PrometheusHandle>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4; charset=utf-8")],
        handle.render(),
    )
}
