//! API error types with HTTP response mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use cart_store::CartStoreError;
use checkout::{CheckoutError, ServiceError, StageError};
use domain::MoneyError;
use serde_json::{Value, json};

/// API-level error type that maps to HTTP responses.
#[derive(Debug)]
pub enum ApiError {
    /// Resource not found.
    NotFound(String),
    /// Bad request from the client.
    BadRequest(String),
    /// Cart store error.
    Cart(CartStoreError),
    /// Money or conversion error.
    Money(MoneyError),
    /// Checkout failed.
    Checkout(CheckoutError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, json!({ "error": msg })),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, json!({ "error": msg })),
            ApiError::Cart(err) => cart_error_to_response(err),
            ApiError::Money(err) => (money_status(&err), json!({ "error": err.to_string() })),
            ApiError::Checkout(err) => checkout_error_to_response(err),
        };

        (status, axum::Json(body)).into_response()
    }
}

fn cart_error_to_response(err: CartStoreError) -> (StatusCode, Value) {
    match &err {
        CartStoreError::InvalidQuantity { .. } => {
            (StatusCode::BAD_REQUEST, json!({ "error": err.to_string() }))
        }
        _ if err.is_unavailable() => {
            tracing::error!(error = %err, "cart store unavailable");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                json!({ "error": "cart storage unavailable" }),
            )
        }
        _ => {
            tracing::error!(error = %err, "internal server error");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({ "error": "internal server error" }),
            )
        }
    }
}

fn money_status(err: &MoneyError) -> StatusCode {
    match err {
        MoneyError::UnsupportedCurrency(_)
        | MoneyError::CurrencyMismatch { .. }
        | MoneyError::NotNormalized { .. } => StatusCode::BAD_REQUEST,
        MoneyError::Overflow => StatusCode::UNPROCESSABLE_ENTITY,
    }
}

fn service_status(err: &ServiceError) -> StatusCode {
    match err {
        ServiceError::Unavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
        ServiceError::ProductNotFound(_) => StatusCode::NOT_FOUND,
        ServiceError::InvalidCreditCard
        | ServiceError::UnacceptedCardBrand(_)
        | ServiceError::ExpiredCreditCard { .. } => StatusCode::UNPROCESSABLE_ENTITY,
    }
}

/// A failure after the charge is a 502 that carries the transaction id,
/// so the client knows money was taken.
fn checkout_error_to_response(err: CheckoutError) -> (StatusCode, Value) {
    let charged = err.committed_charge().is_some();
    let status = if charged {
        StatusCode::BAD_GATEWAY
    } else {
        match err.cause() {
            StageError::Service(service) => service_status(service),
            StageError::Money(money) => money_status(money),
        }
    };

    let body = json!({
        "error": err.cause().to_string(),
        "order_id": err.order_id(),
        "stage": err.stage(),
        "charged": charged,
        "transaction_id": err.committed_charge(),
    });
    (status, body)
}

impl From<CartStoreError> for ApiError {
    fn from(err: CartStoreError) -> Self {
        ApiError::Cart(err)
    }
}

impl From<MoneyError> for ApiError {
    fn from(err: MoneyError) -> Self {
        ApiError::Money(err)
    }
}

impl From<CheckoutError> for ApiError {
    fn from(err: CheckoutError) -> Self {
        ApiError::Checkout(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::{OrderId, ProductId};

    fn failed(stage: checkout::Stage, transaction_id: Option<&str>, source: StageError) -> ApiError {
        ApiError::Checkout(CheckoutError::OrderFailed {
            order_id: OrderId::new(),
            stage,
            transaction_id: transaction_id.map(str::to_string),
            source,
        })
    }

    #[test]
    fn test_status_mapping() {
        use checkout::Stage;

        let cases = [
            (
                failed(Stage::ChargeCard, None, ServiceError::InvalidCreditCard.into()),
                StatusCode::UNPROCESSABLE_ENTITY,
            ),
            (
                failed(
                    Stage::PriceItems,
                    None,
                    ServiceError::ProductNotFound(ProductId::from("X")).into(),
                ),
                StatusCode::NOT_FOUND,
            ),
            (
                failed(
                    Stage::QuoteShipping,
                    None,
                    ServiceError::unavailable("shipping", "down").into(),
                ),
                StatusCode::SERVICE_UNAVAILABLE,
            ),
            (
                failed(
                    Stage::ConvertCurrency,
                    None,
                    MoneyError::UnsupportedCurrency("XYZ".into()).into(),
                ),
                StatusCode::BAD_REQUEST,
            ),
            (
                failed(
                    Stage::ShipOrder,
                    Some("tx-1"),
                    ServiceError::unavailable("shipping", "down").into(),
                ),
                StatusCode::BAD_GATEWAY,
            ),
            (
                ApiError::Cart(CartStoreError::InvalidQuantity {
                    product_id: ProductId::from("X"),
                    quantity: 0,
                }),
                StatusCode::BAD_REQUEST,
            ),
            (ApiError::Money(MoneyError::Overflow), StatusCode::UNPROCESSABLE_ENTITY),
        ];

        for (error, expected) in cases {
            assert_eq!(error.into_response().status(), expected);
        }
    }
}
