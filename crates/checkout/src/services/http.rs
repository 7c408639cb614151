//! JSON-over-HTTP clients for remote catalog, shipping and payment services.
//!
//! Endpoints, relative to each service's base URL:
//!
//! | Service  | Request                | Success body                  |
//! |----------|------------------------|-------------------------------|
//! | catalog  | `GET /products/{id}`   | `Product`                     |
//! | shipping | `POST /quote`          | `{"cost_usd": Money}`         |
//! | shipping | `POST /ship`           | `{"tracking_id": "..."}`      |
//! | payment  | `POST /charge`         | `{"transaction_id": "..."}`   |
//!
//! Error reasons never include the URL.

use std::time::Duration;

use async_trait::async_trait;
use common::ProductId;
use domain::{Address, CartItem, CreditCardInfo, Money, Product};
use reqwest::{Client, Response, StatusCode};
use serde::{Deserialize, Serialize, de::DeserializeOwned};

use crate::error::ServiceError;
use crate::services::{
    CatalogService, PaymentResult, PaymentService, ShipmentResult, ShippingService,
};

/// Shared plumbing: one pooled client per remote service.
#[derive(Debug, Clone)]
struct ServiceClient {
    service: &'static str,
    client: Client,
    base_url: String,
}

impl ServiceClient {
    fn new(service: &'static str, base_url: &str, timeout: Duration) -> Result<Self, ServiceError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ServiceError::unavailable(service, format!("client setup failed: {}", describe(&e))))?;
        Ok(Self {
            service,
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn transport_error(&self, err: &reqwest::Error) -> ServiceError {
        tracing::warn!(service = self.service, error = %err, "remote call failed");
        ServiceError::unavailable(self.service, describe(err))
    }

    fn status_error(&self, status: StatusCode) -> ServiceError {
        ServiceError::unavailable(self.service, format!("unexpected status {}", status.as_u16()))
    }

    async fn post<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<Response, ServiceError> {
        self.client
            .post(self.url(path))
            .json(body)
            .send()
            .await
            .map_err(|e| self.transport_error(&e))
    }

    async fn decode<T: DeserializeOwned>(&self, response: Response) -> Result<T, ServiceError> {
        response.json().await.map_err(|e| self.transport_error(&e))
    }
}

/// Address-free description of a reqwest failure.
fn describe(err: &reqwest::Error) -> &'static str {
    if err.is_timeout() {
        "request timed out"
    } else if err.is_connect() {
        "connection failed"
    } else if err.is_decode() {
        "malformed response"
    } else if err.is_builder() {
        "invalid request"
    } else {
        "transport error"
    }
}

/// Catalog reached over HTTP.
#[derive(Debug, Clone)]
pub struct HttpCatalogClient {
    inner: ServiceClient,
}

impl HttpCatalogClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ServiceError> {
        Ok(Self {
            inner: ServiceClient::new("catalog", base_url, timeout)?,
        })
    }
}

#[async_trait]
impl CatalogService for HttpCatalogClient {
    #[tracing::instrument(skip(self), fields(service = "catalog"))]
    async fn get_product(&self, product_id: &ProductId) -> Result<Product, ServiceError> {
        let response = self
            .inner
            .client
            .get(self.inner.url(&format!("/products/{product_id}")))
            .send()
            .await
            .map_err(|e| self.inner.transport_error(&e))?;

        match response.status() {
            status if status.is_success() => self.inner.decode(response).await,
            StatusCode::NOT_FOUND => Err(ServiceError::ProductNotFound(product_id.clone())),
            status => Err(self.inner.status_error(status)),
        }
    }
}

#[derive(Serialize)]
struct ShipmentRequest<'a> {
    address: &'a Address,
    items: &'a [CartItem],
}

#[derive(Deserialize)]
struct QuoteResponse {
    cost_usd: Money,
}

#[derive(Deserialize)]
struct ShipResponse {
    tracking_id: String,
}

/// Shipping reached over HTTP.
#[derive(Debug, Clone)]
pub struct HttpShippingClient {
    inner: ServiceClient,
}

impl HttpShippingClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ServiceError> {
        Ok(Self {
            inner: ServiceClient::new("shipping", base_url, timeout)?,
        })
    }
}

#[async_trait]
impl ShippingService for HttpShippingClient {
    #[tracing::instrument(skip_all, fields(service = "shipping", items = items.len()))]
    async fn get_quote(
        &self,
        address: &Address,
        items: &[CartItem],
    ) -> Result<Money, ServiceError> {
        let response = self
            .inner
            .post("/quote", &ShipmentRequest { address, items })
            .await?;
        if !response.status().is_success() {
            return Err(self.inner.status_error(response.status()));
        }
        let quote: QuoteResponse = self.inner.decode(response).await?;
        Ok(quote.cost_usd)
    }

    #[tracing::instrument(skip_all, fields(service = "shipping", items = items.len()))]
    async fn ship_order(
        &self,
        address: &Address,
        items: &[CartItem],
    ) -> Result<ShipmentResult, ServiceError> {
        let response = self
            .inner
            .post("/ship", &ShipmentRequest { address, items })
            .await?;
        if !response.status().is_success() {
            return Err(self.inner.status_error(response.status()));
        }
        let shipped: ShipResponse = self.inner.decode(response).await?;
        Ok(ShipmentResult {
            tracking_id: shipped.tracking_id,
        })
    }
}

#[derive(Serialize)]
struct ChargeRequest<'a> {
    amount: &'a Money,
    credit_card: &'a CreditCardInfo,
}

#[derive(Deserialize)]
struct ChargeResponse {
    transaction_id: String,
}

/// Rejection body returned with a 4xx status.
#[derive(Deserialize)]
struct ChargeRejection {
    error: String,
    #[serde(default)]
    brand: Option<String>,
}

/// Payment reached over HTTP.
#[derive(Debug, Clone)]
pub struct HttpPaymentClient {
    inner: ServiceClient,
}

impl HttpPaymentClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ServiceError> {
        Ok(Self {
            inner: ServiceClient::new("payment", base_url, timeout)?,
        })
    }

    fn rejection(&self, body: ChargeRejection, card: &CreditCardInfo) -> ServiceError {
        match body.error.as_str() {
            "invalid_credit_card" => ServiceError::InvalidCreditCard,
            "unaccepted_card_brand" => {
                ServiceError::UnacceptedCardBrand(body.brand.unwrap_or_else(|| "unknown".into()))
            }
            "expired_credit_card" => ServiceError::ExpiredCreditCard {
                last_four: card.last_four(),
                month: card.credit_card_expiration_month,
                year: card.credit_card_expiration_year,
            },
            other => ServiceError::unavailable(
                self.inner.service,
                format!("unrecognised rejection '{other}'"),
            ),
        }
    }
}

#[async_trait]
impl PaymentService for HttpPaymentClient {
    #[tracing::instrument(skip_all, fields(service = "payment", amount = %amount))]
    async fn charge(
        &self,
        amount: &Money,
        card: &CreditCardInfo,
    ) -> Result<PaymentResult, ServiceError> {
        let response = self
            .inner
            .post(
                "/charge",
                &ChargeRequest {
                    amount,
                    credit_card: card,
                },
            )
            .await?;

        let status = response.status();
        if status.is_success() {
            let charged: ChargeResponse = self.inner.decode(response).await?;
            return Ok(PaymentResult {
                transaction_id: charged.transaction_id,
            });
        }
        if status.is_client_error() {
            let body: ChargeRejection = self.inner.decode(response).await?;
            return Err(self.rejection(body, card));
        }
        Err(self.inner.status_error(status))
    }
}
