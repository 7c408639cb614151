//! Shared application state and its construction from configuration.

use std::sync::Arc;

use cart_store::{CartBackend, CartStoreConfig, CartStoreError};
use checkout::{
    CatalogService, CheckoutConfig, HttpCatalogClient, HttpPaymentClient, HttpShippingClient,
    InMemoryCatalogService, InMemoryPaymentService, InMemoryShippingService,
    LoggingNotificationService, NotificationService, OrderJournal, OrderOrchestrator, PaymentService,
    ServiceError, ShippingService,
};
use domain::{CurrencyConverter, RateTable, RateTableError};
use thiserror::Error;

use crate::config::Config;

/// The orchestrator as wired by the server: collaborators are chosen at
/// startup, so they sit behind trait objects.
pub type Orchestrator = OrderOrchestrator<
    CartBackend,
    Arc<dyn CatalogService>,
    Arc<dyn ShippingService>,
    Arc<dyn PaymentService>,
    Arc<dyn NotificationService>,
>;

/// Errors raised while assembling the application.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("failed to load currency rates: {0}")]
    Rates(#[from] RateTableError),

    #[error("failed to open cart store: {0}")]
    CartStore(#[from] CartStoreError),

    #[error("failed to build service client: {0}")]
    Client(#[from] ServiceError),

    #[error("failed to load product catalog: {0}")]
    Catalog(#[from] serde_json::Error),
}

/// Shared application state accessible from all handlers.
pub struct AppState {
    pub cart: CartBackend,
    pub converter: CurrencyConverter,
    pub orchestrator: Orchestrator,
}

impl AppState {
    pub fn new(cart: CartBackend, converter: CurrencyConverter, orchestrator: Orchestrator) -> Self {
        Self {
            cart,
            converter,
            orchestrator,
        }
    }

    /// Builds the state described by `config`: opens the cart store,
    /// loads the rate table and picks HTTP or in-memory collaborators.
    pub async fn from_config(config: &Config) -> Result<Self, StartupError> {
        let rates = match &config.currency_rates_path {
            Some(path) => {
                tracing::info!(path = %path.display(), "loading currency rates");
                RateTable::from_path(path)?
            }
            None => RateTable::reference()?,
        };
        let converter = CurrencyConverter::new(rates);
        tracing::info!(
            currencies = converter.rates().len(),
            base = converter.base_currency().unwrap_or("-"),
            "currency rates loaded"
        );

        let cart = CartBackend::connect(&config.cart_store).await?;

        let catalog: Arc<dyn CatalogService> = match &config.catalog_url {
            Some(url) => Arc::new(HttpCatalogClient::new(url, config.call_timeout)?),
            None => Arc::new(InMemoryCatalogService::reference()?),
        };
        let shipping: Arc<dyn ShippingService> = match &config.shipping_url {
            Some(url) => Arc::new(HttpShippingClient::new(url, config.call_timeout)?),
            None => Arc::new(InMemoryShippingService::new()),
        };
        let payment: Arc<dyn PaymentService> = match &config.payment_url {
            Some(url) => Arc::new(HttpPaymentClient::new(url, config.call_timeout)?),
            None => Arc::new(InMemoryPaymentService::new()),
        };
        tracing::info!(
            catalog = remote_or_local(&config.catalog_url),
            shipping = remote_or_local(&config.shipping_url),
            payment = remote_or_local(&config.payment_url),
            "collaborators configured"
        );

        let orchestrator = OrderOrchestrator::new(
            cart.clone(),
            catalog,
            shipping,
            payment,
            Arc::new(LoggingNotificationService) as Arc<dyn NotificationService>,
            converter.clone(),
        )
        .with_config(CheckoutConfig {
            call_timeout: config.call_timeout,
        })
        .with_journal(OrderJournal::with_capacity(config.journal_capacity));

        Ok(Self::new(cart, converter, orchestrator))
    }

    /// In-memory everything, with the reference rates and catalog.
    pub async fn in_memory() -> Result<Self, StartupError> {
        Self::from_config(&Config {
            cart_store: CartStoreConfig::InMemory,
            ..Config::default()
        })
        .await
    }
}

fn remote_or_local(url: &Option<String>) -> &'static str {
    if url.is_some() { "http" } else { "in-memory" }
}
