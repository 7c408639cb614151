//! Checkout saga for the storefront.
//!
//! `OrderOrchestrator::place_order` turns a user's cart into a placed
//! order in eight sequential stages:
//! 1. Fetch the cart
//! 2. Price each line from the catalog (USD)
//! 3. Quote shipping (USD)
//! 4. Convert every cost into the user's currency
//! 5. Charge the card for the grand total
//! 6. Ship the order
//! 7. Empty the cart (best effort)
//! 8. Send the confirmation (in the background)
//!
//! No compensation runs. A failure after step 5 reports the committed
//! transaction id alongside the error.

pub mod error;
pub mod events;
pub mod journal;
pub mod orchestrator;
pub mod record;
pub mod services;
pub mod stages;
pub mod state;

pub use error::{CheckoutError, Result, ServiceError, StageError};
pub use events::CheckoutEvent;
pub use journal::{DEFAULT_JOURNAL_CAPACITY, OrderJournal};
pub use orchestrator::{CheckoutConfig, DEFAULT_CALL_TIMEOUT, OrderOrchestrator, PlacedOrder};
pub use record::CheckoutRecord;
pub use services::{
    CardBrand, CatalogService, HttpCatalogClient, HttpPaymentClient, HttpShippingClient,
    InMemoryCatalogService, InMemoryNotificationService, InMemoryPaymentService,
    InMemoryShippingService, LoggingNotificationService, NotificationService, PaymentResult,
    PaymentService, ShipmentResult, ShippingService,
};
pub use stages::Stage;
pub use state::OrderState;
