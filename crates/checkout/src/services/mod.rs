//! Collaborator traits, in-memory implementations and HTTP clients.

pub mod card;
pub mod catalog;
pub mod http;
pub mod notification;
pub mod payment;
pub mod shipping;

pub use card::{CardBrand, validate_card};
pub use catalog::{CatalogService, InMemoryCatalogService, REFERENCE_PRODUCTS_JSON};
pub use http::{HttpCatalogClient, HttpPaymentClient, HttpShippingClient};
pub use notification::{
    InMemoryNotificationService, LoggingNotificationService, NotificationService,
};
pub use payment::{InMemoryPaymentService, PaymentResult, PaymentService};
pub use shipping::{InMemoryShippingService, ShipmentResult, ShippingService};
