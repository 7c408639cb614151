//! HTTP route handlers.

pub mod cart;
pub mod checkout;
pub mod currency;
pub mod health;
pub mod metrics;
pub mod orders;
