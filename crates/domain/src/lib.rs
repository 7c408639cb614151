//! Domain layer for the checkout system.
//!
//! This crate provides:
//! - `Money`, an exact fixed-point amount (units + nanos)
//! - `RateTable` and `CurrencyConverter` for cross-currency conversion
//! - cart, product and order value types shared by the store and the saga

pub mod cart;
pub mod currency;
pub mod error;
pub mod money;
pub mod order;
pub mod product;

pub use cart::{Cart, CartItem};
pub use common::{OrderId, ProductId, UserId};
pub use currency::{CurrencyConverter, REFERENCE_RATES_JSON, RateTable};
pub use error::{MoneyError, RateTableError, Result};
pub use money::{Money, NANOS_PER_UNIT};
pub use order::{Address, CreditCardInfo, OrderItem, OrderResult, PlaceOrderRequest};
pub use product::Product;
