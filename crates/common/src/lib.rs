//! Identifier types shared by every crate of the checkout system.

mod types;

pub use types::{OrderId, ProductId, UserId};
