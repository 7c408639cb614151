//! Cart persistence for the checkout system.
//!
//! One `CartStore` trait with an in-memory and a PostgreSQL
//! implementation; `CartBackend` picks one at startup from
//! `CartStoreConfig`.

pub mod backend;
pub mod error;
pub mod memory;
pub mod postgres;
pub mod store;

pub use backend::{CartBackend, CartStoreConfig};
pub use error::{CartStoreError, Result};
pub use memory::InMemoryCartStore;
pub use postgres::PostgresCartStore;
pub use store::{CartStore, MAX_LINE_QUANTITY};
