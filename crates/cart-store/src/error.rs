use common::ProductId;
use thiserror::Error;

/// Errors that can occur when interacting with the cart store.
#[derive(Debug, Error)]
pub enum CartStoreError {
    /// The quantity is zero, or merging it would overflow the line.
    #[error("Invalid quantity {quantity} for product {product_id}")]
    InvalidQuantity { product_id: ProductId, quantity: u32 },

    /// A database error occurred.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// The backing store could not be reached.
    #[error("Cart store unavailable: {0}")]
    Unavailable(String),

    /// A database migration error occurred.
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// The store configuration is incomplete or malformed.
    #[error("Invalid cart store configuration: {0}")]
    Config(String),
}

impl CartStoreError {
    /// True for failures of the backing service rather than of the request.
    pub fn is_unavailable(&self) -> bool {
        matches!(
            self,
            Self::Database(_) | Self::Migration(_) | Self::Unavailable(_)
        )
    }
}

/// Result type for cart store operations.
pub type Result<T> = std::result::Result<T, CartStoreError>;
