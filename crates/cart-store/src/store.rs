use std::sync::Arc;

use async_trait::async_trait;
use common::{ProductId, UserId};
use domain::Cart;

use crate::Result;

/// Largest quantity a single cart line may hold on any backend; it is
/// the range of the relational `INTEGER` column.
pub const MAX_LINE_QUANTITY: u32 = i32::MAX as u32;

/// Core trait for cart store implementations.
///
/// Exactly three capabilities. Implementations must be thread-safe and
/// must not lose updates when `add_item` races for the same user.
#[async_trait]
pub trait CartStore: Send + Sync {
    /// Adds `quantity` units of a product to the user's cart.
    ///
    /// An existing line for the product is incremented; otherwise a new
    /// line is appended. The cart is created on first use. A zero quantity,
    /// or a line that would exceed [`MAX_LINE_QUANTITY`], fails with
    /// `InvalidQuantity` and leaves the cart unchanged.
    async fn add_item(&self, user_id: &UserId, product_id: &ProductId, quantity: u32)
    -> Result<()>;

    /// Returns the user's cart. Unknown users get an empty cart.
    async fn get_cart(&self, user_id: &UserId) -> Result<Cart>;

    /// Removes every line from the user's cart. Unknown users are a no-op.
    async fn empty_cart(&self, user_id: &UserId) -> Result<()>;
}

#[async_trait]
impl<T: CartStore + ?Sized> CartStore for Arc<T> {
    async fn add_item(
        &self,
        user_id: &UserId,
        product_id: &ProductId,
        quantity: u32,
    ) -> Result<()> {
        (**self).add_item(user_id, product_id, quantity).await
    }

    async fn get_cart(&self, user_id: &UserId) -> Result<Cart> {
        (**self).get_cart(user_id).await
    }

    async fn empty_cart(&self, user_id: &UserId) -> Result<()> {
        (**self).empty_cart(user_id).await
    }
}
