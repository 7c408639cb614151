//! Shopping cart value types.

use common::{ProductId, UserId};
use serde::{Deserialize, Serialize};

/// One product line in a cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    pub product_id: ProductId,
    pub quantity: u32,
}

impl CartItem {
    pub fn new(product_id: impl Into<ProductId>, quantity: u32) -> Self {
        Self {
            product_id: product_id.into(),
            quantity,
        }
    }
}

/// A user's cart: product-unique lines in the order they were first added.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cart {
    pub user_id: UserId,
    pub items: Vec<CartItem>,
}

impl Cart {
    /// An empty cart for `user_id`.
    pub fn empty(user_id: UserId) -> Self {
        Self {
            user_id,
            items: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Total number of units across all lines.
    pub fn item_count(&self) -> u64 {
        self.items.iter().map(|i| u64::from(i.quantity)).sum()
    }

    pub fn quantity_of(&self, product_id: &ProductId) -> Option<u32> {
        self.items
            .iter()
            .find(|i| &i.product_id == product_id)
            .map(|i| i.quantity)
    }

    /// Adds `quantity` of a product, incrementing an existing line in place.
    ///
    /// Returns the line's new quantity, or `None` if it would overflow.
    pub fn merge_item(&mut self, product_id: &ProductId, quantity: u32) -> Option<u32> {
        match self.items.iter_mut().find(|i| &i.product_id == product_id) {
            Some(line) => {
                line.quantity = line.quantity.checked_add(quantity)?;
                Some(line.quantity)
            }
            None => {
                self.items.push(CartItem {
                    product_id: product_id.clone(),
                    quantity,
                });
                Some(quantity)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_increments_existing_line_and_keeps_order() {
        let mut cart = Cart::empty(UserId::from("u1"));
        cart.merge_item(&ProductId::from("A"), 1);
        cart.merge_item(&ProductId::from("B"), 2);
        assert_eq!(cart.merge_item(&ProductId::from("A"), 4), Some(5));

        let ids: Vec<&str> = cart.items.iter().map(|i| i.product_id.as_str()).collect();
        assert_eq!(ids, ["A", "B"]);
        assert_eq!(cart.quantity_of(&ProductId::from("A")), Some(5));
        assert_eq!(cart.item_count(), 7);
    }

    #[test]
    fn test_merge_overflow_leaves_line_untouched() {
        let mut cart = Cart::empty(UserId::from("u1"));
        cart.merge_item(&ProductId::from("A"), u32::MAX);
        assert_eq!(cart.merge_item(&ProductId::from("A"), 1), None);
        assert_eq!(cart.quantity_of(&ProductId::from("A")), Some(u32::MAX));
    }
}
