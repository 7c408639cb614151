use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use common::{ProductId, UserId};
use domain::Cart;
use tokio::sync::RwLock;

use crate::store::{CartStore, MAX_LINE_QUANTITY};
use crate::{CartStoreError, Result};

/// In-memory cart store for a single process.
///
/// A store-wide lock serializes writers, so concurrent `add_item` calls
/// for the same user never lose an increment.
#[derive(Clone, Default)]
pub struct InMemoryCartStore {
    carts: Arc<RwLock<HashMap<UserId, Cart>>>,
    fail_on_get: Arc<AtomicBool>,
    fail_on_empty: Arc<AtomicBool>,
}

impl InMemoryCartStore {
    /// Creates a new empty in-memory cart store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of users with a cart entry.
    pub async fn cart_count(&self) -> usize {
        self.carts.read().await.len()
    }

    /// Drops every cart.
    pub async fn clear(&self) {
        self.carts.write().await.clear();
    }

    /// Makes `get_cart` fail as if the store were unreachable.
    pub fn set_fail_on_get(&self, fail: bool) {
        self.fail_on_get.store(fail, Ordering::SeqCst);
    }

    /// Makes `empty_cart` fail as if the store were unreachable.
    pub fn set_fail_on_empty(&self, fail: bool) {
        self.fail_on_empty.store(fail, Ordering::SeqCst);
    }

    fn check(flag: &AtomicBool) -> Result<()> {
        if flag.load(Ordering::SeqCst) {
            return Err(CartStoreError::Unavailable("in-memory store offline".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl CartStore for InMemoryCartStore {
    #[tracing::instrument(skip(self))]
    async fn add_item(
        &self,
        user_id: &UserId,
        product_id: &ProductId,
        quantity: u32,
    ) -> Result<()> {
        let invalid = || CartStoreError::InvalidQuantity {
            product_id: product_id.clone(),
            quantity,
        };
        if quantity == 0 {
            return Err(invalid());
        }

        let mut carts = self.carts.write().await;
        let cart = carts
            .entry(user_id.clone())
            .or_insert_with(|| Cart::empty(user_id.clone()));
        let current = cart.quantity_of(product_id).unwrap_or(0);
        if current.checked_add(quantity).is_none_or(|q| q > MAX_LINE_QUANTITY) {
            return Err(invalid());
        }
        let new_quantity = cart.merge_item(product_id, quantity).ok_or_else(invalid)?;

        tracing::debug!(new_quantity, "cart line updated");
        Ok(())
    }

    #[tracing::instrument(skip(self))]
    async fn get_cart(&self, user_id: &UserId) -> Result<Cart> {
        Self::check(&self.fail_on_get)?;
        let carts = self.carts.read().await;
        Ok(carts
            .get(user_id)
            .cloned()
            .unwrap_or_else(|| Cart::empty(user_id.clone())))
    }

    #[tracing::instrument(skip(self))]
    async fn empty_cart(&self, user_id: &UserId) -> Result<()> {
        Self::check(&self.fail_on_empty)?;
        let mut carts = self.carts.write().await;
        if let Some(cart) = carts.get_mut(user_id) {
            cart.items.clear();
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(id: &str) -> UserId {
        UserId::from(id)
    }

    fn product(id: &str) -> ProductId {
        ProductId::from(id)
    }

    #[tokio::test]
    async fn unknown_user_gets_empty_cart() {
        let store = InMemoryCartStore::new();
        let cart = store.get_cart(&user("nobody")).await.unwrap();
        assert_eq!(cart.user_id, user("nobody"));
        assert!(cart.is_empty());
        assert_eq!(store.cart_count().await, 0);
    }

    #[tokio::test]
    async fn add_item_merges_quantities_and_preserves_order() {
        let store = InMemoryCartStore::new();
        let u = user("u1");

        store.add_item(&u, &product("A"), 2).await.unwrap();
        store.add_item(&u, &product("B"), 1).await.unwrap();
        store.add_item(&u, &product("C"), 4).await.unwrap();
        store.add_item(&u, &product("A"), 3).await.unwrap();

        let cart = store.get_cart(&u).await.unwrap();
        let lines: Vec<(&str, u32)> = cart
            .items
            .iter()
            .map(|i| (i.product_id.as_str(), i.quantity))
            .collect();
        assert_eq!(lines, [("A", 5), ("B", 1), ("C", 4)]);
    }

    #[tokio::test]
    async fn carts_are_per_user() {
        let store = InMemoryCartStore::new();
        store.add_item(&user("u1"), &product("A"), 1).await.unwrap();
        store.add_item(&user("u2"), &product("B"), 1).await.unwrap();

        let cart = store.get_cart(&user("u1")).await.unwrap();
        assert_eq!(cart.items.len(), 1);
        assert_eq!(cart.quantity_of(&product("B")), None);
    }

    #[tokio::test]
    async fn empty_cart_then_get_returns_no_items() {
        let store = InMemoryCartStore::new();
        let u = user("u1");
        store.add_item(&u, &product("A"), 1).await.unwrap();

        store.empty_cart(&u).await.unwrap();

        assert!(store.get_cart(&u).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn empty_cart_for_unknown_user_is_noop() {
        let store = InMemoryCartStore::new();
        store.empty_cart(&user("ghost")).await.unwrap();
        assert_eq!(store.cart_count().await, 0);
    }

    #[tokio::test]
    async fn zero_quantity_is_rejected() {
        let store = InMemoryCartStore::new();
        let result = store.add_item(&user("u1"), &product("A"), 0).await;
        assert!(matches!(
            result,
            Err(CartStoreError::InvalidQuantity { quantity: 0, .. })
        ));
    }

    #[tokio::test]
    async fn quantities_above_line_limit_are_rejected() {
        let store = InMemoryCartStore::new();
        let u = user("u1");

        let huge = store.add_item(&u, &product("A"), u32::MAX).await;
        assert!(matches!(huge, Err(CartStoreError::InvalidQuantity { .. })));

        store
            .add_item(&u, &product("A"), MAX_LINE_QUANTITY)
            .await
            .unwrap();
        let result = store.add_item(&u, &product("A"), 1).await;
        assert!(matches!(result, Err(CartStoreError::InvalidQuantity { .. })));
        let cart = store.get_cart(&u).await.unwrap();
        assert_eq!(cart.quantity_of(&product("A")), Some(MAX_LINE_QUANTITY));
    }

    #[tokio::test]
    async fn fault_switches_fail_reads_and_clears() {
        let store = InMemoryCartStore::new();
        let u = user("u1");
        store.add_item(&u, &product("A"), 1).await.unwrap();

        store.set_fail_on_empty(true);
        let err = store.empty_cart(&u).await.unwrap_err();
        assert!(err.is_unavailable());
        assert_eq!(store.get_cart(&u).await.unwrap().items.len(), 1);

        store.set_fail_on_get(true);
        assert!(matches!(
            store.get_cart(&u).await,
            Err(CartStoreError::Unavailable(_))
        ));

        store.set_fail_on_get(false);
        store.set_fail_on_empty(false);
        store.empty_cart(&u).await.unwrap();
        assert!(store.get_cart(&u).await.unwrap().is_empty());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_adds_do_not_lose_updates() {
        let store = InMemoryCartStore::new();
        let n = 200;

        let handles: Vec<_> = (0..n)
            .map(|_| {
                let store = store.clone();
                tokio::spawn(async move {
                    store
                        .add_item(&UserId::from("racer"), &ProductId::from("A"), 1)
                        .await
                })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let cart = store.get_cart(&user("racer")).await.unwrap();
        assert_eq!(cart.quantity_of(&product("A")), Some(n));
    }
}
