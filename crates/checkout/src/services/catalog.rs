//! Product catalog trait and in-memory implementation.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use common::ProductId;
use domain::Product;

use crate::error::ServiceError;

/// Reference product list bundled with the crate.
pub const REFERENCE_PRODUCTS_JSON: &str = include_str!("../../data/products.json");

/// Looks up products and their USD prices.
#[async_trait]
pub trait CatalogService: Send + Sync {
    /// Fetches a single product.
    async fn get_product(&self, product_id: &ProductId) -> Result<Product, ServiceError>;
}

#[async_trait]
impl<T: CatalogService + ?Sized> CatalogService for Arc<T> {
    async fn get_product(&self, product_id: &ProductId) -> Result<Product, ServiceError> {
        (**self).get_product(product_id).await
    }
}

#[derive(Debug, Default)]
struct InMemoryCatalogState {
    products: HashMap<ProductId, Product>,
    lookups: usize,
    fail_on_lookup: bool,
}

/// In-memory catalog.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCatalogService {
    state: Arc<Mutex<InMemoryCatalogState>>,
}

impl InMemoryCatalogService {
    /// Creates an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a catalog holding `products`.
    pub fn with_products(products: impl IntoIterator<Item = Product>) -> Self {
        let catalog = Self::new();
        for product in products {
            catalog.insert(product);
        }
        catalog
    }

    /// Parses a JSON array of products.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let products: Vec<Product> = serde_json::from_str(json)?;
        Ok(Self::with_products(products))
    }

    /// The bundled reference catalog.
    pub fn reference() -> Result<Self, serde_json::Error> {
        Self::from_json(REFERENCE_PRODUCTS_JSON)
    }

    fn state(&self) -> MutexGuard<'_, InMemoryCatalogState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Adds or replaces a product.
    pub fn insert(&self, product: Product) {
        self.state().products.insert(product.id.clone(), product);
    }

    /// All products, sorted by id.
    pub fn list_products(&self) -> Vec<Product> {
        let mut products: Vec<Product> = self.state().products.values().cloned().collect();
        products.sort_by(|a, b| a.id.cmp(&b.id));
        products
    }

    /// Makes every lookup fail as unavailable.
    pub fn set_fail_on_lookup(&self, fail: bool) {
        self.state().fail_on_lookup = fail;
    }

    /// Number of lookups served so far.
    pub fn lookup_count(&self) -> usize {
        self.state().lookups
    }
}

#[async_trait]
impl CatalogService for InMemoryCatalogService {
    async fn get_product(&self, product_id: &ProductId) -> Result<Product, ServiceError> {
        let mut state = self.state();
        state.lookups += 1;

        if state.fail_on_lookup {
            return Err(ServiceError::unavailable("catalog", "catalog offline"));
        }

        state
            .products
            .get(product_id)
            .cloned()
            .ok_or_else(|| ServiceError::ProductNotFound(product_id.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain::Money;

    #[tokio::test]
    async fn test_reference_catalog() {
        let catalog = InMemoryCatalogService::reference().unwrap();
        assert_eq!(catalog.list_products().len(), 9);

        let mug = catalog
            .get_product(&ProductId::from("6E92ZMYYFZ"))
            .await
            .unwrap();
        assert_eq!(mug.name, "Mug");
        assert_eq!(mug.price_usd, Money::new("USD", 8, 990_000_000).unwrap());
    }

    #[tokio::test]
    async fn test_unknown_product() {
        let catalog = InMemoryCatalogService::new();
        let result = catalog.get_product(&ProductId::from("NOPE")).await;

        assert_eq!(result, Err(ServiceError::ProductNotFound(ProductId::from("NOPE"))));
        assert_eq!(catalog.lookup_count(), 1);
    }

    #[tokio::test]
    async fn test_fail_on_lookup() {
        let catalog = InMemoryCatalogService::with_products([Product::new(
            "A",
            "Thing",
            Money::from_units("USD", 1),
        )]);
        catalog.set_fail_on_lookup(true);

        let result = catalog.get_product(&ProductId::from("A")).await;
        assert!(matches!(result, Err(ServiceError::Unavailable { service: "catalog", .. })));
    }
}
