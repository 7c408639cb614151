//! Catalog product as served by the product catalog.

use common::ProductId;
use serde::{Deserialize, Serialize};

use crate::money::Money;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub picture: String,
    /// List price in the catalog's pricing currency (USD).
    pub price_usd: Money,
    #[serde(default)]
    pub categories: Vec<String>,
}

impl Product {
    pub fn new(id: impl Into<ProductId>, name: impl Into<String>, price_usd: Money) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: String::new(),
            picture: String::new(),
            price_usd,
            categories: Vec::new(),
        }
    }
}
