//! Startup-time selection of the cart backend.

use async_trait::async_trait;
use common::{ProductId, UserId};
use domain::Cart;
use sqlx::postgres::PgPoolOptions;

use crate::{
    CartStoreError, Result, memory::InMemoryCartStore, postgres::PostgresCartStore,
    store::CartStore,
};

/// Which backend to build, read from configuration.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CartStoreConfig {
    /// Process-local carts, lost on restart.
    #[default]
    InMemory,
    /// Relational store reached over the network.
    Postgres { url: String, max_connections: u32 },
}

impl CartStoreConfig {
    /// Parses a backend name (`memory` or `postgres`).
    ///
    /// `postgres` requires a database URL.
    pub fn from_parts(
        kind: &str,
        database_url: Option<String>,
        max_connections: u32,
    ) -> Result<Self> {
        match kind.to_ascii_lowercase().as_str() {
            "memory" | "in-memory" | "inmemory" => Ok(Self::InMemory),
            "postgres" | "postgresql" => {
                let url = database_url.ok_or_else(|| {
                    CartStoreError::Config("postgres cart store requires DATABASE_URL".into())
                })?;
                Ok(Self::Postgres {
                    url,
                    max_connections,
                })
            }
            other => Err(CartStoreError::Config(format!(
                "unknown cart store backend '{other}'"
            ))),
        }
    }
}

/// The configured cart store. Dispatch is a plain `match` on the variant.
#[derive(Clone)]
pub enum CartBackend {
    InMemory(InMemoryCartStore),
    Postgres(PostgresCartStore),
}

impl CartBackend {
    /// Builds the backend described by `config`, running migrations for
    /// the relational variant.
    pub async fn connect(config: &CartStoreConfig) -> Result<Self> {
        match config {
            CartStoreConfig::InMemory => {
                tracing::info!("using in-memory cart store");
                Ok(Self::InMemory(InMemoryCartStore::new()))
            }
            CartStoreConfig::Postgres {
                url,
                max_connections,
            } => {
                tracing::info!(max_connections, "using postgres cart store");
                let pool = PgPoolOptions::new()
                    .max_connections(*max_connections)
                    .connect(url)
                    .await?;
                let store = PostgresCartStore::new(pool);
                store.run_migrations().await?;
                Ok(Self::Postgres(store))
            }
        }
    }

    /// Short backend name for logs and health output.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InMemory(_) => "memory",
            Self::Postgres(_) => "postgres",
        }
    }

    /// Returns true if the backend can serve requests.
    pub async fn ping(&self) -> bool {
        match self {
            Self::InMemory(_) => true,
            Self::Postgres(store) => store.ping().await,
        }
    }
}

#[async_trait]
impl CartStore for CartBackend {
    async fn add_item(
        &self,
        user_id: &UserId,
        product_id: &ProductId,
        quantity: u32,
    ) -> Result<()> {
        metrics::counter!("cart_add_item_total", "backend" => self.kind()).increment(1);
        match self {
            Self::InMemory(store) => store.add_item(user_id, product_id, quantity).await,
            Self::Postgres(store) => store.add_item(user_id, product_id, quantity).await,
        }
    }

    async fn get_cart(&self, user_id: &UserId) -> Result<Cart> {
        match self {
            Self::InMemory(store) => store.get_cart(user_id).await,
            Self::Postgres(store) => store.get_cart(user_id).await,
        }
    }

    async fn empty_cart(&self, user_id: &UserId) -> Result<()> {
        metrics::counter!("cart_empty_total", "backend" => self.kind()).increment(1);
        match self {
            Self::InMemory(store) => store.empty_cart(user_id).await,
            Self::Postgres(store) => store.empty_cart(user_id).await,
        }
    }
}
