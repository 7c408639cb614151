use async_trait::async_trait;
use common::{ProductId, UserId};
use domain::{Cart, CartItem};
use sqlx::{PgPool, Row, postgres::PgRow};

use crate::store::{CartStore, MAX_LINE_QUANTITY};
use crate::{CartStoreError, Result};

/// PostgreSQL-backed cart store.
///
/// `add_item` is a single upsert, so concurrent increments for the same
/// line are serialized by the database row lock and never lost.
#[derive(Clone)]
pub struct PostgresCartStore {
    pool: PgPool,
}

impl PostgresCartStore {
    /// Creates a new PostgreSQL cart store.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Gets a reference to the underlying connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Runs the database migrations.
    pub async fn run_migrations(&self) -> Result<()> {
        sqlx::migrate!("../../migrations").run(&self.pool).await?;
        Ok(())
    }

    /// Returns true if the database answers a trivial query.
    pub async fn ping(&self) -> bool {
        sqlx::query("SELECT 1").execute(&self.pool).await.is_ok()
    }

    fn row_to_item(row: PgRow) -> Result<CartItem> {
        let product_id: String = row.try_get("product_id")?;
        let quantity: i32 = row.try_get("quantity")?;
        // The CHECK constraint keeps stored quantities positive.
        let quantity = u32::try_from(quantity).map_err(|_| {
            CartStoreError::Database(sqlx::Error::Decode(
                format!("negative quantity {quantity} for product {product_id}").into(),
            ))
        })?;
        Ok(CartItem::new(product_id, quantity))
    }
}

#[async_trait]
impl CartStore for PostgresCartStore {
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
        if quantity == 0 || quantity > MAX_LINE_QUANTITY {
            return Err(invalid());
        }
        let quantity_sql = i32::try_from(quantity).map_err(|_| invalid())?;

        sqlx::query(
            r#"
            INSERT INTO cart_items (user_id, product_id, quantity)
            VALUES ($1, $2, $3)
            ON CONFLICT ON CONSTRAINT unique_cart_product
            DO UPDATE SET quantity = cart_items.quantity + EXCLUDED.quantity,
                          updated_at = NOW()
            "#,
        )
        .bind(user_id.as_str())
        .bind(product_id.as_str())
        .bind(quantity_sql)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            // Integer overflow on the merged quantity.
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.code().as_deref() == Some("22003")
            {
                return invalid();
            }
            CartStoreError::Database(e)
        })?;

        Ok(())
    }

    #[tracing::instrument(skip(self))]
    async fn get_cart(&self, user_id: &UserId) -> Result<Cart> {
        let rows = sqlx::query(
            r#"
            SELECT product_id, quantity
            FROM cart_items
            WHERE user_id = $1
            ORDER BY id ASC
            "#,
        )
        .bind(user_id.as_str())
        .fetch_all(&self.pool)
        .await?;

        let items = rows
            .into_iter()
            .map(Self::row_to_item)
            .collect::<Result<Vec<_>>>()?;

        Ok(Cart {
            user_id: user_id.clone(),
            items,
        })
    }

    #[tracing::instrument(skip(self))]
    async fn empty_cart(&self, user_id: &UserId) -> Result<()> {
        let result = sqlx::query("DELETE FROM cart_items WHERE user_id = $1")
            .bind(user_id.as_str())
            .execute(&self.pool)
            .await?;

        tracing::debug!(removed = result.rows_affected(), "cart emptied");
        Ok(())
    }
}
