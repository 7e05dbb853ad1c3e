//! Cart lines.

use async_trait::async_trait;
use sqlx::PgPool;

use coledzh_shop_core::{CartItemId, Price, ProductId, UserId};

use super::RepositoryError;
use crate::models::{CartItem, ProductCard};

/// Durable cart lines, one per added product.
#[async_trait]
pub trait CartStore: Send + Sync {
    /// Append a product to the user's cart.
    ///
    /// Returns `RepositoryError::InvalidReference` when the product does not exist.
    async fn add_item(
        &self,
        user_id: UserId,
        product_id: ProductId,
    ) -> Result<CartItemId, RepositoryError>;

    /// Cart lines in insertion order.
    async fn items(&self, user_id: UserId) -> Result<Vec<CartItem>, RepositoryError>;

    /// Remove every line from the user's cart.
    async fn clear(&self, user_id: UserId) -> Result<(), RepositoryError>;
}

#[derive(sqlx::FromRow)]
struct CartLineRow {
    item_id: CartItemId,
    product_id: ProductId,
    name: String,
    price: Price,
}

/// `PostgreSQL` implementation of [`CartStore`].
#[derive(Clone)]
pub struct PgCartStore {
    pool: PgPool,
}

impl PgCartStore {
    /// Create a new cart store.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CartStore for PgCartStore {
    async fn add_item(
        &self,
        user_id: UserId,
        product_id: ProductId,
    ) -> Result<CartItemId, RepositoryError> {
        let id = CartItemId::generate();
        sqlx::query("INSERT INTO cart_items (id, user_id, product_id) VALUES ($1, $2, $3)")
            .bind(id)
            .bind(user_id)
            .bind(product_id)
            .execute(&self.pool)
            .await
            .map_err(|e| RepositoryError::from_write(e, "cart item"))?;
        Ok(id)
    }

    async fn items(&self, user_id: UserId) -> Result<Vec<CartItem>, RepositoryError> {
        let rows: Vec<CartLineRow> = sqlx::query_as(
            r"
            SELECT c.id AS item_id, p.id AS product_id, p.name, p.price
            FROM cart_items c
            JOIN products p ON p.id = c.product_id
            WHERE c.user_id = $1
            ORDER BY c.added_at, c.id
            ",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| CartItem {
                id: row.item_id,
                product: ProductCard {
                    id: row.product_id,
                    name: row.name,
                    price: row.price,
                },
            })
            .collect())
    }

    async fn clear(&self, user_id: UserId) -> Result<(), RepositoryError> {
        sqlx::query("DELETE FROM cart_items WHERE user_id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
