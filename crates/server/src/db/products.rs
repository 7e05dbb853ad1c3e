//! Products and their category links.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use coledzh_shop_core::{CategoryId, Price, ProductId};

use super::RepositoryError;
use crate::models::{Category, NewProduct, Product, ProductCard};

/// Number of cards per listing page.
pub const PAGE_SIZE: u32 = 10;

/// Durable product records.
#[async_trait]
pub trait ProductStore: Send + Sync {
    /// Insert a product and link it to its categories atomically.
    ///
    /// Returns `RepositoryError::InvalidReference` when a category does not exist.
    async fn save_product(&self, id: ProductId, product: &NewProduct)
    -> Result<(), RepositoryError>;

    /// One page of cards ordered by name, optionally restricted to a category.
    async fn products(
        &self,
        category_id: Option<CategoryId>,
        page: u32,
    ) -> Result<Vec<ProductCard>, RepositoryError>;

    /// Full product view.
    async fn product_by_id(&self, id: ProductId) -> Result<Option<Product>, RepositoryError>;
}

#[derive(sqlx::FromRow)]
struct ProductRow {
    id: ProductId,
    name: String,
    description: String,
    price: Price,
}

/// `PostgreSQL` implementation of [`ProductStore`].
#[derive(Clone)]
pub struct PgProductStore {
    pool: PgPool,
}

impl PgProductStore {
    /// Create a new product store.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProductStore for PgProductStore {
    async fn save_product(
        &self,
        id: ProductId,
        product: &NewProduct,
    ) -> Result<(), RepositoryError> {
        let category_ids: Vec<Uuid> = product
            .category_ids
            .iter()
            .map(|id| *id.as_uuid())
            .collect();

        let mut tx = self.pool.begin().await?;

        sqlx::query("INSERT INTO products (id, name, description, price) VALUES ($1, $2, $3, $4)")
            .bind(id)
            .bind(&product.name)
            .bind(&product.description)
            .bind(product.price)
            .execute(&mut *tx)
            .await
            .map_err(|e| RepositoryError::from_write(e, "product"))?;

        sqlx::query(
            r"
            INSERT INTO products_categories (product_id, category_id)
            SELECT $1, category_id FROM UNNEST($2::uuid[]) AS category_id
            ",
        )
        .bind(id)
        .bind(&category_ids)
        .execute(&mut *tx)
        .await
        .map_err(|e| RepositoryError::from_write(e, "product category"))?;

        tx.commit().await?;
        Ok(())
    }

    async fn products(
        &self,
        category_id: Option<CategoryId>,
        page: u32,
    ) -> Result<Vec<ProductCard>, RepositoryError> {
        let cards = sqlx::query_as(
            r"
            SELECT p.id, p.name, p.price
            FROM products p
            WHERE $1::uuid IS NULL
               OR EXISTS (
                   SELECT 1 FROM products_categories pc
                   WHERE pc.product_id = p.id AND pc.category_id = $1
               )
            ORDER BY p.name, p.id
            LIMIT $2 OFFSET $3
            ",
        )
        .bind(category_id)
        .bind(i64::from(PAGE_SIZE))
        .bind(i64::from(page) * i64::from(PAGE_SIZE))
        .fetch_all(&self.pool)
        .await?;
        Ok(cards)
    }

    async fn product_by_id(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let Some(row) = sqlx::query_as::<_, ProductRow>(
            "SELECT id, name, description, price FROM products WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        else {
            return Ok(None);
        };

        let categories: Vec<Category> = sqlx::query_as(
            r"
            SELECT c.id, c.name
            FROM categories c
            JOIN products_categories pc ON pc.category_id = c.id
            WHERE pc.product_id = $1
            ",
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?;

        Ok(Some(Product {
            id: row.id,
            name: row.name,
            description: row.description,
            price: row.price,
            categories,
        }))
    }
}
