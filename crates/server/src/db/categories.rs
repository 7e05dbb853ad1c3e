//! Categories, authoritative copy.

use async_trait::async_trait;
use sqlx::PgPool;

use super::RepositoryError;
use crate::models::Category;

/// Durable category records. Id and name are each unique.
#[async_trait]
pub trait CategoryStore: Send + Sync {
    /// Insert a category.
    ///
    /// Returns `RepositoryError::Conflict` on a duplicate id or name.
    async fn save_category(&self, category: &Category) -> Result<(), RepositoryError>;

    /// Every stored category, in no particular order.
    async fn all_categories(&self) -> Result<Vec<Category>, RepositoryError>;
}

/// `PostgreSQL` implementation of [`CategoryStore`].
#[derive(Clone)]
pub struct PgCategoryStore {
    pool: PgPool,
}

impl PgCategoryStore {
    /// Create a new category store.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CategoryStore for PgCategoryStore {
    async fn save_category(&self, category: &Category) -> Result<(), RepositoryError> {
        sqlx::query("INSERT INTO categories (id, name) VALUES ($1, $2)")
            .bind(category.id)
            .bind(&category.name)
            .execute(&self.pool)
            .await
            .map_err(|e| RepositoryError::from_write(e, "category"))?;
        Ok(())
    }

    async fn all_categories(&self) -> Result<Vec<Category>, RepositoryError> {
        let categories = sqlx::query_as("SELECT id, name FROM categories")
            .fetch_all(&self.pool)
            .await?;
        Ok(categories)
    }
}
