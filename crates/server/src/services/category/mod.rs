//! Category service: write-through creation, cache-aside listing.
//!
//! The store is authoritative. The cache is a mirror that may be absent
//! or unreachable at any time, and every path here tolerates that:
//!
//! - create: store first, then a best-effort add to the mirror
//! - list: mirror if warm, else store (repopulating a cold mirror unless a
//!   create raced the store read)
//!
//! Results are sorted by name whichever source answered.

mod error;

use std::sync::Arc;

use tracing::{debug, info, warn};

use coledzh_shop_core::{CategoryId, CategoryName};

pub use error::CategoryError;

use crate::cache::{CacheError, CategoryCache};
use crate::db::{CategoryStore, RepositoryError};
use crate::models::Category;
use crate::models::category::sort_by_name;

/// Outcome of the secondary (cache) write after a successful store write.
#[derive(Debug)]
pub enum CacheWrite {
    /// Added to the warm mirror.
    Stored,
    /// Mirror was cold; the next listing repopulates it from the store.
    Skipped,
    /// Cache write failed. The category is stored but the mirror may be stale until it expires.
    Failed(CacheError),
}

/// Result of creating a category.
#[derive(Debug)]
pub struct CategoryCreated {
    pub id: CategoryId,
    pub cache: CacheWrite,
}

/// Category service.
pub struct CategoryService {
    store: Arc<dyn CategoryStore>,
    cache: Arc<dyn CategoryCache>,
}

impl CategoryService {
    /// Create a new category service.
    #[must_use]
    pub fn new(store: Arc<dyn CategoryStore>, cache: Arc<dyn CategoryCache>) -> Self {
        Self { store, cache }
    }

    /// Create a category.
    ///
    /// Succeeds once the store accepts the record; the cache outcome is
    /// reported alongside the id and never turns success into failure.
    ///
    /// # Errors
    ///
    /// Returns `CategoryError::AlreadyExists` if the store rejects a duplicate.
    pub async fn create_category(
        &self,
        name: &CategoryName,
    ) -> Result<CategoryCreated, CategoryError> {
        let category = Category {
            id: CategoryId::generate(),
            name: name.as_str().to_owned(),
        };

        self.store
            .save_category(&category)
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(_) => CategoryError::AlreadyExists,
                other => CategoryError::Repository(other),
            })?;

        let cache = match self.cache.save_category(&category).await {
            Ok(true) => CacheWrite::Stored,
            Ok(false) => CacheWrite::Skipped,
            Err(e) => CacheWrite::Failed(e),
        };

        info!(category_id = %category.id, name = %category.name, "category created");
        Ok(CategoryCreated {
            id: category.id,
            cache,
        })
    }

    /// All categories, sorted by name ascending.
    ///
    /// # Errors
    ///
    /// Returns `CategoryError::Repository` only when the cache could not
    /// answer and the store failed too.
    pub async fn all_categories(&self) -> Result<Vec<Category>, CategoryError> {
        let cold_generation = match self.cache.all_categories().await {
            Ok(Some(mut categories)) => {
                sort_by_name(&mut categories);
                return Ok(categories);
            }
            Ok(None) => {
                debug!("category cache cold, reading store");
                match self.cache.generation().await {
                    Ok(generation) => Some(generation),
                    Err(e) => {
                        warn!(error = %e, "category cache unavailable, reading store");
                        None
                    }
                }
            }
            Err(e) => {
                warn!(error = %e, "category cache unavailable, reading store");
                None
            }
        };

        let mut categories = self.store.all_categories().await?;

        if let Some(generation) = cold_generation {
            match self.cache.replace_all(&categories, generation).await {
                Ok(true) => {}
                Ok(false) => debug!("category created during read, leaving cache cold"),
                Err(e) => warn!(error = %e, "failed to repopulate category cache"),
            }
        }

        sort_by_name(&mut categories);
        Ok(categories)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::time::Duration;

    use async_trait::async_trait;
    use tokio::sync::Notify;

    use super::*;
    use crate::cache::MemoryCategoryCache;
    use crate::testing::{MemoryCategoryStore, UnavailableCategoryCache};

    fn name(s: &str) -> CategoryName {
        CategoryName::parse(s).unwrap()
    }

    fn names(categories: &[Category]) -> Vec<&str> {
        categories.iter().map(|c| c.name.as_str()).collect()
    }

    fn memory_cache() -> Arc<MemoryCategoryCache> {
        Arc::new(MemoryCategoryCache::new(Duration::from_secs(60)))
    }

    /// Holds the first listing after its snapshot until released.
    struct PausingStore {
        inner: MemoryCategoryStore,
        armed: AtomicBool,
        snapshot_taken: Notify,
        release: Notify,
    }

    impl PausingStore {
        fn new(inner: MemoryCategoryStore) -> Self {
            Self {
                inner,
                armed: AtomicBool::new(true),
                snapshot_taken: Notify::new(),
                release: Notify::new(),
            }
        }
    }

    #[async_trait]
    impl CategoryStore for PausingStore {
        async fn save_category(&self, category: &Category) -> Result<(), RepositoryError> {
            self.inner.save_category(category).await
        }

        async fn all_categories(&self) -> Result<Vec<Category>, RepositoryError> {
            let snapshot = self.inner.all_categories().await?;
            if self.armed.swap(false, Ordering::SeqCst) {
                self.snapshot_taken.notify_one();
                self.release.notified().await;
            }
            Ok(snapshot)
        }
    }

    #[tokio::test]
    async fn test_store_results_are_sorted() {
        let store = Arc::new(MemoryCategoryStore::with_names(&["Zeta", "Alpha", "Mid"]));
        let service = CategoryService::new(store, memory_cache());

        let categories = service.all_categories().await.unwrap();
        assert_eq!(names(&categories), ["Alpha", "Mid", "Zeta"]);
    }

    #[tokio::test]
    async fn test_cache_results_are_sorted() {
        let store = Arc::new(MemoryCategoryStore::default());
        let cache = memory_cache();
        let unsorted = MemoryCategoryStore::with_names(&["Zeta", "Alpha", "Mid"]).snapshot();
        cache.replace_all(&unsorted, 0).await.unwrap();
        let service = CategoryService::new(store, cache);

        // Store is empty, so these can only have come from the cache.
        let categories = service.all_categories().await.unwrap();
        assert_eq!(names(&categories), ["Alpha", "Mid", "Zeta"]);
    }

    #[tokio::test]
    async fn test_cold_cache_is_repopulated_from_store() {
        let store = Arc::new(MemoryCategoryStore::with_names(&["Books", "Audio"]));
        let cache = memory_cache();
        let service = CategoryService::new(store, cache.clone());

        service.all_categories().await.unwrap();

        let mirrored = cache.all_categories().await.unwrap().unwrap();
        assert_eq!(mirrored.len(), 2);
    }

    #[tokio::test]
    async fn test_unavailable_cache_falls_back_to_store() {
        let store = Arc::new(MemoryCategoryStore::with_names(&["Zeta", "Alpha", "Mid"]));
        let service = CategoryService::new(store, Arc::new(UnavailableCategoryCache));

        let categories = service.all_categories().await.unwrap();
        assert_eq!(names(&categories), ["Alpha", "Mid", "Zeta"]);
    }

    #[tokio::test]
    async fn test_created_category_is_listed_exactly_once() {
        let store = Arc::new(MemoryCategoryStore::with_names(&["Books"]));
        let service = CategoryService::new(store, memory_cache());

        // Warm the mirror, then create: the new record goes through the cache path.
        service.all_categories().await.unwrap();
        let created = service.create_category(&name("Phones")).await.unwrap();
        assert!(matches!(created.cache, CacheWrite::Stored));

        let categories = service.all_categories().await.unwrap();
        assert_eq!(names(&categories), ["Books", "Phones"]);
    }

    #[tokio::test]
    async fn test_create_on_cold_cache_does_not_hide_existing_categories() {
        let store = Arc::new(MemoryCategoryStore::with_names(&["Books"]));
        let service = CategoryService::new(store, memory_cache());

        let created = service.create_category(&name("Phones")).await.unwrap();
        assert!(matches!(created.cache, CacheWrite::Skipped));

        let categories = service.all_categories().await.unwrap();
        assert_eq!(names(&categories), ["Books", "Phones"]);
    }

    #[tokio::test]
    async fn test_create_during_cold_read_is_not_hidden() {
        let store = Arc::new(PausingStore::new(MemoryCategoryStore::with_names(&["Books"])));
        let service = Arc::new(CategoryService::new(store.clone(), memory_cache()));

        let reader = tokio::spawn({
            let service = Arc::clone(&service);
            async move { service.all_categories().await.unwrap() }
        });
        store.snapshot_taken.notified().await;

        let created = service.create_category(&name("Phones")).await.unwrap();
        assert!(matches!(created.cache, CacheWrite::Skipped));

        store.release.notify_one();
        let stale = reader.await.unwrap();
        assert_eq!(names(&stale), ["Books"]);

        let categories = service.all_categories().await.unwrap();
        assert_eq!(names(&categories), ["Books", "Phones"]);
    }

    #[tokio::test]
    async fn test_cache_write_failure_still_returns_id() {
        let store = Arc::new(MemoryCategoryStore::default());
        let service = CategoryService::new(store.clone(), Arc::new(UnavailableCategoryCache));

        let created = service.create_category(&name("Phones")).await.unwrap();

        assert!(matches!(created.cache, CacheWrite::Failed(_)));
        assert_eq!(store.snapshot().first().map(|c| c.id), Some(created.id));
    }

    #[tokio::test]
    async fn test_duplicate_name_is_already_exists() {
        let store = Arc::new(MemoryCategoryStore::with_names(&["Phones"]));
        let service = CategoryService::new(store, memory_cache());

        let result = service.create_category(&name("Phones")).await;
        assert!(matches!(result, Err(CategoryError::AlreadyExists)));
    }
}
