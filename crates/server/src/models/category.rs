//! Catalogue categories.

use serde::{Deserialize, Serialize};

use coledzh_shop_core::CategoryId;

/// A product category as stored and as returned to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
}

/// Orders categories by name, ascending, using plain lexicographic comparison.
///
/// Listing results go through this regardless of whether they came from the
/// cache or the store, so response order never depends on the source.
pub fn sort_by_name(categories: &mut [Category]) {
    categories.sort_by(|a, b| {
        a.name
            .cmp(&b.name)
            .then_with(|| a.id.as_uuid().cmp(b.id.as_uuid()))
    });
}
