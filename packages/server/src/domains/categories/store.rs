//! Storage capability interface for the category tree.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::common::StoreError;
use crate::domains::categories::models::{Category, NewCategory, Translation};

/// Partial update; `None` fields keep their current value.
#[derive(Debug, Clone, Default)]
pub struct CategoryPatch {
    pub translations: Option<Vec<Translation>>,
    pub slug: Option<String>,
    pub full_slug: Option<String>,
}

#[async_trait]
pub trait CategoryStore: Send + Sync {
    /// Insert a node. A slug or full_slug collision must surface as
    /// `StoreError::UniqueViolation`.
    async fn insert(&self, new_category: NewCategory) -> Result<Category, StoreError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Category>, StoreError>;
    async fn find_by_full_slug(&self, full_slug: &str) -> Result<Option<Category>, StoreError>;
    async fn list_all(&self) -> Result<Vec<Category>, StoreError>;
    async fn list_roots(&self) -> Result<Vec<Category>, StoreError>;
    async fn list_children(&self, parent_id: Uuid) -> Result<Vec<Category>, StoreError>;

    async fn update(&self, id: Uuid, patch: CategoryPatch) -> Result<Category, StoreError>;

    /// Re-parent with an optimistic full_slug check; a concurrent move
    /// of the same node must surface as `StoreError::Conflict`.
    async fn update_parent(
        &self,
        id: Uuid,
        expected_full_slug: &str,
        parent_id: Option<Uuid>,
        new_full_slug: &str,
    ) -> Result<Category, StoreError>;

    async fn update_full_slug(&self, id: Uuid, full_slug: &str) -> Result<(), StoreError>;

    /// Delete a node and its whole subtree. Returns the number of
    /// directly deleted rows (0 when the id does not exist).
    async fn delete(&self, id: Uuid) -> Result<u64, StoreError>;
}

/// Postgres adapter.
#[derive(Clone)]
pub struct PgCategoryStore {
    pool: PgPool,
}

impl PgCategoryStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CategoryStore for PgCategoryStore {
    async fn insert(&self, new_category: NewCategory) -> Result<Category, StoreError> {
        Category::insert(new_category, &self.pool).await
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Category>, StoreError> {
        Category::find_by_id(id, &self.pool).await
    }

    async fn find_by_full_slug(&self, full_slug: &str) -> Result<Option<Category>, StoreError> {
        Category::find_by_full_slug(full_slug, &self.pool).await
    }

    async fn list_all(&self) -> Result<Vec<Category>, StoreError> {
        Category::list_all(&self.pool).await
    }

    async fn list_roots(&self) -> Result<Vec<Category>, StoreError> {
        Category::list_roots(&self.pool).await
    }

    async fn list_children(&self, parent_id: Uuid) -> Result<Vec<Category>, StoreError> {
        Category::list_children(parent_id, &self.pool).await
    }

    async fn update(&self, id: Uuid, patch: CategoryPatch) -> Result<Category, StoreError> {
        Category::update(
            id,
            patch.translations.as_deref(),
            patch.slug.as_deref(),
            patch.full_slug.as_deref(),
            &self.pool,
        )
        .await
    }

    async fn update_parent(
        &self,
        id: Uuid,
        expected_full_slug: &str,
        parent_id: Option<Uuid>,
        new_full_slug: &str,
    ) -> Result<Category, StoreError> {
        Category::update_parent(id, expected_full_slug, parent_id, new_full_slug, &self.pool).await
    }

    async fn update_full_slug(&self, id: Uuid, full_slug: &str) -> Result<(), StoreError> {
        Category::update_full_slug(id, full_slug, &self.pool).await
    }

    async fn delete(&self, id: Uuid) -> Result<u64, StoreError> {
        Category::delete(id, &self.pool).await
    }
}
