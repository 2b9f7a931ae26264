use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::common::{Locale, StoreError};

/// One name for a category in one language.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Translation {
    pub lang: String,
    pub name: String,
}

/// Category - one node of the self-referencing tree.
///
/// `slug` is derived from the English name (or an explicit override)
/// and unique across the whole tree, so `full_slug` - the
/// slash-joined root-to-node path - is unique too.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Category {
    pub id: Uuid,
    /// Sequential id kept for clients that still page by number.
    pub legacy_id: i32,
    pub slug: String,
    pub full_slug: String,
    pub translations: Json<Vec<Translation>>,
    pub parent_category_id: Option<Uuid>,
}

#[derive(Debug, Clone)]
pub struct NewCategory {
    pub slug: String,
    pub full_slug: String,
    pub translations: Vec<Translation>,
    pub parent_category_id: Option<Uuid>,
}

/// A category flattened to a single language for the client.
#[derive(Debug, Clone, Serialize)]
pub struct LocalizedCategory {
    pub id: Uuid,
    pub legacy_id: i32,
    pub slug: String,
    pub full_slug: String,
    pub name: String,
    pub parent_category_id: Option<Uuid>,
}

/// A localized category together with its localized children.
#[derive(Debug, Clone, Serialize)]
pub struct CategoryNode {
    #[serde(flatten)]
    pub category: LocalizedCategory,
    pub children: Vec<CategoryNode>,
}

impl Category {
    /// Name in the requested language, falling back to English and
    /// then to whatever translation exists. Never fails: a category
    /// with no translations localizes to an empty name.
    pub fn name_for(&self, locale: Locale) -> String {
        let translations = &self.translations.0;
        translations
            .iter()
            .find(|t| t.lang == locale.as_str())
            .or_else(|| translations.iter().find(|t| t.lang == "en"))
            .or_else(|| translations.first())
            .map(|t| t.name.clone())
            .unwrap_or_default()
    }

    pub fn localize(&self, locale: Locale) -> LocalizedCategory {
        LocalizedCategory {
            id: self.id,
            legacy_id: self.legacy_id,
            slug: self.slug.clone(),
            full_slug: self.full_slug.clone(),
            name: self.name_for(locale),
            parent_category_id: self.parent_category_id,
        }
    }
}

// =============================================================================
// SQL Queries - ALL queries must be in models/
// =============================================================================

impl Category {
    pub async fn insert(new_category: NewCategory, pool: &PgPool) -> Result<Self, StoreError> {
        let category = sqlx::query_as::<_, Category>(
            r#"
            INSERT INTO categories (slug, full_slug, translations, parent_category_id)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(&new_category.slug)
        .bind(&new_category.full_slug)
        .bind(Json(&new_category.translations))
        .bind(new_category.parent_category_id)
        .fetch_one(pool)
        .await
        .map_err(|e| StoreError::from_sqlx(e, "slug"))?;
        Ok(category)
    }

    pub async fn find_by_id(id: Uuid, pool: &PgPool) -> Result<Option<Self>, StoreError> {
        let category = sqlx::query_as::<_, Category>("SELECT * FROM categories WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await?;
        Ok(category)
    }

    pub async fn find_by_full_slug(
        full_slug: &str,
        pool: &PgPool,
    ) -> Result<Option<Self>, StoreError> {
        let category =
            sqlx::query_as::<_, Category>("SELECT * FROM categories WHERE full_slug = $1")
                .bind(full_slug)
                .fetch_optional(pool)
                .await?;
        Ok(category)
    }

    pub async fn list_all(pool: &PgPool) -> Result<Vec<Self>, StoreError> {
        let categories =
            sqlx::query_as::<_, Category>("SELECT * FROM categories ORDER BY legacy_id")
                .fetch_all(pool)
                .await?;
        Ok(categories)
    }

    pub async fn list_roots(pool: &PgPool) -> Result<Vec<Self>, StoreError> {
        let categories = sqlx::query_as::<_, Category>(
            "SELECT * FROM categories WHERE parent_category_id IS NULL ORDER BY legacy_id",
        )
        .fetch_all(pool)
        .await?;
        Ok(categories)
    }

    pub async fn list_children(parent_id: Uuid, pool: &PgPool) -> Result<Vec<Self>, StoreError> {
        let categories = sqlx::query_as::<_, Category>(
            "SELECT * FROM categories WHERE parent_category_id = $1 ORDER BY legacy_id",
        )
        .bind(parent_id)
        .fetch_all(pool)
        .await?;
        Ok(categories)
    }

    /// Update translations/slug/full_slug in one statement. Passing
    /// `NULL` keeps the current value.
    pub async fn update(
        id: Uuid,
        translations: Option<&[Translation]>,
        slug: Option<&str>,
        full_slug: Option<&str>,
        pool: &PgPool,
    ) -> Result<Self, StoreError> {
        let category = sqlx::query_as::<_, Category>(
            r#"
            UPDATE categories
            SET translations = COALESCE($2, translations),
                slug = COALESCE($3, slug),
                full_slug = COALESCE($4, full_slug)
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(translations.map(Json))
        .bind(slug)
        .bind(full_slug)
        .fetch_optional(pool)
        .await
        .map_err(|e| StoreError::from_sqlx(e, "slug"))?;
        category.ok_or(StoreError::NotFound)
    }

    /// Re-parent with an optimistic check: the update only applies if
    /// the node's full_slug is still the one the caller computed the
    /// new path from. Zero rows means a concurrent move won.
    pub async fn update_parent(
        id: Uuid,
        expected_full_slug: &str,
        parent_id: Option<Uuid>,
        new_full_slug: &str,
        pool: &PgPool,
    ) -> Result<Self, StoreError> {
        let category = sqlx::query_as::<_, Category>(
            r#"
            UPDATE categories
            SET parent_category_id = $3, full_slug = $4
            WHERE id = $1 AND full_slug = $2
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(expected_full_slug)
        .bind(parent_id)
        .bind(new_full_slug)
        .fetch_optional(pool)
        .await
        .map_err(|e| StoreError::from_sqlx(e, "full_slug"))?;
        category.ok_or(StoreError::Conflict)
    }

    pub async fn update_full_slug(
        id: Uuid,
        full_slug: &str,
        pool: &PgPool,
    ) -> Result<(), StoreError> {
        sqlx::query("UPDATE categories SET full_slug = $2 WHERE id = $1")
            .bind(id)
            .bind(full_slug)
            .execute(pool)
            .await
            .map_err(|e| StoreError::from_sqlx(e, "full_slug"))?;
        Ok(())
    }

    /// Delete a node; the FK cascade removes the whole subtree.
    pub async fn delete(id: Uuid, pool: &PgPool) -> Result<u64, StoreError> {
        let result = sqlx::query("DELETE FROM categories WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }
}
