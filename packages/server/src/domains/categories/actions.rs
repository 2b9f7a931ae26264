//! Category tree operations.
//!
//! These are admin/maintenance operations, so messages are plain
//! English rather than routed through the locale catalog. Reads are
//! localized for the storefront.

use std::collections::{HashMap, HashSet, VecDeque};

use serde::Deserialize;
use uuid::Uuid;

use crate::common::{AppError, Locale, StoreError};
use crate::domains::categories::models::{
    Category, CategoryNode, LocalizedCategory, NewCategory, Translation,
};
use crate::domains::categories::slug::slugify;
use crate::domains::categories::store::CategoryPatch;
use crate::kernel::deps::ServerDeps;

#[derive(Debug, Clone, Deserialize)]
pub struct CreateCategoryRequest {
    #[serde(default)]
    pub translations: Vec<Translation>,
    /// Explicit slug override; the English name is slugified otherwise.
    pub slug: Option<String>,
    pub parent_category_id: Option<Uuid>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateCategoryRequest {
    pub translations: Option<Vec<Translation>>,
    pub slug: Option<String>,
    /// Not updatable here; use the move operation.
    pub parent_category_id: Option<Uuid>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MoveCategoryRequest {
    pub parent_category_id: Option<Uuid>,
}

fn english_name(translations: &[Translation]) -> Option<&str> {
    translations
        .iter()
        .find(|t| t.lang == "en" && !t.name.trim().is_empty())
        .map(|t| t.name.as_str())
}

pub async fn create_category(
    body: CreateCategoryRequest,
    deps: &ServerDeps,
) -> Result<Category, AppError> {
    let Some(en_name) = english_name(&body.translations) else {
        return Err(AppError::BadRequest(
            "An English translation with a non-empty name is required.".to_string(),
        ));
    };

    let slug = slugify(body.slug.as_deref().unwrap_or(en_name));
    if slug.is_empty() {
        return Err(AppError::BadRequest(
            "The category name does not produce a usable slug.".to_string(),
        ));
    }

    let full_slug = match body.parent_category_id {
        Some(parent_id) => {
            let parent = deps
                .categories
                .find_by_id(parent_id)
                .await?
                .ok_or_else(|| AppError::NotFound("Parent category not found.".to_string()))?;
            format!("{}/{}", parent.full_slug, slug)
        }
        None => slug.clone(),
    };

    // Pre-check for a friendlier message; the unique index still backs
    // this up if two creates race.
    if deps.categories.find_by_full_slug(&full_slug).await?.is_some() {
        return Err(AppError::Conflict(
            "A category with this slug already exists here.".to_string(),
        ));
    }

    let category = deps
        .categories
        .insert(NewCategory {
            slug,
            full_slug,
            translations: body.translations,
            parent_category_id: body.parent_category_id,
        })
        .await
        .map_err(|e| match e {
            StoreError::UniqueViolation(_) => AppError::Conflict(
                "A category with this slug already exists here.".to_string(),
            ),
            other => other.into(),
        })?;

    Ok(category)
}

pub async fn get_category(
    id: Uuid,
    locale: Locale,
    deps: &ServerDeps,
) -> Result<LocalizedCategory, AppError> {
    let category = deps
        .categories
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Category not found.".to_string()))?;
    Ok(category.localize(locale))
}

/// The root-to-node chain for a category, localized, root first.
pub async fn resolve_full_path(
    id: Uuid,
    locale: Locale,
    deps: &ServerDeps,
) -> Result<Vec<LocalizedCategory>, AppError> {
    let mut current = deps
        .categories
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Category not found.".to_string()))?;

    let mut chain = vec![current.localize(locale)];
    let mut seen: HashSet<Uuid> = HashSet::from([current.id]);

    while let Some(parent_id) = current.parent_category_id {
        // A cycle in stored data would otherwise loop forever.
        if !seen.insert(parent_id) {
            return Err(AppError::Internal(anyhow::anyhow!(
                "category ancestry cycle at {}",
                parent_id
            )));
        }
        current = deps
            .categories
            .find_by_id(parent_id)
            .await?
            .ok_or_else(|| {
                AppError::Internal(anyhow::anyhow!("dangling parent reference {}", parent_id))
            })?;
        chain.push(current.localize(locale));
    }

    chain.reverse();
    Ok(chain)
}

pub async fn list_categories(
    locale: Locale,
    deps: &ServerDeps,
) -> Result<Vec<LocalizedCategory>, AppError> {
    let categories = deps.categories.list_all().await?;
    Ok(categories.iter().map(|c| c.localize(locale)).collect())
}

/// The whole tree, localized. Built iteratively: one breadth-first
/// pass to order the nodes, then assembly from the leaves up.
pub async fn list_tree(locale: Locale, deps: &ServerDeps) -> Result<Vec<CategoryNode>, AppError> {
    let all = deps.categories.list_all().await?;

    let mut children_of: HashMap<Option<Uuid>, Vec<&Category>> = HashMap::new();
    for category in &all {
        children_of
            .entry(category.parent_category_id)
            .or_default()
            .push(category);
    }

    let mut order: Vec<&Category> = children_of.get(&None).cloned().unwrap_or_default();
    let mut index = 0;
    while index < order.len() {
        if let Some(children) = children_of.get(&Some(order[index].id)) {
            order.extend(children.iter().copied());
        }
        index += 1;
    }

    let mut built: HashMap<Option<Uuid>, Vec<CategoryNode>> = HashMap::new();
    for category in order.iter().rev() {
        let mut children = built.remove(&Some(category.id)).unwrap_or_default();
        children.reverse();
        built
            .entry(category.parent_category_id)
            .or_default()
            .push(CategoryNode {
                category: category.localize(locale),
                children,
            });
    }

    let mut roots = built.remove(&None).unwrap_or_default();
    roots.reverse();
    Ok(roots)
}

pub async fn update_category(
    id: Uuid,
    body: UpdateCategoryRequest,
    deps: &ServerDeps,
) -> Result<Category, AppError> {
    if body.parent_category_id.is_some() {
        return Err(AppError::BadRequest(
            "The parent cannot be changed here. Use the move operation.".to_string(),
        ));
    }
    if let Some(translations) = &body.translations {
        if english_name(translations).is_none() {
            return Err(AppError::BadRequest(
                "An English translation with a non-empty name is required.".to_string(),
            ));
        }
    }

    let category = deps
        .categories
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Category not found.".to_string()))?;

    let new_slug = body.slug.as_deref().map(slugify);
    if let Some(slug) = &new_slug {
        if slug.is_empty() {
            return Err(AppError::BadRequest(
                "The category name does not produce a usable slug.".to_string(),
            ));
        }
    }

    // A slug change rewrites the tail of the path and ripples down to
    // every descendant.
    let new_full_slug = match &new_slug {
        Some(slug) if *slug != category.slug => Some(match category.full_slug.rfind('/') {
            Some(cut) => format!("{}/{}", &category.full_slug[..cut], slug),
            None => slug.clone(),
        }),
        _ => None,
    };

    let updated = deps
        .categories
        .update(
            id,
            CategoryPatch {
                translations: body.translations,
                slug: new_slug,
                full_slug: new_full_slug.clone(),
            },
        )
        .await
        .map_err(|e| match e {
            StoreError::UniqueViolation(_) => AppError::Conflict(
                "A category with this slug already exists here.".to_string(),
            ),
            other => other.into(),
        })?;

    if new_full_slug.is_some() {
        recompute_descendants(&updated, deps).await?;
    }

    Ok(updated)
}

/// Move a node (and implicitly its subtree) under a new parent, or to
/// the root when `parent_category_id` is null.
pub async fn move_category(
    id: Uuid,
    body: MoveCategoryRequest,
    deps: &ServerDeps,
) -> Result<Category, AppError> {
    let category = deps
        .categories
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Category not found.".to_string()))?;

    let new_full_slug = match body.parent_category_id {
        Some(parent_id) => {
            if parent_id == id {
                return Err(AppError::BadRequest(
                    "A category cannot be its own parent.".to_string(),
                ));
            }
            let parent = deps
                .categories
                .find_by_id(parent_id)
                .await?
                .ok_or_else(|| AppError::NotFound("Parent category not found.".to_string()))?;
            if is_descendant_of(&parent, id, deps).await? {
                return Err(AppError::BadRequest(
                    "A category cannot be moved under its own descendant.".to_string(),
                ));
            }
            format!("{}/{}", parent.full_slug, category.slug)
        }
        None => category.slug.clone(),
    };

    let moved = deps
        .categories
        .update_parent(
            id,
            &category.full_slug,
            body.parent_category_id,
            &new_full_slug,
        )
        .await
        .map_err(|e| match e {
            StoreError::Conflict => AppError::Conflict(
                "The category was moved concurrently. Please retry.".to_string(),
            ),
            StoreError::UniqueViolation(_) => AppError::Conflict(
                "A category with this slug already exists here.".to_string(),
            ),
            other => other.into(),
        })?;

    recompute_descendants(&moved, deps).await?;
    Ok(moved)
}

pub async fn delete_category(id: Uuid, deps: &ServerDeps) -> Result<(), AppError> {
    let deleted = deps.categories.delete(id).await?;
    if deleted == 0 {
        return Err(AppError::NotFound("Category not found.".to_string()));
    }
    Ok(())
}

/// Walk upward from `node`; true if `ancestor_id` appears in its chain.
async fn is_descendant_of(
    node: &Category,
    ancestor_id: Uuid,
    deps: &ServerDeps,
) -> Result<bool, AppError> {
    let mut seen: HashSet<Uuid> = HashSet::from([node.id]);
    let mut parent_id = node.parent_category_id;

    while let Some(current_id) = parent_id {
        if current_id == ancestor_id {
            return Ok(true);
        }
        if !seen.insert(current_id) {
            return Ok(false);
        }
        parent_id = deps
            .categories
            .find_by_id(current_id)
            .await?
            .and_then(|c| c.parent_category_id);
    }

    Ok(false)
}

/// Rewrite full_slug for every descendant after a rename or move.
/// Breadth-first with an explicit queue; each level is derived from
/// the already-rewritten parent path.
async fn recompute_descendants(root: &Category, deps: &ServerDeps) -> Result<(), AppError> {
    let mut queue: VecDeque<(Uuid, String)> = VecDeque::new();
    queue.push_back((root.id, root.full_slug.clone()));

    while let Some((parent_id, parent_full_slug)) = queue.pop_front() {
        for child in deps.categories.list_children(parent_id).await? {
            let child_full_slug = format!("{}/{}", parent_full_slug, child.slug);
            if child_full_slug != child.full_slug {
                deps.categories
                    .update_full_slug(child.id, &child_full_slug)
                    .await?;
            }
            queue.push_back((child.id, child_full_slug));
        }
    }

    Ok(())
}
