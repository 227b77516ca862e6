//! Category Entity
//!
//! Categories form a forest through the nullable `parent_id`
//! self-reference. The hierarchy is kept acyclic by the update use case.

use chrono::{DateTime, Utc};
use kernel::id::CategoryId;
use serde::Serialize;

use crate::domain::value_object::slug::Slug;

/// Maximum category name length, in characters
pub const CATEGORY_NAME_MAX_LENGTH: usize = 100;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    pub slug: Slug,
    pub description: Option<String>,
    pub icon: Option<String>,
    pub parent_id: Option<CategoryId>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Category {
    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = now;
    }

    pub fn to_ref(&self) -> CategoryRef {
        CategoryRef {
            id: self.id,
            name: self.name.clone(),
            slug: self.slug.clone(),
        }
    }

    pub fn to_summary(&self) -> SubcategorySummary {
        SubcategorySummary {
            id: self.id,
            name: self.name.clone(),
            slug: self.slug.clone(),
            icon: self.icon.clone(),
            is_active: self.is_active,
        }
    }
}

/// Trim and validate a category name
pub fn normalize_name(name: &str) -> Result<String, &'static str> {
    let name = name.trim();
    if name.is_empty() {
        return Err("Category name is required");
    }
    if name.chars().count() > CATEGORY_NAME_MAX_LENGTH {
        return Err("Category name must be at most 100 characters");
    }
    Ok(name.to_string())
}

/// Category before insertion
#[derive(Debug, Clone)]
pub struct NewCategory {
    pub name: String,
    pub slug: Slug,
    pub description: Option<String>,
    pub icon: Option<String>,
    pub parent_id: Option<CategoryId>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl NewCategory {
    pub fn into_category(self, id: CategoryId) -> Category {
        Category {
            id,
            name: self.name,
            slug: self.slug,
            description: self.description,
            icon: self.icon,
            parent_id: self.parent_id,
            is_active: self.is_active,
            created_at: self.created_at,
            updated_at: self.created_at,
        }
    }
}

/// `{ id, name, slug }` as attached to products and child categories
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryRef {
    pub id: CategoryId,
    pub name: String,
    pub slug: Slug,
}

/// Immediate child as listed under its parent
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubcategorySummary {
    pub id: CategoryId,
    pub name: String,
    pub slug: Slug,
    pub icon: Option<String>,
    pub is_active: bool,
}

/// A category with its neighbourhood in the tree
#[derive(Debug, Clone)]
pub struct CategoryNode {
    pub category: Category,
    pub parent: Option<CategoryRef>,
    pub subcategories: Vec<SubcategorySummary>,
}
