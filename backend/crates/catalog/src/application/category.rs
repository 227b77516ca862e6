//! Category Use Cases
//!
//! Admin-only writes and public reads over the category tree.

use std::sync::Arc;

use kernel::clock::Clock;
use kernel::error::field::FieldErrors;
use kernel::id::CategoryId;

use crate::domain::entity::category::{Category, CategoryNode, NewCategory, normalize_name};
use crate::domain::repository::{CategoryRepository, ProductRepository};
use crate::domain::services::hierarchy::{creates_cycle, with_children};
use crate::domain::value_object::{actor::Actor, slug::Slug};
use crate::error::{CatalogError, CatalogResult};

#[derive(Debug, Default)]
pub struct CreateCategoryInput {
    pub name: String,
    /// Derived from `name` when absent
    pub slug: Option<String>,
    pub description: Option<String>,
    pub icon: Option<String>,
    pub parent_id: Option<CategoryId>,
    pub is_active: Option<bool>,
}

/// Partial update; `Some(None)` clears a nullable field
#[derive(Debug, Default)]
pub struct UpdateCategoryInput {
    pub name: Option<String>,
    pub slug: Option<String>,
    pub description: Option<Option<String>>,
    pub icon: Option<Option<String>>,
    pub parent_id: Option<Option<CategoryId>>,
    pub is_active: Option<bool>,
}

pub struct CategoryUseCase<R>
where
    R: CategoryRepository + ProductRepository,
{
    repo: Arc<R>,
    clock: Arc<dyn Clock>,
}

impl<R> CategoryUseCase<R>
where
    R: CategoryRepository + ProductRepository,
{
    pub fn new(repo: Arc<R>, clock: Arc<dyn Clock>) -> Self {
        Self { repo, clock }
    }

    pub async fn create(&self, actor: &Actor, input: CreateCategoryInput) -> CatalogResult<Category> {
        ensure_admin(actor)?;

        if let Some(parent_id) = input.parent_id {
            self.repo
                .find_category(parent_id)
                .await?
                .ok_or(CatalogError::ParentCategoryNotFound)?;
        }

        let (name, slug) = name_and_slug(&input.name, input.slug.as_deref())?;

        if self.repo.slug_exists(&slug, None).await? {
            return Err(CatalogError::SlugTaken);
        }

        let category = self
            .repo
            .create_category(&NewCategory {
                name,
                slug,
                description: input.description,
                icon: input.icon,
                parent_id: input.parent_id,
                is_active: input.is_active.unwrap_or(true),
                created_at: self.clock.now(),
            })
            .await?;

        tracing::info!(category_id = %category.id, slug = %category.slug, "Category created");
        Ok(category)
    }

    pub async fn update(
        &self,
        actor: &Actor,
        id: CategoryId,
        input: UpdateCategoryInput,
    ) -> CatalogResult<Category> {
        ensure_admin(actor)?;

        let mut category = self
            .repo
            .find_category(id)
            .await?
            .ok_or(CatalogError::CategoryNotFound)?;

        if let Some(parent_id) = input.parent_id {
            if parent_id != category.parent_id {
                if let Some(parent_id) = parent_id {
                    self.check_new_parent(id, parent_id).await?;
                }
                category.parent_id = parent_id;
            }
        }

        let mut errors = FieldErrors::new();
        let renamed = match input.name.as_deref().map(normalize_name) {
            Some(Ok(name)) => {
                let changed = name != category.name;
                category.name = name;
                changed
            }
            Some(Err(message)) => {
                errors.push("name", message);
                false
            }
            None => false,
        };

        let new_slug = match input.slug.as_deref() {
            Some(explicit) => Slug::parse(explicit)
                .map(Some)
                .unwrap_or_else(|message| {
                    errors.push("slug", message);
                    None
                }),
            None if renamed => Slug::derive(&category.name).or_else(|| {
                errors.push("slug", "Could not derive a slug from the name");
                None
            }),
            None => None,
        };
        errors.finish().map_err(CatalogError::Validation)?;

        if let Some(slug) = new_slug {
            if slug != category.slug && self.repo.slug_exists(&slug, Some(id)).await? {
                return Err(CatalogError::SlugTaken);
            }
            category.slug = slug;
        }

        if let Some(description) = input.description {
            category.description = description;
        }
        if let Some(icon) = input.icon {
            category.icon = icon;
        }
        if let Some(is_active) = input.is_active {
            category.is_active = is_active;
        }
        category.touch(self.clock.now());

        self.repo.update_category(&category).await?;

        tracing::info!(category_id = %id, "Category updated");
        Ok(category)
    }

    pub async fn delete(&self, actor: &Actor, id: CategoryId) -> CatalogResult<()> {
        ensure_admin(actor)?;

        self.repo
            .find_category(id)
            .await?
            .ok_or(CatalogError::CategoryNotFound)?;

        if self.repo.count_by_category(id).await? > 0 {
            return Err(CatalogError::CategoryHasProducts);
        }
        if self.repo.count_children(id).await? > 0 {
            return Err(CatalogError::CategoryHasSubcategories);
        }

        if !self.repo.delete_category(id).await? {
            return Err(CatalogError::CategoryNotFound);
        }

        tracing::info!(category_id = %id, "Category deleted");
        Ok(())
    }

    /// Every category with its immediate children, both ordered by name
    pub async fn list_all(&self, include_inactive: bool) -> CatalogResult<Vec<CategoryNode>> {
        let categories = self.repo.find_categories(include_inactive).await?;

        Ok(with_children(categories)
            .into_iter()
            .map(|(category, subcategories)| CategoryNode {
                category,
                parent: None,
                subcategories,
            })
            .collect())
    }

    /// Category with all of its children and its parent
    pub async fn get_by_id(&self, id: CategoryId) -> CatalogResult<CategoryNode> {
        let category = self
            .repo
            .find_category(id)
            .await?
            .ok_or(CatalogError::CategoryNotFound)?;
        self.node(category, true).await
    }

    /// Category with its active children and its parent
    pub async fn get_by_slug(&self, slug: &str) -> CatalogResult<CategoryNode> {
        let category = self
            .repo
            .find_category_by_slug(&Slug::from_db(slug.trim()))
            .await?
            .ok_or(CatalogError::CategoryNotFound)?;
        self.node(category, false).await
    }

    async fn node(&self, category: Category, include_inactive: bool) -> CatalogResult<CategoryNode> {
        let subcategories = self
            .repo
            .find_children(category.id, include_inactive)
            .await?
            .iter()
            .map(Category::to_summary)
            .collect();

        let parent = match category.parent_id {
            Some(parent_id) => self
                .repo
                .find_category(parent_id)
                .await?
                .map(|p| p.to_ref()),
            None => None,
        };

        Ok(CategoryNode {
            category,
            parent,
            subcategories,
        })
    }

    /// Rejects a parent that is the category itself, missing, or inside
    /// the category's subtree
    async fn check_new_parent(&self, id: CategoryId, parent_id: CategoryId) -> CatalogResult<()> {
        if parent_id == id {
            return Err(CatalogError::SelfParent);
        }

        self.repo
            .find_category(parent_id)
            .await?
            .ok_or(CatalogError::ParentCategoryNotFound)?;

        let links = self.repo.parent_links().await?;
        if creates_cycle(id, parent_id, &links) {
            tracing::warn!(category_id = %id, parent_id = %parent_id, "Rejected cyclic re-parent");
            return Err(CatalogError::CyclicHierarchy);
        }

        Ok(())
    }
}

fn ensure_admin(actor: &Actor) -> CatalogResult<()> {
    if actor.is_admin {
        Ok(())
    } else {
        Err(CatalogError::AdminRequired)
    }
}

/// Validated name plus the explicit or derived slug, all errors at once
fn name_and_slug(name: &str, explicit_slug: Option<&str>) -> CatalogResult<(String, Slug)> {
    let mut errors = FieldErrors::new();

    let name = normalize_name(name)
        .map_err(|message| errors.push("name", message))
        .ok();

    let slug = match (explicit_slug, &name) {
        (Some(explicit), _) => Slug::parse(explicit)
            .map_err(|message| errors.push("slug", message))
            .ok(),
        (None, Some(name)) => Slug::derive(name).or_else(|| {
            errors.push("slug", "Could not derive a slug from the name");
            None
        }),
        (None, None) => None,
    };

    match (name, slug) {
        (Some(name), Some(slug)) if errors.is_empty() => Ok((name, slug)),
        _ => Err(CatalogError::Validation(errors.into_vec())),
    }
}
