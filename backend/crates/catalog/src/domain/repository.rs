//! Repository Traits
//!
//! Interfaces for data persistence. Implementations are in the infra layer.

use kernel::id::{CategoryId, ProductId};

use crate::domain::entity::category::{Category, NewCategory};
use crate::domain::entity::product::{NewProduct, Product, ProductView};
use crate::domain::services::hierarchy::ParentLink;
use crate::domain::value_object::product_query::ProductQuery;
use crate::domain::value_object::slug::Slug;
use crate::error::CatalogResult;

/// Category repository trait
#[trait_variant::make(CategoryRepository: Send)]
pub trait LocalCategoryRepository {
    /// Insert a category. A duplicate slug is `CatalogError::SlugTaken`.
    async fn create_category(&self, category: &NewCategory) -> CatalogResult<Category>;

    async fn find_category(&self, id: CategoryId) -> CatalogResult<Option<Category>>;

    async fn find_category_by_slug(&self, slug: &Slug) -> CatalogResult<Option<Category>>;

    /// Whether another category (not `excluding`) already uses `slug`
    async fn slug_exists(
        &self,
        slug: &Slug,
        excluding: Option<CategoryId>,
    ) -> CatalogResult<bool>;

    /// Every category ordered by name, optionally only active ones
    async fn find_categories(&self, include_inactive: bool) -> CatalogResult<Vec<Category>>;

    /// Immediate children ordered by name
    async fn find_children(
        &self,
        parent: CategoryId,
        include_inactive: bool,
    ) -> CatalogResult<Vec<Category>>;

    /// `(id, parent_id)` for every category, for cycle checks
    async fn parent_links(&self) -> CatalogResult<Vec<ParentLink>>;

    /// Persist every mutable field. A duplicate slug is `CatalogError::SlugTaken`.
    async fn update_category(&self, category: &Category) -> CatalogResult<()>;

    /// Returns whether a row was removed
    async fn delete_category(&self, id: CategoryId) -> CatalogResult<bool>;

    async fn count_children(&self, id: CategoryId) -> CatalogResult<u64>;
}

/// Product repository trait
#[trait_variant::make(ProductRepository: Send)]
pub trait LocalProductRepository {
    async fn create_product(&self, product: &NewProduct) -> CatalogResult<Product>;

    async fn find_product(&self, id: ProductId) -> CatalogResult<Option<Product>>;

    /// Product joined with its category and seller
    async fn find_product_view(&self, id: ProductId) -> CatalogResult<Option<ProductView>>;

    async fn update_product(&self, product: &Product) -> CatalogResult<()>;

    /// Returns whether a row was removed
    async fn delete_product(&self, id: ProductId) -> CatalogResult<bool>;

    async fn count_by_category(&self, category: CategoryId) -> CatalogResult<u64>;

    /// One page of matches plus the total match count
    async fn search_products(&self, query: &ProductQuery) -> CatalogResult<(Vec<ProductView>, u64)>;
}
