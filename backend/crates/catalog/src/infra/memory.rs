//! In-Memory Repository
//!
//! Process-local categories and products used by tests and local tooling.
//! Mirrors the Postgres constraints that matter to the use cases: unique
//! slugs, `ON DELETE SET NULL` on the parent link and case-insensitive
//! search.

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use kernel::id::{CategoryId, ProductId, UserId};
use tokio::sync::RwLock;

use crate::domain::entity::category::{Category, NewCategory};
use crate::domain::entity::product::{NewProduct, Product, ProductView, SellerRef};
use crate::domain::repository::{CategoryRepository, ProductRepository};
use crate::domain::services::hierarchy::ParentLink;
use crate::domain::value_object::product_query::{ProductQuery, SortField, SortOrder};
use crate::domain::value_object::slug::Slug;
use crate::error::{CatalogError, CatalogResult};

#[derive(Default)]
struct Store {
    categories: BTreeMap<CategoryId, Category>,
    products: BTreeMap<ProductId, Product>,
    sellers: HashMap<UserId, SellerRef>,
    last_category_id: i64,
    last_product_id: i64,
}

impl Store {
    fn view(&self, product: &Product) -> ProductView {
        ProductView {
            product: product.clone(),
            category: self
                .categories
                .get(&product.attributes.category_id)
                .map(Category::to_ref),
            seller: self.sellers.get(&product.seller_id).cloned(),
        }
    }

    fn sorted_categories<'a>(&self, items: impl Iterator<Item = &'a Category>) -> Vec<Category> {
        let mut out: Vec<Category> = items.cloned().collect();
        out.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        out
    }
}

#[derive(Clone, Default)]
pub struct InMemoryCatalogRepository {
    store: Arc<RwLock<Store>>,
}

impl InMemoryCatalogRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the public seller card joined onto product views
    pub async fn upsert_seller(&self, seller: SellerRef) {
        self.store.write().await.sellers.insert(seller.id, seller);
    }

    pub async fn product_count(&self) -> usize {
        self.store.read().await.products.len()
    }
}

impl CategoryRepository for InMemoryCatalogRepository {
    async fn create_category(&self, category: &NewCategory) -> CatalogResult<Category> {
        let mut store = self.store.write().await;
        if store.categories.values().any(|c| c.slug == category.slug) {
            return Err(CatalogError::SlugTaken);
        }

        store.last_category_id += 1;
        let created = category
            .clone()
            .into_category(CategoryId::from_i64(store.last_category_id));
        store.categories.insert(created.id, created.clone());
        Ok(created)
    }

    async fn find_category(&self, id: CategoryId) -> CatalogResult<Option<Category>> {
        Ok(self.store.read().await.categories.get(&id).cloned())
    }

    async fn find_category_by_slug(&self, slug: &Slug) -> CatalogResult<Option<Category>> {
        let store = self.store.read().await;
        Ok(store.categories.values().find(|c| &c.slug == slug).cloned())
    }

    async fn slug_exists(&self, slug: &Slug, excluding: Option<CategoryId>) -> CatalogResult<bool> {
        let store = self.store.read().await;
        Ok(store
            .categories
            .values()
            .any(|c| &c.slug == slug && Some(c.id) != excluding))
    }

    async fn find_categories(&self, include_inactive: bool) -> CatalogResult<Vec<Category>> {
        let store = self.store.read().await;
        Ok(store.sorted_categories(
            store
                .categories
                .values()
                .filter(|c| include_inactive || c.is_active),
        ))
    }

    async fn find_children(
        &self,
        parent: CategoryId,
        include_inactive: bool,
    ) -> CatalogResult<Vec<Category>> {
        let store = self.store.read().await;
        Ok(store.sorted_categories(
            store
                .categories
                .values()
                .filter(|c| c.parent_id == Some(parent) && (include_inactive || c.is_active)),
        ))
    }

    async fn parent_links(&self) -> CatalogResult<Vec<ParentLink>> {
        let store = self.store.read().await;
        Ok(store
            .categories
            .values()
            .map(|c| (c.id, c.parent_id))
            .collect())
    }

    async fn update_category(&self, category: &Category) -> CatalogResult<()> {
        let mut store = self.store.write().await;
        if store
            .categories
            .values()
            .any(|c| c.id != category.id && c.slug == category.slug)
        {
            return Err(CatalogError::SlugTaken);
        }
        if let Some(existing) = store.categories.get_mut(&category.id) {
            *existing = category.clone();
        }
        Ok(())
    }

    async fn delete_category(&self, id: CategoryId) -> CatalogResult<bool> {
        let mut store = self.store.write().await;
        let removed = store.categories.remove(&id).is_some();
        if removed {
            for child in store.categories.values_mut() {
                if child.parent_id == Some(id) {
                    child.parent_id = None;
                }
            }
        }
        Ok(removed)
    }

    async fn count_children(&self, id: CategoryId) -> CatalogResult<u64> {
        let store = self.store.read().await;
        Ok(store
            .categories
            .values()
            .filter(|c| c.parent_id == Some(id))
            .count() as u64)
    }
}

impl ProductRepository for InMemoryCatalogRepository {
    async fn create_product(&self, product: &NewProduct) -> CatalogResult<Product> {
        let mut store = self.store.write().await;
        store.last_product_id += 1;
        let created = product
            .clone()
            .into_product(ProductId::from_i64(store.last_product_id));
        store.products.insert(created.id, created.clone());
        Ok(created)
    }

    async fn find_product(&self, id: ProductId) -> CatalogResult<Option<Product>> {
        Ok(self.store.read().await.products.get(&id).cloned())
    }

    async fn find_product_view(&self, id: ProductId) -> CatalogResult<Option<ProductView>> {
        let store = self.store.read().await;
        Ok(store.products.get(&id).map(|p| store.view(p)))
    }

    async fn update_product(&self, product: &Product) -> CatalogResult<()> {
        let mut store = self.store.write().await;
        if let Some(existing) = store.products.get_mut(&product.id) {
            *existing = product.clone();
        }
        Ok(())
    }

    async fn delete_product(&self, id: ProductId) -> CatalogResult<bool> {
        Ok(self.store.write().await.products.remove(&id).is_some())
    }

    async fn count_by_category(&self, category: CategoryId) -> CatalogResult<u64> {
        let store = self.store.read().await;
        Ok(store
            .products
            .values()
            .filter(|p| p.attributes.category_id == category)
            .count() as u64)
    }

    async fn search_products(&self, query: &ProductQuery) -> CatalogResult<(Vec<ProductView>, u64)> {
        let store = self.store.read().await;
        let needle = query.search.as_deref().map(str::to_lowercase);

        let mut matches: Vec<&Product> = store
            .products
            .values()
            .filter(|p| matches_query(p, query, needle.as_deref()))
            .collect();
        matches.sort_by(|a, b| {
            let ordering = compare(a, b, query.sort.field).then(a.id.cmp(&b.id));
            match query.sort.order {
                SortOrder::Asc => ordering,
                SortOrder::Desc => ordering.reverse(),
            }
        });

        let total = matches.len() as u64;
        let page = matches
            .into_iter()
            .skip(query.page.offset() as usize)
            .take(query.page.limit() as usize)
            .map(|p| store.view(p))
            .collect();

        Ok((page, total))
    }
}

fn matches_query(product: &Product, query: &ProductQuery, needle: Option<&str>) -> bool {
    let attrs = &product.attributes;

    if !query.status.matches(product.status) {
        return false;
    }
    if query.category_id.is_some_and(|id| id != attrs.category_id) {
        return false;
    }
    if query.seller_id.is_some_and(|id| id != product.seller_id) {
        return false;
    }
    if query.min_price.is_some_and(|min| attrs.price < min) {
        return false;
    }
    if query.max_price.is_some_and(|max| attrs.price > max) {
        return false;
    }

    match needle {
        Some(needle) => [&attrs.name, &attrs.description, &attrs.brand, &attrs.model]
            .iter()
            .any(|text| text.to_lowercase().contains(needle)),
        None => true,
    }
}

fn compare(a: &Product, b: &Product, field: SortField) -> Ordering {
    match field {
        SortField::CreatedAt => a.created_at.cmp(&b.created_at),
        SortField::UpdatedAt => a.updated_at.cmp(&b.updated_at),
        SortField::Name => a.attributes.name.cmp(&b.attributes.name),
        SortField::Price => a.attributes.price.cmp(&b.attributes.price),
        SortField::Stock => a.attributes.stock.cmp(&b.attributes.stock),
        SortField::SalesCount => a.sales_count.cmp(&b.sales_count),
    }
}
