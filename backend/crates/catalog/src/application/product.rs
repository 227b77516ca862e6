//! Product Use Cases
//!
//! Sellers list and manage their own products; admins may manage any
//! product; the storefront reads active products only.

use std::sync::Arc;

use kernel::clock::Clock;
use kernel::id::{CategoryId, ProductId};
use kernel::pagination::PageMeta;

use crate::application::config::CatalogConfig;
use crate::application::query::ProductListParams;
use crate::domain::entity::product::{NewProduct, ProductDraft, ProductPatch, ProductView};
use crate::domain::repository::{CategoryRepository, ProductRepository};
use crate::domain::services::validation::{build_attributes, validate_attributes};
use crate::domain::value_object::actor::Actor;
use crate::domain::value_object::product_query::ProductQuery;
use crate::domain::value_object::product_status::ProductStatus;
use crate::error::{CatalogError, CatalogResult};

/// One page of products
#[derive(Debug)]
pub struct ProductPage {
    pub items: Vec<ProductView>,
    pub meta: PageMeta,
}

pub struct ProductUseCase<R>
where
    R: CategoryRepository + ProductRepository,
{
    repo: Arc<R>,
    config: Arc<CatalogConfig>,
    clock: Arc<dyn Clock>,
}

impl<R> ProductUseCase<R>
where
    R: CategoryRepository + ProductRepository,
{
    pub fn new(repo: Arc<R>, config: Arc<CatalogConfig>, clock: Arc<dyn Clock>) -> Self {
        Self {
            repo,
            config,
            clock,
        }
    }

    pub async fn create(&self, actor: &Actor, draft: ProductDraft) -> CatalogResult<ProductView> {
        if !actor.is_seller {
            return Err(CatalogError::SellerRequired);
        }

        let attributes = build_attributes(draft).map_err(CatalogError::Validation)?;
        self.ensure_category(attributes.category_id).await?;

        let product = self
            .repo
            .create_product(&NewProduct::listed_by(actor.id, attributes, self.clock.now()))
            .await?;

        tracing::info!(product_id = %product.id, seller_id = %actor.id, "Product created");
        self.view(product.id).await
    }

    pub async fn update(
        &self,
        actor: &Actor,
        id: ProductId,
        patch: ProductPatch,
    ) -> CatalogResult<ProductView> {
        let mut product = self
            .repo
            .find_product(id)
            .await?
            .ok_or(CatalogError::ProductNotFound)?;

        if !actor.can_manage(product.seller_id) {
            return Err(CatalogError::NotProductOwner);
        }

        if let Some(category_id) = patch.category_id {
            if category_id != product.attributes.category_id {
                self.ensure_category(category_id).await?;
            }
        }

        patch.apply_to(&mut product);
        validate_attributes(&product.attributes).map_err(CatalogError::Validation)?;
        product.touch(self.clock.now());

        self.repo.update_product(&product).await?;

        tracing::info!(product_id = %id, actor_id = %actor.id, "Product updated");
        self.view(id).await
    }

    pub async fn delete(&self, actor: &Actor, id: ProductId) -> CatalogResult<()> {
        let product = self
            .repo
            .find_product(id)
            .await?
            .ok_or(CatalogError::ProductNotFound)?;

        if !actor.can_manage(product.seller_id) {
            return Err(CatalogError::NotProductOwner);
        }

        if !self.repo.delete_product(id).await? {
            return Err(CatalogError::ProductNotFound);
        }

        tracing::info!(product_id = %id, actor_id = %actor.id, "Product deleted");
        Ok(())
    }

    /// Any product, whatever its status
    pub async fn get_by_id(&self, id: ProductId) -> CatalogResult<ProductView> {
        self.view(id).await
    }

    /// Storefront detail; non-active products are not found
    pub async fn get_public(&self, id: ProductId) -> CatalogResult<ProductView> {
        let view = self.view(id).await?;
        if view.product.status != ProductStatus::Active {
            return Err(CatalogError::ProductNotFound);
        }
        Ok(view)
    }

    pub async fn list_for_seller(
        &self,
        actor: &Actor,
        params: ProductListParams,
    ) -> CatalogResult<ProductPage> {
        let query = params.into_seller_query(actor.id, self.config.seller_page_limit)?;
        self.search(&query).await
    }

    pub async fn list_public(&self, params: ProductListParams) -> CatalogResult<ProductPage> {
        let query = params.into_public_query(self.config.public_page_limit)?;
        self.search(&query).await
    }

    pub async fn search(&self, query: &ProductQuery) -> CatalogResult<ProductPage> {
        let (items, total) = self.repo.search_products(query).await?;
        Ok(ProductPage {
            items,
            meta: PageMeta::new(total, query.page),
        })
    }

    async fn ensure_category(&self, id: CategoryId) -> CatalogResult<()> {
        self.repo
            .find_category(id)
            .await?
            .map(|_| ())
            .ok_or(CatalogError::CategoryNotFound)
    }

    async fn view(&self, id: ProductId) -> CatalogResult<ProductView> {
        self.repo
            .find_product_view(id)
            .await?
            .ok_or(CatalogError::ProductNotFound)
    }
}
