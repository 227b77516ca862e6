//! HTTP Handlers

use std::sync::Arc;

use auth::domain::repository::UserRepository;
use auth::{AuthAppState, CurrentUser};
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use kernel::clock::Clock;
use kernel::extract::{Json, Path};
use kernel::id::{CategoryId, ProductId};
use kernel::response::ApiResponse;

use crate::application::{
    CatalogConfig, CategoryUseCase, ProductListParams, ProductPage, ProductUseCase,
};
use crate::domain::entity::product::{ProductDraft, ProductPatch};
use crate::domain::repository::{CategoryRepository, ProductRepository};
use crate::domain::value_object::actor::Actor;
use crate::error::CatalogResult;
use crate::presentation::dto::{
    CategoryListQuery, CategoryResponse, CreateCategoryRequest, ProductResponse,
    UpdateCategoryRequest,
};

/// Shared state for catalog handlers; carries the auth state for the gate
pub struct CatalogAppState<R, U> {
    pub repo: Arc<R>,
    pub config: Arc<CatalogConfig>,
    pub clock: Arc<dyn Clock>,
    pub auth: AuthAppState<U>,
}

impl<R, U> Clone for CatalogAppState<R, U> {
    fn clone(&self) -> Self {
        Self {
            repo: self.repo.clone(),
            config: self.config.clone(),
            clock: self.clock.clone(),
            auth: self.auth.clone(),
        }
    }
}

impl<R, U> CatalogAppState<R, U>
where
    R: CategoryRepository + ProductRepository + Send + Sync + 'static,
    U: UserRepository + Send + Sync + 'static,
{
    pub fn new(repo: R, config: CatalogConfig, auth: AuthAppState<U>) -> Self {
        Self {
            repo: Arc::new(repo),
            config: Arc::new(config),
            clock: auth.clock.clone(),
            auth,
        }
    }

    fn categories(&self) -> CategoryUseCase<R> {
        CategoryUseCase::new(self.repo.clone(), self.clock.clone())
    }

    fn products(&self) -> ProductUseCase<R> {
        ProductUseCase::new(self.repo.clone(), self.config.clone(), self.clock.clone())
    }
}

fn page_response(page: ProductPage) -> Json<ApiResponse<Vec<ProductResponse>>> {
    let items = page.items.into_iter().map(ProductResponse::from).collect();
    Json(ApiResponse::paginated(items, page.meta))
}

// ============================================================================
// Categories
// ============================================================================

/// GET /api/categories
pub async fn list_categories<R, U>(
    State(state): State<CatalogAppState<R, U>>,
    Query(query): Query<CategoryListQuery>,
) -> CatalogResult<Json<ApiResponse<Vec<CategoryResponse>>>>
where
    R: CategoryRepository + ProductRepository + Send + Sync + 'static,
    U: UserRepository + Send + Sync + 'static,
{
    let nodes = state
        .categories()
        .list_all(query.include_inactive())
        .await?;
    Ok(Json(ApiResponse::ok(
        nodes.into_iter().map(CategoryResponse::from).collect(),
    )))
}

/// GET /api/categories/id/{id}
pub async fn get_category_by_id<R, U>(
    State(state): State<CatalogAppState<R, U>>,
    Path(id): Path<CategoryId>,
) -> CatalogResult<Json<ApiResponse<CategoryResponse>>>
where
    R: CategoryRepository + ProductRepository + Send + Sync + 'static,
    U: UserRepository + Send + Sync + 'static,
{
    let node = state.categories().get_by_id(id).await?;
    Ok(Json(ApiResponse::ok(CategoryResponse::from(node))))
}

/// GET /api/categories/slug/{slug}
pub async fn get_category_by_slug<R, U>(
    State(state): State<CatalogAppState<R, U>>,
    Path(slug): Path<String>,
) -> CatalogResult<Json<ApiResponse<CategoryResponse>>>
where
    R: CategoryRepository + ProductRepository + Send + Sync + 'static,
    U: UserRepository + Send + Sync + 'static,
{
    let node = state.categories().get_by_slug(&slug).await?;
    Ok(Json(ApiResponse::ok(CategoryResponse::from(node))))
}

/// POST /api/categories
pub async fn create_category<R, U>(
    State(state): State<CatalogAppState<R, U>>,
    CurrentUser(user): CurrentUser,
    Json(req): Json<CreateCategoryRequest>,
) -> CatalogResult<impl IntoResponse>
where
    R: CategoryRepository + ProductRepository + Send + Sync + 'static,
    U: UserRepository + Send + Sync + 'static,
{
    let category = state
        .categories()
        .create(&Actor::from(&user), req.into())
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok(CategoryResponse::from(category)).with_message("Category created")),
    ))
}

/// PUT /api/categories/{id}
pub async fn update_category<R, U>(
    State(state): State<CatalogAppState<R, U>>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<CategoryId>,
    Json(req): Json<UpdateCategoryRequest>,
) -> CatalogResult<Json<ApiResponse<CategoryResponse>>>
where
    R: CategoryRepository + ProductRepository + Send + Sync + 'static,
    U: UserRepository + Send + Sync + 'static,
{
    let category = state
        .categories()
        .update(&Actor::from(&user), id, req.into())
        .await?;

    Ok(Json(
        ApiResponse::ok(CategoryResponse::from(category)).with_message("Category updated"),
    ))
}

/// DELETE /api/categories/{id}
pub async fn delete_category<R, U>(
    State(state): State<CatalogAppState<R, U>>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<CategoryId>,
) -> CatalogResult<Json<ApiResponse<()>>>
where
    R: CategoryRepository + ProductRepository + Send + Sync + 'static,
    U: UserRepository + Send + Sync + 'static,
{
    state
        .categories()
        .delete(&Actor::from(&user), id)
        .await?;
    Ok(Json(ApiResponse::message("Category deleted")))
}

// ============================================================================
// Products (seller / admin)
// ============================================================================

/// GET /api/products
pub async fn list_seller_products<R, U>(
    State(state): State<CatalogAppState<R, U>>,
    CurrentUser(user): CurrentUser,
    Query(params): Query<ProductListParams>,
) -> CatalogResult<Json<ApiResponse<Vec<ProductResponse>>>>
where
    R: CategoryRepository + ProductRepository + Send + Sync + 'static,
    U: UserRepository + Send + Sync + 'static,
{
    let page = state
        .products()
        .list_for_seller(&Actor::from(&user), params)
        .await?;
    Ok(page_response(page))
}

/// POST /api/products
pub async fn create_product<R, U>(
    State(state): State<CatalogAppState<R, U>>,
    CurrentUser(user): CurrentUser,
    Json(draft): Json<ProductDraft>,
) -> CatalogResult<impl IntoResponse>
where
    R: CategoryRepository + ProductRepository + Send + Sync + 'static,
    U: UserRepository + Send + Sync + 'static,
{
    let view = state
        .products()
        .create(&Actor::from(&user), draft)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok(ProductResponse::from(view)).with_message("Product created")),
    ))
}

/// GET /api/products/{id}
pub async fn get_product<R, U>(
    State(state): State<CatalogAppState<R, U>>,
    Path(id): Path<ProductId>,
) -> CatalogResult<Json<ApiResponse<ProductResponse>>>
where
    R: CategoryRepository + ProductRepository + Send + Sync + 'static,
    U: UserRepository + Send + Sync + 'static,
{
    let view = state.products().get_by_id(id).await?;
    Ok(Json(ApiResponse::ok(ProductResponse::from(view))))
}

/// PUT /api/products/{id}
pub async fn update_product<R, U>(
    State(state): State<CatalogAppState<R, U>>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<ProductId>,
    Json(patch): Json<ProductPatch>,
) -> CatalogResult<Json<ApiResponse<ProductResponse>>>
where
    R: CategoryRepository + ProductRepository + Send + Sync + 'static,
    U: UserRepository + Send + Sync + 'static,
{
    let view = state
        .products()
        .update(&Actor::from(&user), id, patch)
        .await?;

    Ok(Json(
        ApiResponse::ok(ProductResponse::from(view)).with_message("Product updated"),
    ))
}

/// DELETE /api/products/{id}
pub async fn delete_product<R, U>(
    State(state): State<CatalogAppState<R, U>>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<ProductId>,
) -> CatalogResult<Json<ApiResponse<()>>>
where
    R: CategoryRepository + ProductRepository + Send + Sync + 'static,
    U: UserRepository + Send + Sync + 'static,
{
    state
        .products()
        .delete(&Actor::from(&user), id)
        .await?;
    Ok(Json(ApiResponse::message("Product deleted")))
}

// ============================================================================
// Storefront
// ============================================================================

/// GET /api/products/public
pub async fn list_public_products<R, U>(
    State(state): State<CatalogAppState<R, U>>,
    Query(params): Query<ProductListParams>,
) -> CatalogResult<Json<ApiResponse<Vec<ProductResponse>>>>
where
    R: CategoryRepository + ProductRepository + Send + Sync + 'static,
    U: UserRepository + Send + Sync + 'static,
{
    let page = state.products().list_public(params).await?;
    Ok(page_response(page))
}

/// GET /api/products/public/{id}
pub async fn get_public_product<R, U>(
    State(state): State<CatalogAppState<R, U>>,
    Path(id): Path<ProductId>,
) -> CatalogResult<Json<ApiResponse<ProductResponse>>>
where
    R: CategoryRepository + ProductRepository + Send + Sync + 'static,
    U: UserRepository + Send + Sync + 'static,
{
    let view = state.products().get_public(id).await?;
    Ok(Json(ApiResponse::ok(ProductResponse::from(view))))
}
