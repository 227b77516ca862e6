//! Catalog Error Types
//!
//! Category and product failures, mapped onto the shared
//! `kernel::error::AppError` taxonomy.

use axum::response::{IntoResponse, Response};
use kernel::error::{app_error::AppError, field::FieldError, kind::ErrorKind};
use thiserror::Error;

/// Catalog-specific result type alias
pub type CatalogResult<T> = Result<T, CatalogError>;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Only administrators can manage categories")]
    AdminRequired,

    #[error("Only sellers can create products")]
    SellerRequired,

    /// Neither the seller of the product nor an admin
    #[error("You do not have permission to modify this product")]
    NotProductOwner,

    #[error("Category not found")]
    CategoryNotFound,

    #[error("Parent category not found")]
    ParentCategoryNotFound,

    #[error("Product not found")]
    ProductNotFound,

    #[error("A category cannot be its own parent")]
    SelfParent,

    /// New parent lies inside the category's own subtree
    #[error("Cyclic category hierarchies are not allowed")]
    CyclicHierarchy,

    #[error("A category with this slug already exists")]
    SlugTaken,

    #[error("Cannot delete a category that still has products")]
    CategoryHasProducts,

    #[error("Cannot delete a category that still has subcategories")]
    CategoryHasSubcategories,

    /// Input failed field validation
    #[error("Validation failed")]
    Validation(Vec<FieldError>),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl CatalogError {
    /// Single-field validation failure
    pub fn field(field: &str, message: impl Into<String>) -> Self {
        CatalogError::Validation(vec![FieldError::new(field, message)])
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            CatalogError::AdminRequired
            | CatalogError::SellerRequired
            | CatalogError::NotProductOwner => ErrorKind::Forbidden,
            CatalogError::CategoryNotFound
            | CatalogError::ParentCategoryNotFound
            | CatalogError::ProductNotFound => ErrorKind::NotFound,
            CatalogError::SelfParent | CatalogError::Validation(_) => ErrorKind::Validation,
            CatalogError::CyclicHierarchy
            | CatalogError::SlugTaken
            | CatalogError::CategoryHasProducts
            | CatalogError::CategoryHasSubcategories => ErrorKind::Conflict,
            CatalogError::Database(_) | CatalogError::Internal(_) => ErrorKind::Internal,
        }
    }

    pub fn into_app_error(self) -> AppError {
        match self {
            CatalogError::Validation(errors) => {
                AppError::validation("Validation failed").with_field_errors(errors)
            }
            CatalogError::Database(e) => AppError::from(e),
            CatalogError::Internal(msg) => {
                AppError::internal("Internal server error").with_source(InternalDetail(msg))
            }
            other => AppError::new(other.kind(), other.to_string()),
        }
    }

    fn log(&self) {
        match self {
            CatalogError::Database(e) => {
                tracing::error!(error = %e, "Catalog database error");
            }
            CatalogError::Internal(msg) => {
                tracing::error!(message = %msg, "Catalog internal error");
            }
            CatalogError::AdminRequired
            | CatalogError::SellerRequired
            | CatalogError::NotProductOwner => {
                tracing::warn!(error = %self, "Catalog permission denied");
            }
            _ => {
                tracing::debug!(error = %self, "Catalog error");
            }
        }
    }
}

impl IntoResponse for CatalogError {
    fn into_response(self) -> Response {
        self.log();
        self.into_app_error().into_response()
    }
}

impl From<AppError> for CatalogError {
    fn from(err: AppError) -> Self {
        CatalogError::Internal(err.to_string())
    }
}

/// Carries an internal message as an error source so it only surfaces
/// when details are exposed
#[derive(Debug, Error)]
#[error("{0}")]
struct InternalDetail(String);
