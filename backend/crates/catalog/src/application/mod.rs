//! Application Layer
//!
//! Use cases and application services.

pub mod category;
pub mod config;
pub mod product;
pub mod query;

// Re-exports
pub use category::{CategoryUseCase, CreateCategoryInput, UpdateCategoryInput};
pub use config::CatalogConfig;
pub use product::{ProductPage, ProductUseCase};
pub use query::ProductListParams;
