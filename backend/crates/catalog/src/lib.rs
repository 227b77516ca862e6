//! Catalog Backend Module
//!
//! Clean Architecture structure:
//! - `domain/` - Categories, products, slug and hierarchy rules, repository traits
//! - `application/` - Use cases and listing parameters
//! - `infra/` - PostgreSQL and in-memory repositories
//! - `presentation/` - HTTP handlers, DTOs, routers
//!
//! ## Features
//! - Category tree with unique slugs and cycle-free re-parenting
//! - Products owned by sellers, editable by their seller or an admin
//! - Filtered, sorted and paginated seller and storefront listings
//!
//! ## Access Model
//! - Category writes are admin-only
//! - Product creation requires a seller account
//! - The storefront only ever shows active products

pub mod application;
pub mod domain;
pub mod error;
pub mod infra;
pub mod presentation;


// Re-exports for convenience
pub use application::config::CatalogConfig;
pub use domain::value_object::actor::Actor;
pub use error::{CatalogError, CatalogResult};
pub use infra::{memory::InMemoryCatalogRepository, postgres::PgCatalogRepository};
pub use presentation::{CatalogAppState, categories_router, products_router};
