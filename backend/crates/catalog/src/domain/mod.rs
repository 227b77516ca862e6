//! Domain Layer
//!
//! Contains entities, value objects, domain services, and repository traits.

pub mod entity;
pub mod repository;
pub mod services;
pub mod value_object;

// Re-exports
pub use entity::category::{Category, CategoryNode, CategoryRef, NewCategory, SubcategorySummary};
pub use entity::product::{
    NewProduct, Product, ProductAttributes, ProductDraft, ProductPatch, ProductView, SellerRef,
};
pub use repository::{CategoryRepository, ProductRepository};
pub use value_object::{actor::Actor, product_status::ProductStatus, slug::Slug};
