//! Shared Kernel - Domain-crossing minimal core
//!
//! This crate contains the "smallest core" of domain vocabulary:
//! - Common error types and result aliases
//! - Typed numeric IDs for users, categories and products
//! - The clock abstraction used by every expiring cache
//! - Pagination, partial-update helpers and the JSON response envelope
//! - Request extractors whose rejections use that envelope (`axum` feature)
//!
//! **Design Principle**: Only include things that are "hard to change"
//! and have consistent meaning across all domains.

pub mod error {
    pub mod app_error;
    pub mod conversions;
    pub mod exposure;
    pub mod field;
    pub mod kind;
}
pub mod clock;
#[cfg(feature = "axum")]
pub mod extract;
pub mod id;
pub mod pagination;
pub mod patch;
pub mod response;
