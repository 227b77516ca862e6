//! Value Object Module

pub mod actor;
pub mod product_query;
pub mod product_status;
pub mod slug;
