//! Entity Module

pub mod category;
pub mod product;
