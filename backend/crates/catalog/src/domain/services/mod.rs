//! Domain Services
//!
//! Pure rules that span more than one entity.

pub mod hierarchy;
pub mod validation;
