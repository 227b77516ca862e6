use derive_more::Display;
use serde::{Deserialize, Serialize};

/// Listing state of a product. Only `active` products are publicly visible.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProductStatus {
    #[default]
    #[display("active")]
    Active,
    #[display("inactive")]
    Inactive,
    #[display("pending")]
    Pending,
}

impl ProductStatus {
    #[inline]
    pub const fn code(&self) -> &'static str {
        match self {
            ProductStatus::Active => "active",
            ProductStatus::Inactive => "inactive",
            ProductStatus::Pending => "pending",
        }
    }

    #[inline]
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "active" => Some(ProductStatus::Active),
            "inactive" => Some(ProductStatus::Inactive),
            "pending" => Some(ProductStatus::Pending),
            _ => None,
        }
    }
}
