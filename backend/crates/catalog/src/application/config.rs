//! Application Configuration
//!
//! Configuration for the Catalog application layer.

/// Catalog application configuration
#[derive(Debug, Clone)]
pub struct CatalogConfig {
    /// Default page size for a seller's own product list
    pub seller_page_limit: u32,
    /// Default page size for the public storefront
    pub public_page_limit: u32,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            seller_page_limit: 10,
            public_page_limit: 12,
        }
    }
}

impl CatalogConfig {
    pub fn development() -> Self {
        Self::default()
    }
}
