//! Product Listing Query
//!
//! Already-validated filters, sort and page for a product search. Built
//! from query-string input by `application::query`.

use kernel::id::{CategoryId, UserId};
use kernel::pagination::PageRequest;
use rust_decimal::Decimal;

use crate::domain::value_object::product_status::ProductStatus;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusFilter {
    #[default]
    Any,
    Only(ProductStatus),
}

impl StatusFilter {
    pub fn matches(&self, status: ProductStatus) -> bool {
        match self {
            StatusFilter::Any => true,
            StatusFilter::Only(wanted) => *wanted == status,
        }
    }
}

/// Sortable product columns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortField {
    #[default]
    CreatedAt,
    UpdatedAt,
    Name,
    Price,
    Stock,
    SalesCount,
}

impl SortField {
    /// Accepts the camelCase field names used by the JSON API
    pub fn from_param(value: &str) -> Option<Self> {
        match value {
            "createdAt" => Some(SortField::CreatedAt),
            "updatedAt" => Some(SortField::UpdatedAt),
            "name" => Some(SortField::Name),
            "price" => Some(SortField::Price),
            "stock" => Some(SortField::Stock),
            "salesCount" => Some(SortField::SalesCount),
            _ => None,
        }
    }

    pub const fn column(&self) -> &'static str {
        match self {
            SortField::CreatedAt => "p.created_at",
            SortField::UpdatedAt => "p.updated_at",
            SortField::Name => "p.name",
            SortField::Price => "p.price",
            SortField::Stock => "p.stock",
            SortField::SalesCount => "p.sales_count",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    /// Case-insensitive `asc` / `desc`
    pub fn from_param(value: &str) -> Option<Self> {
        if value.eq_ignore_ascii_case("asc") {
            Some(SortOrder::Asc)
        } else if value.eq_ignore_ascii_case("desc") {
            Some(SortOrder::Desc)
        } else {
            None
        }
    }

    pub const fn sql(&self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Sort {
    pub field: SortField,
    pub order: SortOrder,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProductQuery {
    /// Case-insensitive substring over name, description, brand and model
    pub search: Option<String>,
    pub status: StatusFilter,
    pub category_id: Option<CategoryId>,
    pub seller_id: Option<UserId>,
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
    pub sort: Sort,
    pub page: PageRequest,
}

impl ProductQuery {
    /// No filters, default sort
    pub fn all(page: PageRequest) -> Self {
        Self {
            search: None,
            status: StatusFilter::Any,
            category_id: None,
            seller_id: None,
            min_price: None,
            max_price: None,
            sort: Sort::default(),
            page,
        }
    }
}
