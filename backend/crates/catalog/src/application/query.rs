//! Product Listing Parameters
//!
//! Turns raw query-string values into a [`ProductQuery`]. Paging and price
//! bounds are lenient (garbage falls back to defaults); sort, status and
//! id filters are strict and fail with a field error.

use std::str::FromStr;

use kernel::error::field::FieldErrors;
use kernel::id::{CategoryId, UserId};
use kernel::pagination::PageRequest;
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::domain::value_object::product_query::{
    ProductQuery, Sort, SortField, SortOrder, StatusFilter,
};
use crate::domain::value_object::product_status::ProductStatus;
use crate::error::{CatalogError, CatalogResult};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductListParams {
    pub page: Option<String>,
    pub limit: Option<String>,
    pub search: Option<String>,
    pub status: Option<String>,
    pub category_id: Option<String>,
    pub seller_id: Option<String>,
    pub min_price: Option<String>,
    pub max_price: Option<String>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
}

impl ProductListParams {
    /// A seller's own products, any status unless filtered
    pub fn into_seller_query(self, seller: UserId, default_limit: u32) -> CatalogResult<ProductQuery> {
        let mut errors = FieldErrors::new();

        let status = match present(&self.status) {
            None | Some("all") => StatusFilter::Any,
            Some(code) => match ProductStatus::from_code(code) {
                Some(status) => StatusFilter::Only(status),
                None => {
                    errors.push("status", "Status must be active, inactive, pending or all");
                    StatusFilter::Any
                }
            },
        };
        let category_id = parse_id::<CategoryId>(&mut errors, "categoryId", &self.category_id);
        let sort = parse_sort(&mut errors, &self);

        errors.finish().map_err(CatalogError::Validation)?;

        Ok(ProductQuery {
            search: present(&self.search).map(str::to_string),
            status,
            category_id,
            seller_id: Some(seller),
            min_price: None,
            max_price: None,
            sort,
            page: PageRequest::parse(self.page.as_deref(), self.limit.as_deref(), default_limit),
        })
    }

    /// Storefront listing; only active products, whatever `status` says
    pub fn into_public_query(self, default_limit: u32) -> CatalogResult<ProductQuery> {
        let mut errors = FieldErrors::new();

        let category_id = parse_id::<CategoryId>(&mut errors, "categoryId", &self.category_id);
        let seller_id = parse_id::<UserId>(&mut errors, "sellerId", &self.seller_id);
        let sort = parse_sort(&mut errors, &self);

        errors.finish().map_err(CatalogError::Validation)?;

        Ok(ProductQuery {
            search: present(&self.search).map(str::to_string),
            status: StatusFilter::Only(ProductStatus::Active),
            category_id,
            seller_id,
            min_price: parse_price(&self.min_price),
            max_price: parse_price(&self.max_price),
            sort,
            page: PageRequest::parse(self.page.as_deref(), self.limit.as_deref(), default_limit),
        })
    }
}

/// Trimmed, non-empty value
fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

fn parse_id<T: FromStr>(errors: &mut FieldErrors, field: &str, value: &Option<String>) -> Option<T> {
    let raw = present(value)?;
    match raw.parse::<T>() {
        Ok(id) => Some(id),
        Err(_) => {
            errors.push(field, "Must be a numeric id");
            None
        }
    }
}

fn parse_price(value: &Option<String>) -> Option<Decimal> {
    present(value).and_then(|v| Decimal::from_str(v).ok())
}

fn parse_sort(errors: &mut FieldErrors, params: &ProductListParams) -> Sort {
    let field = match present(&params.sort_by) {
        None => SortField::default(),
        Some(value) => SortField::from_param(value).unwrap_or_else(|| {
            errors.push(
                "sortBy",
                "sortBy must be one of createdAt, updatedAt, name, price, stock, salesCount",
            );
            SortField::default()
        }),
    };
    let order = match present(&params.sort_order) {
        None => SortOrder::default(),
        Some(value) => SortOrder::from_param(value).unwrap_or_else(|| {
            errors.push("sortOrder", "sortOrder must be ASC or DESC");
            SortOrder::default()
        }),
    };
    Sort { field, order }
}
