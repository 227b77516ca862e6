//! Product Entity

use chrono::{DateTime, Utc};
use kernel::id::{CategoryId, ProductId, UserId};
use kernel::patch;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::domain::entity::category::CategoryRef;
use crate::domain::value_object::product_status::ProductStatus;

/// Seller-editable description of a product
#[derive(Debug, Clone, PartialEq)]
pub struct ProductAttributes {
    pub name: String,
    pub description: String,
    pub price: Decimal,
    pub stock: i32,
    pub category_id: CategoryId,
    pub brand: String,
    pub model: String,
    /// Months
    pub warranty: Option<i32>,
    pub is_new: bool,
    pub weight: Option<Decimal>,
    pub width: Option<Decimal>,
    pub height: Option<Decimal>,
    pub depth: Option<Decimal>,
    pub images: Vec<String>,
    pub features: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Product {
    pub id: ProductId,
    pub seller_id: UserId,
    pub status: ProductStatus,
    pub sales_count: i32,
    pub attributes: ProductAttributes,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = now;
    }
}

/// Product before insertion
#[derive(Debug, Clone)]
pub struct NewProduct {
    pub seller_id: UserId,
    pub status: ProductStatus,
    pub sales_count: i32,
    pub attributes: ProductAttributes,
    pub created_at: DateTime<Utc>,
}

impl NewProduct {
    /// A fresh listing: always active, never sold
    pub fn listed_by(seller_id: UserId, attributes: ProductAttributes, now: DateTime<Utc>) -> Self {
        Self {
            seller_id,
            status: ProductStatus::Active,
            sales_count: 0,
            attributes,
            created_at: now,
        }
    }

    pub fn into_product(self, id: ProductId) -> Product {
        Product {
            id,
            seller_id: self.seller_id,
            status: self.status,
            sales_count: self.sales_count,
            attributes: self.attributes,
            created_at: self.created_at,
            updated_at: self.created_at,
        }
    }
}

/// Raw create input; every field may be missing until validated
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductDraft {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<Decimal>,
    pub stock: Option<i32>,
    pub category_id: Option<CategoryId>,
    pub brand: Option<String>,
    pub model: Option<String>,
    pub warranty: Option<i32>,
    pub is_new: Option<bool>,
    pub weight: Option<Decimal>,
    pub width: Option<Decimal>,
    pub height: Option<Decimal>,
    pub depth: Option<Decimal>,
    pub images: Option<Vec<String>>,
    pub features: Option<Map<String, Value>>,
}

/// Partial update. `sellerId` and `salesCount` are not editable.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<Decimal>,
    pub stock: Option<i32>,
    pub category_id: Option<CategoryId>,
    pub brand: Option<String>,
    pub model: Option<String>,
    #[serde(default, deserialize_with = "patch::double_option")]
    pub warranty: Option<Option<i32>>,
    pub is_new: Option<bool>,
    #[serde(default, deserialize_with = "patch::double_option")]
    pub weight: Option<Option<Decimal>>,
    #[serde(default, deserialize_with = "patch::double_option")]
    pub width: Option<Option<Decimal>>,
    #[serde(default, deserialize_with = "patch::double_option")]
    pub height: Option<Option<Decimal>>,
    #[serde(default, deserialize_with = "patch::double_option")]
    pub depth: Option<Option<Decimal>>,
    pub images: Option<Vec<String>>,
    pub features: Option<Map<String, Value>>,
    pub status: Option<ProductStatus>,
}

impl ProductPatch {
    pub fn apply_to(self, product: &mut Product) {
        let attrs = &mut product.attributes;

        if let Some(name) = self.name {
            attrs.name = name.trim().to_string();
        }
        if let Some(description) = self.description {
            attrs.description = description.trim().to_string();
        }
        if let Some(price) = self.price {
            attrs.price = price;
        }
        if let Some(stock) = self.stock {
            attrs.stock = stock;
        }
        if let Some(category_id) = self.category_id {
            attrs.category_id = category_id;
        }
        if let Some(brand) = self.brand {
            attrs.brand = brand.trim().to_string();
        }
        if let Some(model) = self.model {
            attrs.model = model.trim().to_string();
        }
        patch::apply(&mut attrs.warranty, self.warranty);
        if let Some(is_new) = self.is_new {
            attrs.is_new = is_new;
        }
        patch::apply(&mut attrs.weight, self.weight);
        patch::apply(&mut attrs.width, self.width);
        patch::apply(&mut attrs.height, self.height);
        patch::apply(&mut attrs.depth, self.depth);
        if let Some(images) = self.images {
            attrs.images = images;
        }
        if let Some(features) = self.features {
            attrs.features = features;
        }
        if let Some(status) = self.status {
            product.status = status;
        }
    }
}

/// Public seller card attached to a product
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SellerRef {
    pub id: UserId,
    pub name: String,
    pub avatar: Option<String>,
    pub is_seller: bool,
}

/// A product joined with its category and seller
#[derive(Debug, Clone)]
pub struct ProductView {
    pub product: Product,
    pub category: Option<CategoryRef>,
    pub seller: Option<SellerRef>,
}
