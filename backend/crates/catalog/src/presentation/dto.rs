//! API DTOs (Data Transfer Objects)

use chrono::{DateTime, Utc};
use kernel::id::{CategoryId, ProductId, UserId};
use kernel::patch::double_option;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::application::{CreateCategoryInput, UpdateCategoryInput};
use crate::domain::entity::category::{Category, CategoryNode, CategoryRef, SubcategorySummary};
use crate::domain::entity::product::{ProductView, SellerRef};
use crate::domain::value_object::product_status::ProductStatus;
use crate::domain::value_object::slug::Slug;

// ============================================================================
// Categories
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCategoryRequest {
    #[serde(default)]
    pub name: String,
    pub slug: Option<String>,
    pub description: Option<String>,
    pub icon: Option<String>,
    pub parent_id: Option<CategoryId>,
    pub is_active: Option<bool>,
}

impl From<CreateCategoryRequest> for CreateCategoryInput {
    fn from(req: CreateCategoryRequest) -> Self {
        Self {
            name: req.name,
            slug: req.slug,
            description: req.description,
            icon: req.icon,
            parent_id: req.parent_id,
            is_active: req.is_active,
        }
    }
}

/// `parentId: null` moves the category to the top level
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCategoryRequest {
    pub name: Option<String>,
    pub slug: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub description: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub icon: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub parent_id: Option<Option<CategoryId>>,
    pub is_active: Option<bool>,
}

impl From<UpdateCategoryRequest> for UpdateCategoryInput {
    fn from(req: UpdateCategoryRequest) -> Self {
        Self {
            name: req.name,
            slug: req.slug,
            description: req.description,
            icon: req.icon,
            parent_id: req.parent_id,
            is_active: req.is_active,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryListQuery {
    pub include_inactive: Option<String>,
}

impl CategoryListQuery {
    pub fn include_inactive(&self) -> bool {
        self.include_inactive.as_deref() == Some("true")
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryResponse {
    pub id: CategoryId,
    pub name: String,
    pub slug: Slug,
    pub description: Option<String>,
    pub icon: Option<String>,
    pub parent_id: Option<CategoryId>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub subcategories: Vec<SubcategorySummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_category: Option<CategoryRef>,
}

impl From<CategoryNode> for CategoryResponse {
    fn from(node: CategoryNode) -> Self {
        let c = node.category;
        Self {
            id: c.id,
            name: c.name,
            slug: c.slug,
            description: c.description,
            icon: c.icon,
            parent_id: c.parent_id,
            is_active: c.is_active,
            created_at: c.created_at,
            updated_at: c.updated_at,
            subcategories: node.subcategories,
            parent_category: node.parent,
        }
    }
}

impl From<Category> for CategoryResponse {
    fn from(category: Category) -> Self {
        Self::from(CategoryNode {
            category,
            parent: None,
            subcategories: Vec::new(),
        })
    }
}

// ============================================================================
// Products
// ============================================================================

/// Product as returned by the API; prices and dimensions are decimal strings
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductResponse {
    pub id: ProductId,
    pub name: String,
    pub description: String,
    pub price: Decimal,
    pub stock: i32,
    pub category_id: CategoryId,
    pub brand: String,
    pub model: String,
    pub warranty: Option<i32>,
    pub is_new: bool,
    pub weight: Option<Decimal>,
    pub width: Option<Decimal>,
    pub height: Option<Decimal>,
    pub depth: Option<Decimal>,
    pub status: ProductStatus,
    pub seller_id: UserId,
    pub images: Vec<String>,
    pub features: Map<String, Value>,
    pub sales_count: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub category: Option<CategoryRef>,
    pub seller: Option<SellerRef>,
}

impl From<ProductView> for ProductResponse {
    fn from(view: ProductView) -> Self {
        let p = view.product;
        let a = p.attributes;
        Self {
            id: p.id,
            name: a.name,
            description: a.description,
            price: a.price,
            stock: a.stock,
            category_id: a.category_id,
            brand: a.brand,
            model: a.model,
            warranty: a.warranty,
            is_new: a.is_new,
            weight: a.weight,
            width: a.width,
            height: a.height,
            depth: a.depth,
            status: p.status,
            seller_id: p.seller_id,
            images: a.images,
            features: a.features,
            sales_count: p.sales_count,
            created_at: p.created_at,
            updated_at: p.updated_at,
            category: view.category,
            seller: view.seller,
        }
    }
}
