//! PostgreSQL Repository Implementations

use chrono::{DateTime, Utc};
use kernel::id::{CategoryId, ProductId, UserId};
use rust_decimal::Decimal;
use serde_json::{Map, Value};
use sqlx::types::Json;
use sqlx::{PgPool, Postgres, QueryBuilder};

use crate::domain::entity::category::{Category, CategoryRef, NewCategory};
use crate::domain::entity::product::{
    NewProduct, Product, ProductAttributes, ProductView, SellerRef,
};
use crate::domain::repository::{CategoryRepository, ProductRepository};
use crate::domain::services::hierarchy::ParentLink;
use crate::domain::value_object::product_query::{ProductQuery, StatusFilter};
use crate::domain::value_object::product_status::ProductStatus;
use crate::domain::value_object::slug::Slug;
use crate::error::{CatalogError, CatalogResult};

/// `SELECT <all category columns> FROM categories <tail>`
macro_rules! select_categories {
    ($tail:literal) => {
        concat!(
            r#"
            SELECT
                id, name, slug, description, icon, parent_id, is_active,
                created_at, updated_at
            FROM categories
            "#,
            $tail
        )
    };
}

/// Product columns joined with the category and seller cards
const PRODUCT_VIEW_SELECT: &str = r#"
    SELECT
        p.id, p.seller_id, p.status, p.sales_count,
        p.name, p.description, p.price, p.stock, p.category_id, p.brand, p.model,
        p.warranty, p.is_new, p.weight, p.width, p.height, p.depth,
        p.images, p.features, p.created_at, p.updated_at,
        c.name AS category_name, c.slug AS category_slug,
        u.name AS seller_name, u.profile_picture AS seller_avatar,
        u.is_seller AS seller_is_seller
    FROM products p
    LEFT JOIN categories c ON c.id = p.category_id
    LEFT JOIN users u ON u.id = p.seller_id
"#;

/// PostgreSQL-backed category and product repository
#[derive(Clone)]
pub struct PgCatalogRepository {
    pool: PgPool,
}

impl PgCatalogRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Unique violations on `categories.slug` become `SlugTaken`
fn map_category_write_error(e: sqlx::Error) -> CatalogError {
    if let sqlx::Error::Database(db) = &e {
        if db.is_unique_violation() {
            return CatalogError::SlugTaken;
        }
        if db.is_foreign_key_violation() {
            return CatalogError::ParentCategoryNotFound;
        }
    }
    CatalogError::Database(e)
}

/// A dangling `category_id` becomes `CategoryNotFound`
fn map_product_write_error(e: sqlx::Error) -> CatalogError {
    if let sqlx::Error::Database(db) = &e {
        if db.is_foreign_key_violation() {
            return CatalogError::CategoryNotFound;
        }
    }
    CatalogError::Database(e)
}

impl CategoryRepository for PgCatalogRepository {
    async fn create_category(&self, category: &NewCategory) -> CatalogResult<Category> {
        let id = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO categories (
                name, slug, description, icon, parent_id, is_active, created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $7)
            RETURNING id
            "#,
        )
        .bind(&category.name)
        .bind(category.slug.as_str())
        .bind(&category.description)
        .bind(&category.icon)
        .bind(category.parent_id.map(|p| p.value()))
        .bind(category.is_active)
        .bind(category.created_at)
        .fetch_one(&self.pool)
        .await
        .map_err(map_category_write_error)?;

        Ok(category.clone().into_category(CategoryId::from_i64(id)))
    }

    async fn find_category(&self, id: CategoryId) -> CatalogResult<Option<Category>> {
        let row = sqlx::query_as::<_, CategoryRow>(select_categories!("WHERE id = $1"))
            .bind(id.value())
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(CategoryRow::into_category))
    }

    async fn find_category_by_slug(&self, slug: &Slug) -> CatalogResult<Option<Category>> {
        let row = sqlx::query_as::<_, CategoryRow>(select_categories!("WHERE slug = $1"))
            .bind(slug.as_str())
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(CategoryRow::into_category))
    }

    async fn slug_exists(&self, slug: &Slug, excluding: Option<CategoryId>) -> CatalogResult<bool> {
        let exists = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM categories
                WHERE slug = $1 AND ($2::BIGINT IS NULL OR id <> $2)
            )
            "#,
        )
        .bind(slug.as_str())
        .bind(excluding.map(|id| id.value()))
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    async fn find_categories(&self, include_inactive: bool) -> CatalogResult<Vec<Category>> {
        let rows = sqlx::query_as::<_, CategoryRow>(select_categories!(
            "WHERE ($1 OR is_active) ORDER BY name ASC, id ASC"
        ))
        .bind(include_inactive)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(CategoryRow::into_category).collect())
    }

    async fn find_children(
        &self,
        parent: CategoryId,
        include_inactive: bool,
    ) -> CatalogResult<Vec<Category>> {
        let rows = sqlx::query_as::<_, CategoryRow>(select_categories!(
            "WHERE parent_id = $1 AND ($2 OR is_active) ORDER BY name ASC, id ASC"
        ))
        .bind(parent.value())
        .bind(include_inactive)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(CategoryRow::into_category).collect())
    }

    async fn parent_links(&self) -> CatalogResult<Vec<ParentLink>> {
        let rows = sqlx::query_as::<_, (i64, Option<i64>)>("SELECT id, parent_id FROM categories")
            .fetch_all(&self.pool)
            .await?;

        Ok(rows
            .into_iter()
            .map(|(id, parent)| (CategoryId::from_i64(id), parent.map(CategoryId::from_i64)))
            .collect())
    }

    async fn update_category(&self, category: &Category) -> CatalogResult<()> {
        sqlx::query(
            r#"
            UPDATE categories SET
                name = $2,
                slug = $3,
                description = $4,
                icon = $5,
                parent_id = $6,
                is_active = $7,
                updated_at = $8
            WHERE id = $1
            "#,
        )
        .bind(category.id.value())
        .bind(&category.name)
        .bind(category.slug.as_str())
        .bind(&category.description)
        .bind(&category.icon)
        .bind(category.parent_id.map(|p| p.value()))
        .bind(category.is_active)
        .bind(category.updated_at)
        .execute(&self.pool)
        .await
        .map_err(map_category_write_error)?;

        Ok(())
    }

    async fn delete_category(&self, id: CategoryId) -> CatalogResult<bool> {
        let deleted = sqlx::query("DELETE FROM categories WHERE id = $1")
            .bind(id.value())
            .execute(&self.pool)
            .await?
            .rows_affected();

        Ok(deleted > 0)
    }

    async fn count_children(&self, id: CategoryId) -> CatalogResult<u64> {
        let count =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM categories WHERE parent_id = $1")
                .bind(id.value())
                .fetch_one(&self.pool)
                .await?;

        Ok(count.max(0) as u64)
    }
}

impl ProductRepository for PgCatalogRepository {
    async fn create_product(&self, product: &NewProduct) -> CatalogResult<Product> {
        let a = &product.attributes;
        let id = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO products (
                seller_id, status, sales_count,
                name, description, price, stock, category_id, brand, model,
                warranty, is_new, weight, width, height, depth, images, features,
                created_at, updated_at
            ) VALUES (
                $1, $2, $3,
                $4, $5, $6, $7, $8, $9, $10,
                $11, $12, $13, $14, $15, $16, $17, $18,
                $19, $19
            )
            RETURNING id
            "#,
        )
        .bind(product.seller_id.value())
        .bind(product.status.code())
        .bind(product.sales_count)
        .bind(&a.name)
        .bind(&a.description)
        .bind(a.price)
        .bind(a.stock)
        .bind(a.category_id.value())
        .bind(&a.brand)
        .bind(&a.model)
        .bind(a.warranty)
        .bind(a.is_new)
        .bind(a.weight)
        .bind(a.width)
        .bind(a.height)
        .bind(a.depth)
        .bind(Json(&a.images))
        .bind(Json(&a.features))
        .bind(product.created_at)
        .fetch_one(&self.pool)
        .await
        .map_err(map_product_write_error)?;

        Ok(product.clone().into_product(ProductId::from_i64(id)))
    }

    async fn find_product(&self, id: ProductId) -> CatalogResult<Option<Product>> {
        Ok(self.find_product_view(id).await?.map(|view| view.product))
    }

    async fn find_product_view(&self, id: ProductId) -> CatalogResult<Option<ProductView>> {
        let mut query = QueryBuilder::<Postgres>::new(PRODUCT_VIEW_SELECT);
        query.push(" WHERE p.id = ").push_bind(id.value());

        let row = query
            .build_query_as::<ProductViewRow>()
            .fetch_optional(&self.pool)
            .await?;

        row.map(ProductViewRow::into_view).transpose()
    }

    async fn update_product(&self, product: &Product) -> CatalogResult<()> {
        let a = &product.attributes;
        sqlx::query(
            r#"
            UPDATE products SET
                status = $2,
                name = $3,
                description = $4,
                price = $5,
                stock = $6,
                category_id = $7,
                brand = $8,
                model = $9,
                warranty = $10,
                is_new = $11,
                weight = $12,
                width = $13,
                height = $14,
                depth = $15,
                images = $16,
                features = $17,
                updated_at = $18
            WHERE id = $1
            "#,
        )
        .bind(product.id.value())
        .bind(product.status.code())
        .bind(&a.name)
        .bind(&a.description)
        .bind(a.price)
        .bind(a.stock)
        .bind(a.category_id.value())
        .bind(&a.brand)
        .bind(&a.model)
        .bind(a.warranty)
        .bind(a.is_new)
        .bind(a.weight)
        .bind(a.width)
        .bind(a.height)
        .bind(a.depth)
        .bind(Json(&a.images))
        .bind(Json(&a.features))
        .bind(product.updated_at)
        .execute(&self.pool)
        .await
        .map_err(map_product_write_error)?;

        Ok(())
    }

    async fn delete_product(&self, id: ProductId) -> CatalogResult<bool> {
        let deleted = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id.value())
            .execute(&self.pool)
            .await?
            .rows_affected();

        Ok(deleted > 0)
    }

    async fn count_by_category(&self, category: CategoryId) -> CatalogResult<u64> {
        let count =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM products WHERE category_id = $1")
                .bind(category.value())
                .fetch_one(&self.pool)
                .await?;

        Ok(count.max(0) as u64)
    }

    async fn search_products(&self, query: &ProductQuery) -> CatalogResult<(Vec<ProductView>, u64)> {
        let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM products p");
        push_filters(&mut count, query);
        let total = count
            .build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await?;

        let mut select = QueryBuilder::<Postgres>::new(PRODUCT_VIEW_SELECT);
        push_filters(&mut select, query);
        // Column and direction come from closed enums, never from input
        let (column, direction) = (query.sort.field.column(), query.sort.order.sql());
        select.push(format!(
            " ORDER BY {column} {direction}, p.id {direction}"
        ));
        select
            .push(" LIMIT ")
            .push_bind(i64::from(query.page.limit()))
            .push(" OFFSET ")
            .push_bind(query.page.offset() as i64);

        let rows = select
            .build_query_as::<ProductViewRow>()
            .fetch_all(&self.pool)
            .await?;

        let items = rows
            .into_iter()
            .map(ProductViewRow::into_view)
            .collect::<CatalogResult<Vec<_>>>()?;

        Ok((items, total.max(0) as u64))
    }
}

/// `WHERE` clause shared by the page and count queries
fn push_filters(builder: &mut QueryBuilder<'_, Postgres>, query: &ProductQuery) {
    builder.push(" WHERE TRUE");

    if let StatusFilter::Only(status) = query.status {
        builder.push(" AND p.status = ").push_bind(status.code());
    }
    if let Some(category_id) = query.category_id {
        builder
            .push(" AND p.category_id = ")
            .push_bind(category_id.value());
    }
    if let Some(seller_id) = query.seller_id {
        builder.push(" AND p.seller_id = ").push_bind(seller_id.value());
    }
    if let Some(min) = query.min_price {
        builder.push(" AND p.price >= ").push_bind(min);
    }
    if let Some(max) = query.max_price {
        builder.push(" AND p.price <= ").push_bind(max);
    }
    if let Some(search) = &query.search {
        let pattern = format!("%{}%", escape_like(search));
        builder.push(" AND (");
        let mut columns = builder.separated(" OR ");
        for column in ["p.name", "p.description", "p.brand", "p.model"] {
            columns
                .push(format!("{column} ILIKE "))
                .push_bind_unseparated(pattern.clone());
        }
        builder.push(")");
    }
}

/// Escape `%`, `_` and `\` so user input matches literally
fn escape_like(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

// ============================================================================
// Row Types
// ============================================================================

#[derive(sqlx::FromRow)]
struct CategoryRow {
    id: i64,
    name: String,
    slug: String,
    description: Option<String>,
    icon: Option<String>,
    parent_id: Option<i64>,
    is_active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl CategoryRow {
    fn into_category(self) -> Category {
        Category {
            id: CategoryId::from_i64(self.id),
            name: self.name,
            slug: Slug::from_db(self.slug),
            description: self.description,
            icon: self.icon,
            parent_id: self.parent_id.map(CategoryId::from_i64),
            is_active: self.is_active,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct ProductViewRow {
    id: i64,
    seller_id: i64,
    status: String,
    sales_count: i32,
    name: String,
    description: String,
    price: Decimal,
    stock: i32,
    category_id: i64,
    brand: String,
    model: String,
    warranty: Option<i32>,
    is_new: bool,
    weight: Option<Decimal>,
    width: Option<Decimal>,
    height: Option<Decimal>,
    depth: Option<Decimal>,
    images: Json<Vec<String>>,
    features: Json<Map<String, Value>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    category_name: Option<String>,
    category_slug: Option<String>,
    seller_name: Option<String>,
    seller_avatar: Option<String>,
    seller_is_seller: Option<bool>,
}

impl ProductViewRow {
    fn into_view(self) -> CatalogResult<ProductView> {
        let status = ProductStatus::from_code(&self.status)
            .ok_or_else(|| CatalogError::Internal(format!("Invalid product status: {}", self.status)))?;
        let category_id = CategoryId::from_i64(self.category_id);
        let seller_id = UserId::from_i64(self.seller_id);

        let category = match (self.category_name, self.category_slug) {
            (Some(name), Some(slug)) => Some(CategoryRef {
                id: category_id,
                name,
                slug: Slug::from_db(slug),
            }),
            _ => None,
        };
        let seller = self.seller_name.map(|name| SellerRef {
            id: seller_id,
            name,
            avatar: self.seller_avatar,
            is_seller: self.seller_is_seller.unwrap_or(false),
        });

        Ok(ProductView {
            product: Product {
                id: ProductId::from_i64(self.id),
                seller_id,
                status,
                sales_count: self.sales_count,
                attributes: ProductAttributes {
                    name: self.name,
                    description: self.description,
                    price: self.price,
                    stock: self.stock,
                    category_id,
                    brand: self.brand,
                    model: self.model,
                    warranty: self.warranty,
                    is_new: self.is_new,
                    weight: self.weight,
                    width: self.width,
                    height: self.height,
                    depth: self.depth,
                    images: self.images.0,
                    features: self.features.0,
                },
                created_at: self.created_at,
                updated_at: self.updated_at,
            },
            category,
            seller,
        })
    }
}
