use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use super::AppState;
use crate::auth::CurrentUser;
use crate::domain::aggregates::{Category, Product};
use crate::domain::value_objects::Sku;
use crate::pricing::valid_amount;
use crate::store::is_unique_violation;
use crate::{EcommerceError, Result};

#[derive(Debug, Deserialize)]
pub struct ListParams {
    pub skip: Option<i64>,
    pub limit: Option<i64>,
    pub category: Option<String>,
    pub search: Option<String>,
    pub featured: Option<bool>,
}

impl ListParams {
    fn window(&self) -> Result<(i64, i64)> {
        let skip = self.skip.unwrap_or(0);
        let limit = self.limit.unwrap_or(100);
        if skip < 0 { return Err(EcommerceError::Validation("skip must be >= 0".into())); }
        if !(1..=100).contains(&limit) { return Err(EcommerceError::Validation("limit must be between 1 and 100".into())); }
        Ok((skip, limit))
    }
}

pub async fn list_products(State(s): State<AppState>, Query(p): Query<ListParams>) -> Result<Json<Vec<Product>>> {
    fetch_products(&s.db, &p).await.map(Json)
}

/// An unknown category name drops that filter rather than matching nothing.
async fn fetch_products(db: &PgPool, p: &ListParams) -> Result<Vec<Product>> {
    let (skip, limit) = p.window()?;
    let search = p.search.as_deref().map(str::trim).filter(|q| !q.is_empty()).map(|q| format!("%{q}%"));
    let products = sqlx::query_as::<_, Product>(
        "SELECT p.* FROM products p \
         WHERE ($1::text IS NULL \
                OR NOT EXISTS (SELECT 1 FROM categories WHERE name = $1) \
                OR p.category_id = (SELECT id FROM categories WHERE name = $1)) \
           AND ($2::text IS NULL OR p.title ILIKE $2) \
           AND ($3::bool IS NULL OR p.featured = $3) \
         ORDER BY p.created_at DESC LIMIT $4 OFFSET $5",
    )
    .bind(p.category.as_deref().filter(|c| !c.is_empty())).bind(search).bind(p.featured).bind(limit).bind(skip)
    .fetch_all(db)
    .await?;
    Ok(products)
}

async fn find_product(s: &AppState, id: Uuid) -> Result<Product> {
    sqlx::query_as::<_, Product>("SELECT * FROM products WHERE id = $1")
        .bind(id)
        .fetch_optional(&s.db)
        .await?
        .ok_or(EcommerceError::NotFound("Product"))
}

pub async fn get_product(State(s): State<AppState>, Path(id): Path<Uuid>) -> Result<Json<Product>> {
    find_product(&s, id).await.map(Json)
}

pub async fn get_product_by_sku(State(s): State<AppState>, Path(sku): Path<String>) -> Result<Json<Product>> {
    let sku = Sku::new(sku).map_err(|_| EcommerceError::NotFound("Product"))?;
    sqlx::query_as::<_, Product>("SELECT * FROM products WHERE sku = $1")
        .bind(sku.as_str())
        .fetch_optional(&s.db)
        .await?
        .map(Json)
        .ok_or(EcommerceError::NotFound("Product"))
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateProductRequest {
    pub sku: String,
    #[validate(length(min = 1, max = 255))]
    pub title: String,
    pub category_id: Uuid,
    pub brand: Option<String>,
    #[validate(custom = "valid_amount")]
    pub price: Decimal,
    #[validate(range(min = 0))]
    #[serde(default)]
    pub stock: i32,
    pub description: Option<String>,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub featured: bool,
    #[serde(default = "empty_specs")]
    pub specs: serde_json::Value,
}

fn empty_specs() -> serde_json::Value { serde_json::json!({}) }

async fn ensure_category(s: &AppState, id: Uuid) -> Result<()> {
    let exists: bool = sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM categories WHERE id = $1)").bind(id).fetch_one(&s.db).await?;
    if exists { Ok(()) } else { Err(EcommerceError::NotFound("Category")) }
}

pub async fn create_product(
    State(s): State<AppState>,
    CurrentUser(_): CurrentUser,
    Json(r): Json<CreateProductRequest>,
) -> Result<(StatusCode, Json<Product>)> {
    r.validate()?;
    let sku = Sku::new(&r.sku).map_err(|e| EcommerceError::Validation(e.to_string()))?;
    ensure_category(&s, r.category_id).await?;
    let p = sqlx::query_as::<_, Product>(
        "INSERT INTO products (id, sku, title, category_id, brand, price, rating, stock, description, images, sold, featured, specs, created_at) \
         VALUES ($1, $2, $3, $4, $5, $6, 0, $7, $8, $9, 0, $10, $11, NOW()) RETURNING *",
    )
    .bind(Uuid::now_v7()).bind(sku.as_str()).bind(&r.title).bind(r.category_id).bind(&r.brand).bind(r.price)
    .bind(r.stock).bind(&r.description).bind(&r.images).bind(r.featured).bind(&r.specs)
    .fetch_one(&s.db)
    .await
    .map_err(|e| if is_unique_violation(&e) { EcommerceError::Duplicate("SKU already exists".into()) } else { e.into() })?;
    Ok((StatusCode::CREATED, Json(p)))
}

/// Partial update; absent fields keep their value.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateProductRequest {
    #[validate(length(min = 1, max = 255))]
    pub title: Option<String>,
    pub category_id: Option<Uuid>,
    pub brand: Option<String>,
    #[validate(custom = "valid_amount")]
    pub price: Option<Decimal>,
    #[validate(range(min = 0))]
    pub stock: Option<i32>,
    pub description: Option<String>,
    pub images: Option<Vec<String>>,
    pub featured: Option<bool>,
    pub specs: Option<serde_json::Value>,
}

pub async fn update_product(
    State(s): State<AppState>,
    CurrentUser(_): CurrentUser,
    Path(id): Path<Uuid>,
    Json(r): Json<UpdateProductRequest>,
) -> Result<Json<Product>> {
    r.validate()?;
    if let Some(category_id) = r.category_id {
        ensure_category(&s, category_id).await?;
    }
    sqlx::query_as::<_, Product>(
        "UPDATE products SET title = COALESCE($2, title), category_id = COALESCE($3, category_id), brand = COALESCE($4, brand), \
         price = COALESCE($5, price), stock = COALESCE($6, stock), description = COALESCE($7, description), \
         images = COALESCE($8, images), featured = COALESCE($9, featured), specs = COALESCE($10, specs), updated_at = NOW() \
         WHERE id = $1 RETURNING *",
    )
    .bind(id).bind(&r.title).bind(r.category_id).bind(&r.brand).bind(r.price).bind(r.stock)
    .bind(&r.description).bind(&r.images).bind(r.featured).bind(&r.specs)
    .fetch_optional(&s.db)
    .await?
    .map(Json)
    .ok_or(EcommerceError::NotFound("Product"))
}

pub async fn delete_product(
    State(s): State<AppState>,
    CurrentUser(_): CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>> {
    let deleted = sqlx::query("DELETE FROM products WHERE id = $1")
        .bind(id)
        .execute(&s.db)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.is_foreign_key_violation() => {
                EcommerceError::Conflict("Product appears on existing orders and cannot be deleted".into())
            }
            _ => e.into(),
        })?;
    if deleted.rows_affected() == 0 {
        return Err(EcommerceError::NotFound("Product"));
    }
    Ok(Json(serde_json::json!({"message": "Product deleted successfully"})))
}

pub async fn list_categories(State(s): State<AppState>) -> Result<Json<Vec<Category>>> {
    let cats = sqlx::query_as::<_, Category>("SELECT * FROM categories ORDER BY name").fetch_all(&s.db).await?;
    Ok(Json(cats))
}

pub async fn get_category(State(s): State<AppState>, Path(id): Path<Uuid>) -> Result<Json<Category>> {
    sqlx::query_as::<_, Category>("SELECT * FROM categories WHERE id = $1")
        .bind(id)
        .fetch_optional(&s.db)
        .await?
        .map(Json)
        .ok_or(EcommerceError::NotFound("Category"))
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateCategoryRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    pub description: Option<String>,
}

pub async fn create_category(State(s): State<AppState>, Json(r): Json<CreateCategoryRequest>) -> Result<(StatusCode, Json<Category>)> {
    r.validate()?;
    let c = sqlx::query_as::<_, Category>("INSERT INTO categories (id, name, description, created_at) VALUES ($1, $2, $3, NOW()) RETURNING *")
        .bind(Uuid::now_v7()).bind(r.name.trim()).bind(&r.description)
        .fetch_one(&s.db)
        .await
        .map_err(|e| if is_unique_violation(&e) { EcommerceError::Duplicate("Category already exists".into()) } else { e.into() })?;
    Ok((StatusCode::CREATED, Json(c)))
}
