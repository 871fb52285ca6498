//! Demo data: categories, products and coupons loaded idempotently.
//!
//! Rows that already exist (by category name, SKU or coupon code) are left
//! alone, so the loader can run against a live database any number of times.

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use std::collections::HashSet;
use thiserror::Error;
use uuid::Uuid;

use crate::domain::aggregates::DiscountKind;
use crate::domain::value_objects::{Sku, SkuError};
use crate::pricing::MAX_AMOUNT;

/// Days a seeded coupon stays valid.
pub const COUPON_VALIDITY_DAYS: i64 = 90;

const BUNDLED: &str = include_str!("../seed/catalog.json");

#[derive(Debug, Error)]
pub enum SeedError {
    #[error("invalid seed file: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("product {sku} names unknown category {category:?}")]
    UnknownCategory { sku: String, category: String },

    #[error("product {sku}: {source}")]
    InvalidSku { sku: String, source: SkuError },

    #[error("{0}: amount out of range")]
    InvalidAmount(String),

    #[error("storage error: {0}")]
    Storage(#[from] sqlx::Error),
}

#[derive(Clone, Debug, Deserialize)]
pub struct SeedData {
    pub categories: Vec<String>,
    pub products: Vec<SeedProduct>,
    pub coupons: Vec<SeedCoupon>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct SeedProduct {
    pub sku: String,
    pub title: String,
    pub category: String,
    pub brand: Option<String>,
    pub price: Decimal,
    #[serde(default)]
    pub rating: Decimal,
    #[serde(default)]
    pub stock: i32,
    pub description: Option<String>,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub sold: i32,
    #[serde(default)]
    pub featured: bool,
    #[serde(default = "empty_specs")]
    pub specs: serde_json::Value,
}

fn empty_specs() -> serde_json::Value { serde_json::json!({}) }

/// Coupon kinds as written in the seed file. `ship` (free shipping) has no
/// counterpart in checkout and is skipped.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeedCouponKind {
    Percent,
    #[default]
    Fixed,
    Ship,
}

#[derive(Clone, Debug, Deserialize)]
pub struct SeedCoupon {
    pub code: String,
    #[serde(rename = "type", default)]
    pub kind: SeedCouponKind,
    pub value: Decimal,
    #[serde(default)]
    pub min_purchase: Decimal,
}

impl SeedCoupon {
    pub fn discount_kind(&self) -> Option<DiscountKind> {
        match self.kind {
            SeedCouponKind::Percent => Some(DiscountKind::Percentage),
            SeedCouponKind::Fixed => Some(DiscountKind::Fixed),
            SeedCouponKind::Ship => None,
        }
    }
}

impl SeedData {
    /// The catalog shipped with the crate.
    pub fn bundled() -> Result<Self, SeedError> {
        Self::from_json(BUNDLED)
    }

    pub fn from_json(raw: &str) -> Result<Self, SeedError> {
        let data: Self = serde_json::from_str(raw)?;
        data.check()?;
        Ok(data)
    }

    /// Rejects data the schema would refuse halfway through a load.
    pub fn check(&self) -> Result<(), SeedError> {
        let categories: HashSet<&str> = self.categories.iter().map(String::as_str).collect();
        for p in &self.products {
            if !categories.contains(p.category.as_str()) {
                return Err(SeedError::UnknownCategory { sku: p.sku.clone(), category: p.category.clone() });
            }
            Sku::new(&p.sku).map_err(|source| SeedError::InvalidSku { sku: p.sku.clone(), source })?;
            if p.price.is_sign_negative() || p.price > MAX_AMOUNT || p.stock < 0 {
                return Err(SeedError::InvalidAmount(p.sku.clone()));
            }
        }
        for c in &self.coupons {
            if c.value.is_sign_negative() || c.value > MAX_AMOUNT || c.min_purchase.is_sign_negative() {
                return Err(SeedError::InvalidAmount(c.code.clone()));
            }
        }
        Ok(())
    }
}

/// Rows actually inserted by one [`run`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct SeedReport {
    pub categories: u64,
    pub products: u64,
    pub coupons: u64,
}

pub async fn run(db: &PgPool, data: &SeedData, now: DateTime<Utc>) -> Result<SeedReport, SeedError> {
    data.check()?;
    let mut tx = db.begin().await?;
    let mut report = SeedReport::default();

    for name in &data.categories {
        let done = sqlx::query("INSERT INTO categories (id, name, created_at) VALUES ($1, $2, NOW()) ON CONFLICT (name) DO NOTHING")
            .bind(Uuid::now_v7()).bind(name)
            .execute(&mut *tx)
            .await?;
        report.categories += done.rows_affected();
    }

    for p in &data.products {
        let sku = Sku::new(&p.sku).map_err(|source| SeedError::InvalidSku { sku: p.sku.clone(), source })?;
        let done = sqlx::query(
            "INSERT INTO products (id, sku, title, category_id, brand, price, rating, stock, description, images, sold, featured, specs, created_at) \
             SELECT $1, $2, $3, c.id, $5, $6, $7, $8, $9, $10, $11, $12, $13, NOW() FROM categories c WHERE c.name = $4 \
             ON CONFLICT (sku) DO NOTHING",
        )
        .bind(Uuid::now_v7()).bind(sku.as_str()).bind(&p.title).bind(&p.category).bind(&p.brand).bind(p.price)
        .bind(p.rating).bind(p.stock).bind(&p.description).bind(&p.images).bind(p.sold).bind(p.featured).bind(&p.specs)
        .execute(&mut *tx)
        .await?;
        report.products += done.rows_affected();
    }

    let expires_at = now + Duration::days(COUPON_VALIDITY_DAYS);
    for c in &data.coupons {
        let Some(kind) = c.discount_kind() else {
            tracing::debug!(code = %c.code, "skipping free-shipping coupon");
            continue;
        };
        let discount_type = match kind {
            DiscountKind::Percentage => "percentage",
            DiscountKind::Fixed => "fixed",
        };
        let done = sqlx::query(
            "INSERT INTO coupons (id, code, description, discount_type, discount_value, min_purchase, is_active, expires_at, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6, TRUE, $7, NOW()) ON CONFLICT (code) DO NOTHING",
        )
        .bind(Uuid::now_v7()).bind(c.code.trim()).bind(format!("Discount coupon {}", c.code.trim())).bind(discount_type)
        .bind(c.value).bind(c.min_purchase).bind(expires_at)
        .execute(&mut *tx)
        .await?;
        report.coupons += done.rows_affected();
    }

    tx.commit().await?;
    tracing::info!(categories = report.categories, products = report.products, coupons = report.coupons, "seed data loaded");
    Ok(report)
}
