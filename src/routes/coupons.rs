use axum::{extract::State, Json};
use chrono::Utc;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::AppState;
use crate::domain::aggregates::{coupon, Coupon, DiscountKind};
use crate::{EcommerceError, Result};

#[derive(Debug, Deserialize)]
pub struct ValidateCouponRequest {
    pub code: String,
    pub subtotal: Decimal,
}

#[derive(Debug, Serialize)]
pub struct CouponQuote {
    pub code: String,
    pub discount_type: DiscountKind,
    pub discount: Decimal,
    pub subtotal: Decimal,
}

/// Previews the discount a coupon would grant, without reserving anything.
pub async fn validate_coupon(State(s): State<AppState>, Json(r): Json<ValidateCouponRequest>) -> Result<Json<CouponQuote>> {
    let code = coupon::normalize_code(Some(&r.code)).ok_or(EcommerceError::InvalidCoupon)?;
    let found = sqlx::query_as::<_, Coupon>("SELECT * FROM coupons WHERE code = $1 AND is_active")
        .bind(code)
        .fetch_optional(&s.db)
        .await?
        .ok_or(EcommerceError::InvalidCoupon)?;
    let discount = found.discount_for(r.subtotal, Utc::now())?;
    Ok(Json(CouponQuote { discount_type: found.kind(), code: found.code, discount, subtotal: r.subtotal }))
}
