//! Coupon Aggregate

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::pricing::round_money;
use crate::{EcommerceError, Result};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiscountKind { Percentage, Fixed }

#[derive(Clone, Debug, Serialize, Deserialize, sqlx::FromRow)]
pub struct Coupon {
    pub id: Uuid,
    pub code: String,
    pub description: Option<String>,
    /// `"percentage"` or `"fixed"`; anything else is treated as fixed.
    pub discount_type: String,
    pub discount_value: Decimal,
    pub min_purchase: Decimal,
    pub is_active: bool,
    pub expires_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Coupon {
    pub fn kind(&self) -> DiscountKind {
        if self.discount_type.eq_ignore_ascii_case("percentage") { DiscountKind::Percentage } else { DiscountKind::Fixed }
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        matches!(self.expires_at, Some(expires_at) if expires_at < now)
    }

    /// Discount this coupon grants on `subtotal`, checking activity, expiry and
    /// minimum purchase in that order. Never exceeds the subtotal.
    pub fn discount_for(&self, subtotal: Decimal, now: DateTime<Utc>) -> Result<Decimal> {
        if !self.is_active { return Err(EcommerceError::InvalidCoupon); }
        if self.is_expired_at(now) { return Err(EcommerceError::CouponExpired); }
        if subtotal < self.min_purchase { return Err(EcommerceError::MinimumPurchaseNotMet(self.min_purchase)); }

        let discount = match self.kind() {
            DiscountKind::Percentage => subtotal * (self.discount_value / Decimal::ONE_HUNDRED),
            DiscountKind::Fixed => self.discount_value,
        };
        Ok(round_money(discount.min(subtotal)))
    }
}

/// Normalizes a submitted coupon code; blank codes count as "no coupon".
pub fn normalize_code(code: Option<&str>) -> Option<&str> {
    code.map(str::trim).filter(|c| !c.is_empty())
}
