//! Review Aggregate

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::pricing::round_money;

#[derive(Clone, Debug, Serialize, Deserialize, sqlx::FromRow)]
pub struct Review {
    pub id: Uuid,
    pub product_id: Uuid,
    pub user_id: Uuid,
    pub rating: i16,
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, Deserialize, Validate)]
pub struct NewReview {
    pub product_id: Uuid,
    #[validate(range(min = 1, max = 5, message = "rating must be between 1 and 5"))]
    pub rating: i16,
    pub comment: Option<String>,
}

/// Mean of `ratings` to two decimals, zero when there are none.
pub fn average_rating(ratings: &[i16]) -> Decimal {
    if ratings.is_empty() { return Decimal::ZERO; }
    let sum: i64 = ratings.iter().map(|&r| i64::from(r)).sum();
    round_money(Decimal::from(sum) / Decimal::from(ratings.len() as u64))
}
