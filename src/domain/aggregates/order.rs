//! Order Aggregate

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use uuid::Uuid;

#[derive(Clone, Debug, Serialize, Deserialize, sqlx::FromRow)]
pub struct Order {
    pub id: Uuid,
    pub user_id: Uuid,
    pub order_number: String,
    pub status: String,
    pub subtotal: Decimal,
    pub shipping_cost: Decimal,
    pub discount: Decimal,
    pub total: Decimal,
    pub coupon_code: Option<String>,
    pub shipping_method: Option<String>,
    pub shipping_address: Option<String>,
    pub shipping_locality: Option<String>,
    pub shipping_region: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Line item; `price` is the unit price captured when the order was placed.
#[derive(Clone, Debug, Serialize, Deserialize, sqlx::FromRow)]
pub struct OrderItem {
    pub id: Uuid,
    pub order_id: Uuid,
    pub product_id: Uuid,
    pub quantity: i32,
    pub price: Decimal,
}

#[derive(Clone, Debug, Serialize)]
pub struct OrderWithItems {
    #[serde(flatten)]
    pub order: Order,
    pub items: Vec<OrderItem>,
}

/// Order header as written at checkout, before the store assigns an id.
#[derive(Clone, Debug)]
pub struct NewOrder {
    pub user_id: Uuid,
    pub order_number: String,
    pub status: OrderStatus,
    pub subtotal: Decimal,
    pub shipping_cost: Decimal,
    pub discount: Decimal,
    pub total: Decimal,
    pub coupon_code: Option<String>,
    pub shipping_method: Option<String>,
    pub shipping_address: Option<String>,
    pub shipping_locality: Option<String>,
    pub shipping_region: Option<String>,
}

impl NewOrder {
    pub fn into_order(self, id: Uuid, created_at: DateTime<Utc>) -> Order {
        Order {
            id, user_id: self.user_id, order_number: self.order_number, status: self.status.to_string(),
            subtotal: self.subtotal, shipping_cost: self.shipping_cost, discount: self.discount, total: self.total,
            coupon_code: self.coupon_code, shipping_method: self.shipping_method, shipping_address: self.shipping_address,
            shipping_locality: self.shipping_locality, shipping_region: self.shipping_region,
            created_at, updated_at: None,
        }
    }
}

/// Accepted status values. Any status may follow any other.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus { #[default] Pending, Confirmed, Shipped, Delivered, Cancelled }

impl OrderStatus {
    pub const ALL: [OrderStatus; 5] = [Self::Pending, Self::Confirmed, Self::Shipped, Self::Delivered, Self::Cancelled];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::Shipped => "shipped",
            Self::Delivered => "delivered",
            Self::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

impl FromStr for OrderStatus {
    type Err = OrderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL.into_iter().find(|st| st.as_str() == s).ok_or(OrderError::InvalidStatus)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)] pub enum OrderError { InvalidStatus }
impl std::error::Error for OrderError {}
impl fmt::Display for OrderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let valid: Vec<&str> = OrderStatus::ALL.iter().map(OrderStatus::as_str).collect();
        write!(f, "Invalid status. Must be one of: {}", valid.join(", "))
    }
}
