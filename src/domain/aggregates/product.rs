//! Product Aggregate

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Clone, Debug, Serialize, Deserialize, sqlx::FromRow)]
pub struct Product {
    pub id: Uuid,
    pub sku: String,
    pub title: String,
    pub category_id: Uuid,
    pub brand: Option<String>,
    pub price: Decimal,
    pub rating: Decimal,
    pub stock: i32,
    pub description: Option<String>,
    pub images: Vec<String>,
    pub sold: i32,
    pub featured: bool,
    pub specs: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Clone, Debug, Serialize, Deserialize, sqlx::FromRow)]
pub struct Category {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Product {
    pub fn has_stock_for(&self, quantity: i64) -> bool { quantity <= i64::from(self.stock) }

    /// Moves `quantity` units from stock to the sold counter.
    pub fn record_sale(&mut self, quantity: i32) -> Result<(), ProductError> {
        if quantity < 1 { return Err(ProductError::InvalidQuantity); }
        if !self.has_stock_for(i64::from(quantity)) { return Err(ProductError::InsufficientStock); }
        self.stock -= quantity;
        self.sold += quantity;
        self.touch();
        Ok(())
    }

    pub fn set_rating(&mut self, rating: Decimal) { self.rating = rating; self.touch(); }

    fn touch(&mut self) { self.updated_at = Some(Utc::now()); }
}

#[derive(Debug, Clone, PartialEq, Eq)] pub enum ProductError { InvalidQuantity, InsufficientStock }
impl std::error::Error for ProductError {}
impl std::fmt::Display for ProductError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self { Self::InvalidQuantity => write!(f, "Invalid quantity"), Self::InsufficientStock => write!(f, "Insufficient stock") }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    pub(crate) fn product(title: &str, price: Decimal, stock: i32) -> Product {
        Product {
            id: Uuid::new_v4(), sku: format!("SKU-{title}").to_uppercase(), title: title.into(),
            category_id: Uuid::new_v4(), brand: None, price, rating: Decimal::ZERO, stock,
            description: None, images: vec![], sold: 0, featured: false,
            specs: serde_json::json!({}), created_at: Utc::now(), updated_at: None,
        }
    }

    #[test]
    fn test_record_sale() {
        let mut p = product("Lamp", dec!(1000), 5);
        p.record_sale(3).unwrap();
        assert_eq!((p.stock, p.sold), (2, 3));
        assert_eq!(p.record_sale(3), Err(ProductError::InsufficientStock));
        assert_eq!((p.stock, p.sold), (2, 3));
    }

    #[test]
    fn test_record_sale_rejects_zero() {
        let mut p = product("Lamp", dec!(1000), 5);
        assert_eq!(p.record_sale(0), Err(ProductError::InvalidQuantity));
    }
}
