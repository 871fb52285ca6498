//! In-memory store for unit tests. A transaction holds the whole state lock,
//! works on a copy, and writes the copy back on commit.

use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;
use std::{collections::HashMap, sync::Arc};
use tokio::sync::{Mutex, OwnedMutexGuard};
use uuid::Uuid;

use super::{Store, Transaction};
use crate::domain::aggregates::{Coupon, NewOrder, NewReview, Order, OrderItem, PricedLine, Product, Review};
use crate::{EcommerceError, Result};

#[derive(Clone, Debug, Default)]
pub(crate) struct MemoryState {
    pub products: HashMap<Uuid, Product>,
    pub coupons: Vec<Coupon>,
    pub orders: Vec<Order>,
    pub items: Vec<OrderItem>,
    pub reviews: Vec<Review>,
    /// Order numbers reported as taken by `insert_order`, consumed in turn.
    pub taken_order_numbers: usize,
    /// `record_sale` fails for this product.
    pub fail_sale_for: Option<Uuid>,
}

#[derive(Clone, Debug, Default)]
pub(crate) struct MemoryStore {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryStore {
    pub fn new(state: MemoryState) -> Self { Self { state: Arc::new(Mutex::new(state)) } }

    pub async fn snapshot(&self) -> MemoryState { self.state.lock().await.clone() }

    pub async fn product(&self, id: Uuid) -> Product {
        self.state.lock().await.products[&id].clone()
    }
}

pub(crate) struct MemoryTx {
    guard: OwnedMutexGuard<MemoryState>,
    staged: MemoryState,
}

#[async_trait]
impl Store for MemoryStore {
    type Tx = MemoryTx;

    async fn begin(&self) -> Result<MemoryTx> {
        let guard = self.state.clone().lock_owned().await;
        let staged = guard.clone();
        Ok(MemoryTx { guard, staged })
    }
}

#[async_trait]
impl Transaction for MemoryTx {
    async fn lock_products(&mut self, ids: &[Uuid]) -> Result<Vec<Product>> {
        Ok(ids.iter().filter_map(|id| self.staged.products.get(id).cloned()).collect())
    }

    async fn active_coupon(&mut self, code: &str) -> Result<Option<Coupon>> {
        Ok(self.staged.coupons.iter().find(|c| c.code == code && c.is_active).cloned())
    }

    async fn insert_order(&mut self, order: &NewOrder) -> Result<Option<Order>> {
        if self.staged.taken_order_numbers > 0 {
            self.staged.taken_order_numbers -= 1;
            return Ok(None);
        }
        if self.staged.orders.iter().any(|o| o.order_number == order.order_number) {
            return Ok(None);
        }
        let order = order.clone().into_order(Uuid::new_v4(), Utc::now());
        self.staged.orders.push(order.clone());
        Ok(Some(order))
    }

    async fn insert_order_item(&mut self, order_id: Uuid, line: &PricedLine) -> Result<OrderItem> {
        let item = OrderItem {
            id: Uuid::new_v4(), order_id, product_id: line.product_id, quantity: line.quantity, price: line.unit_price,
        };
        self.staged.items.push(item.clone());
        Ok(item)
    }

    async fn record_sale(&mut self, product_id: Uuid, quantity: i32) -> Result<()> {
        if self.staged.fail_sale_for == Some(product_id) {
            return Err(EcommerceError::Internal("injected failure".into()));
        }
        let product = self.staged.products.get_mut(&product_id).ok_or(EcommerceError::ProductNotFound(product_id))?;
        product.record_sale(quantity).map_err(|e| EcommerceError::Internal(e.to_string()))
    }

    async fn review(&mut self, id: Uuid) -> Result<Option<Review>> {
        Ok(self.staged.reviews.iter().find(|r| r.id == id).cloned())
    }

    async fn review_by_author(&mut self, product_id: Uuid, user_id: Uuid) -> Result<Option<Review>> {
        Ok(self.staged.reviews.iter().find(|r| r.product_id == product_id && r.user_id == user_id).cloned())
    }

    async fn insert_review(&mut self, user_id: Uuid, review: &NewReview) -> Result<Review> {
        let review = Review {
            id: Uuid::new_v4(), product_id: review.product_id, user_id, rating: review.rating,
            comment: review.comment.clone(), created_at: Utc::now(),
        };
        self.staged.reviews.push(review.clone());
        Ok(review)
    }

    async fn delete_review(&mut self, id: Uuid) -> Result<()> {
        self.staged.reviews.retain(|r| r.id != id);
        Ok(())
    }

    async fn product_ratings(&mut self, product_id: Uuid) -> Result<Vec<i16>> {
        Ok(self.staged.reviews.iter().filter(|r| r.product_id == product_id).map(|r| r.rating).collect())
    }

    async fn set_product_rating(&mut self, product_id: Uuid, rating: Decimal) -> Result<()> {
        if let Some(product) = self.staged.products.get_mut(&product_id) {
            product.set_rating(rating);
        }
        Ok(())
    }

    async fn commit(mut self) -> Result<()> {
        *self.guard = self.staged;
        Ok(())
    }
}
