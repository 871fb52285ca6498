//! Transactional store seam used by checkout and review aggregation.
//!
//! Everything done through one [`Transaction`] becomes visible together on
//! [`Transaction::commit`]; dropping it uncommitted discards every write.

use async_trait::async_trait;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::domain::aggregates::{Coupon, NewOrder, NewReview, Order, OrderItem, PricedLine, Product, Review};
use crate::Result;

#[cfg(test)]
pub(crate) mod memory;
mod postgres;

pub use postgres::{PgStore, PgTx};
pub(crate) use postgres::is_unique_violation;

#[async_trait]
pub trait Store: Send + Sync {
    type Tx: Transaction;

    async fn begin(&self) -> Result<Self::Tx>;
}

#[async_trait]
pub trait Transaction: Send + Sized {
    /// Loads and locks the given products until commit or rollback. Missing
    /// ids are simply absent from the result.
    async fn lock_products(&mut self, ids: &[Uuid]) -> Result<Vec<Product>>;

    async fn active_coupon(&mut self, code: &str) -> Result<Option<Coupon>>;

    /// Inserts the order header. `None` means the order number is taken.
    async fn insert_order(&mut self, order: &NewOrder) -> Result<Option<Order>>;

    async fn insert_order_item(&mut self, order_id: Uuid, line: &PricedLine) -> Result<OrderItem>;

    /// Decrements stock and increments the sold counter of a locked product.
    async fn record_sale(&mut self, product_id: Uuid, quantity: i32) -> Result<()>;

    async fn review(&mut self, id: Uuid) -> Result<Option<Review>>;

    async fn review_by_author(&mut self, product_id: Uuid, user_id: Uuid) -> Result<Option<Review>>;

    async fn insert_review(&mut self, user_id: Uuid, review: &NewReview) -> Result<Review>;

    async fn delete_review(&mut self, id: Uuid) -> Result<()>;

    async fn product_ratings(&mut self, product_id: Uuid) -> Result<Vec<i16>>;

    async fn set_product_rating(&mut self, product_id: Uuid, rating: Decimal) -> Result<()>;

    async fn commit(self) -> Result<()>;
}
