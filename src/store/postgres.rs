use async_trait::async_trait;
use rust_decimal::Decimal;
use sqlx::{PgPool, Postgres};
use uuid::Uuid;

use super::{Store, Transaction};
use crate::domain::aggregates::{Coupon, NewOrder, NewReview, Order, OrderItem, PricedLine, Product, Review};
use crate::{EcommerceError, Result};

/// PostgreSQL-backed store. Product rows are locked with `FOR UPDATE`, so
/// concurrent checkouts and review mutations on one product serialize.
#[derive(Clone, Debug)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self { Self { pool } }
}

pub struct PgTx {
    tx: sqlx::Transaction<'static, Postgres>,
}

#[async_trait]
impl Store for PgStore {
    type Tx = PgTx;

    async fn begin(&self) -> Result<PgTx> {
        Ok(PgTx { tx: self.pool.begin().await? })
    }
}

pub(crate) fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(e) if e.is_unique_violation())
}

#[async_trait]
impl Transaction for PgTx {
    async fn lock_products(&mut self, ids: &[Uuid]) -> Result<Vec<Product>> {
        // Fixed lock order keeps two multi-product checkouts from deadlocking.
        let products = sqlx::query_as::<_, Product>("SELECT * FROM products WHERE id = ANY($1) ORDER BY id FOR UPDATE")
            .bind(ids)
            .fetch_all(&mut *self.tx)
            .await?;
        Ok(products)
    }

    async fn active_coupon(&mut self, code: &str) -> Result<Option<Coupon>> {
        let coupon = sqlx::query_as::<_, Coupon>("SELECT * FROM coupons WHERE code = $1 AND is_active")
            .bind(code)
            .fetch_optional(&mut *self.tx)
            .await?;
        Ok(coupon)
    }

    async fn insert_order(&mut self, o: &NewOrder) -> Result<Option<Order>> {
        let order = sqlx::query_as::<_, Order>(
            "INSERT INTO orders (id, user_id, order_number, status, subtotal, shipping_cost, discount, total, coupon_code, \
             shipping_method, shipping_address, shipping_locality, shipping_region, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, NOW()) \
             ON CONFLICT (order_number) DO NOTHING RETURNING *",
        )
        .bind(Uuid::now_v7()).bind(o.user_id).bind(&o.order_number).bind(o.status.as_str())
        .bind(o.subtotal).bind(o.shipping_cost).bind(o.discount).bind(o.total).bind(&o.coupon_code)
        .bind(&o.shipping_method).bind(&o.shipping_address).bind(&o.shipping_locality).bind(&o.shipping_region)
        .fetch_optional(&mut *self.tx)
        .await?;
        Ok(order)
    }

    async fn insert_order_item(&mut self, order_id: Uuid, line: &PricedLine) -> Result<OrderItem> {
        let item = sqlx::query_as::<_, OrderItem>(
            "INSERT INTO order_items (id, order_id, product_id, quantity, price) VALUES ($1, $2, $3, $4, $5) RETURNING *",
        )
        .bind(Uuid::now_v7()).bind(order_id).bind(line.product_id).bind(line.quantity).bind(line.unit_price)
        .fetch_one(&mut *self.tx)
        .await?;
        Ok(item)
    }

    async fn record_sale(&mut self, product_id: Uuid, quantity: i32) -> Result<()> {
        let updated = sqlx::query(
            "UPDATE products SET stock = stock - $2, sold = sold + $2, updated_at = NOW() WHERE id = $1 AND stock >= $2",
        )
        .bind(product_id).bind(quantity)
        .execute(&mut *self.tx)
        .await?;
        if updated.rows_affected() != 1 {
            return Err(EcommerceError::Internal(format!("stock update lost for product {product_id}")));
        }
        Ok(())
    }

    async fn review(&mut self, id: Uuid) -> Result<Option<Review>> {
        let review = sqlx::query_as::<_, Review>("SELECT * FROM reviews WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut *self.tx)
            .await?;
        Ok(review)
    }

    async fn review_by_author(&mut self, product_id: Uuid, user_id: Uuid) -> Result<Option<Review>> {
        let review = sqlx::query_as::<_, Review>("SELECT * FROM reviews WHERE product_id = $1 AND user_id = $2")
            .bind(product_id).bind(user_id)
            .fetch_optional(&mut *self.tx)
            .await?;
        Ok(review)
    }

    async fn insert_review(&mut self, user_id: Uuid, r: &NewReview) -> Result<Review> {
        sqlx::query_as::<_, Review>(
            "INSERT INTO reviews (id, product_id, user_id, rating, comment, created_at) VALUES ($1, $2, $3, $4, $5, NOW()) RETURNING *",
        )
        .bind(Uuid::now_v7()).bind(r.product_id).bind(user_id).bind(r.rating).bind(&r.comment)
        .fetch_one(&mut *self.tx)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                EcommerceError::Duplicate("You have already reviewed this product".into())
            } else {
                e.into()
            }
        })
    }

    async fn delete_review(&mut self, id: Uuid) -> Result<()> {
        sqlx::query("DELETE FROM reviews WHERE id = $1").bind(id).execute(&mut *self.tx).await?;
        Ok(())
    }

    async fn product_ratings(&mut self, product_id: Uuid) -> Result<Vec<i16>> {
        let ratings = sqlx::query_scalar::<_, i16>("SELECT rating FROM reviews WHERE product_id = $1")
            .bind(product_id)
            .fetch_all(&mut *self.tx)
            .await?;
        Ok(ratings)
    }

    async fn set_product_rating(&mut self, product_id: Uuid, rating: Decimal) -> Result<()> {
        sqlx::query("UPDATE products SET rating = $2, updated_at = NOW() WHERE id = $1")
            .bind(product_id).bind(rating)
            .execute(&mut *self.tx)
            .await?;
        Ok(())
    }

    async fn commit(self) -> Result<()> {
        self.tx.commit().await?;
        Ok(())
    }
}
