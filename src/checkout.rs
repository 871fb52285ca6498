//! Checkout: turns a cart, shipping selection and optional coupon into a
//! persisted order.
//!
//! Validation runs in a fixed order and the first failure wins: empty cart,
//! then each line (quantity, product, stock), then the coupon. Nothing is
//! written until every check has passed, and the order header, its items and
//! the stock/sold updates commit in a single transaction.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::collections::HashMap;
use uuid::Uuid;
use validator::Validate;

use crate::domain::aggregates::{coupon, Cart, CartLine, NewOrder, OrderStatus, OrderWithItems, PricedLine};
use crate::domain::value_objects::OrderNumber;
use crate::pricing::{round_money, PriceSource, PricingPolicy, Quote, MAX_AMOUNT};
use crate::store::{Store, Transaction};
use crate::{EcommerceError, Result};

/// Attempts at finding an unused order number before giving up.
pub const ORDER_NUMBER_ATTEMPTS: usize = 5;

#[derive(Clone, Debug, Default, Deserialize, Validate)]
pub struct CheckoutRequest {
    #[validate]
    pub items: Vec<CartLine>,
    pub shipping_method: Option<String>,
    pub shipping_address: Option<String>,
    pub shipping_locality: Option<String>,
    pub shipping_region: Option<String>,
    pub coupon_code: Option<String>,
}

#[tracing::instrument(skip_all, fields(%user_id, lines = request.items.len()))]
pub async fn place_order<S: Store>(
    store: &S,
    policy: &PricingPolicy,
    user_id: Uuid,
    request: &CheckoutRequest,
    now: DateTime<Utc>,
) -> Result<OrderWithItems> {
    if request.items.is_empty() {
        return Err(EcommerceError::EmptyOrder);
    }

    let mut tx = store.begin().await?;

    let mut ids: Vec<Uuid> = request.items.iter().map(|l| l.product_id).collect();
    ids.sort_unstable();
    ids.dedup();
    let products: HashMap<Uuid, _> = tx.lock_products(&ids).await?.into_iter().map(|p| (p.id, p)).collect();

    let mut cart = Cart::new();
    for line in &request.items {
        if line.quantity < 1 {
            return Err(EcommerceError::InvalidQuantity);
        }
        let product = products.get(&line.product_id).ok_or(EcommerceError::ProductNotFound(line.product_id))?;
        if !product.has_stock_for(cart.reserved(product.id) + i64::from(line.quantity)) {
            return Err(EcommerceError::InsufficientStock(product.title.clone()));
        }
        let unit_price = round_money(match policy.price_source {
            PriceSource::Catalog => product.price,
            PriceSource::Client => line.price,
        });
        cart.push(PricedLine { product_id: product.id, quantity: line.quantity, unit_price });
    }

    let subtotal = cart
        .subtotal()
        .filter(|s| *s <= MAX_AMOUNT)
        .ok_or_else(|| EcommerceError::Validation(format!("Order subtotal exceeds the maximum of {MAX_AMOUNT}")))?;
    let coupon_code = coupon::normalize_code(request.coupon_code.as_deref());
    let discount = match coupon_code {
        Some(code) => tx.active_coupon(code).await?.ok_or(EcommerceError::InvalidCoupon)?.discount_for(subtotal, now)?,
        None => rust_decimal::Decimal::ZERO,
    };
    let quote = Quote::new(subtotal, discount, policy.shipping.cost_for(subtotal));

    let mut order = None;
    for attempt in 1..=ORDER_NUMBER_ATTEMPTS {
        let number = OrderNumber::generate(now, &mut rand::thread_rng());
        let header = NewOrder {
            user_id,
            order_number: number.into_inner(),
            status: OrderStatus::Pending,
            subtotal: quote.subtotal,
            shipping_cost: quote.shipping_cost,
            discount: quote.discount,
            total: quote.total,
            coupon_code: coupon_code.map(str::to_string),
            shipping_method: request.shipping_method.clone(),
            shipping_address: request.shipping_address.clone(),
            shipping_locality: request.shipping_locality.clone(),
            shipping_region: request.shipping_region.clone(),
        };
        match tx.insert_order(&header).await? {
            Some(inserted) => {
                order = Some(inserted);
                break;
            }
            None => tracing::warn!(attempt, order_number = %header.order_number, "order number collision"),
        }
    }
    let order = order.ok_or(EcommerceError::OrderNumberExhausted)?;

    let mut items = Vec::with_capacity(cart.lines().len());
    for line in cart.lines() {
        items.push(tx.insert_order_item(order.id, line).await?);
        tx.record_sale(line.product_id, line.quantity).await?;
    }

    tx.commit().await?;
    tracing::info!(order_number = %order.order_number, total = %order.total, "order placed");
    Ok(OrderWithItems { order, items })
}
