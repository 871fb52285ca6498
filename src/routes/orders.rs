use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use serde::Deserialize;
use std::collections::HashMap;
use uuid::Uuid;
use validator::Validate;

use super::AppState;
use crate::auth::CurrentUser;
use crate::checkout::{self, CheckoutRequest};
use crate::domain::aggregates::{Order, OrderError, OrderItem, OrderStatus, OrderWithItems};
use crate::domain::events::{DomainEvent, OrderEvent};
use crate::{EcommerceError, Result};

/// Pairs each order with its items, keeping the order of `orders`.
fn attach_items(orders: Vec<Order>, items: Vec<OrderItem>) -> Vec<OrderWithItems> {
    let mut by_order: HashMap<Uuid, Vec<OrderItem>> = HashMap::new();
    for item in items {
        by_order.entry(item.order_id).or_default().push(item);
    }
    orders
        .into_iter()
        .map(|order| {
            let items = by_order.remove(&order.id).unwrap_or_default();
            OrderWithItems { order, items }
        })
        .collect()
}

async fn items_for(s: &AppState, order_ids: &[Uuid]) -> Result<Vec<OrderItem>> {
    let items = sqlx::query_as::<_, OrderItem>("SELECT * FROM order_items WHERE order_id = ANY($1)")
        .bind(order_ids)
        .fetch_all(&s.db)
        .await?;
    Ok(items)
}

async fn owned_order(s: &AppState, user_id: Uuid, id: Uuid) -> Result<Order> {
    sqlx::query_as::<_, Order>("SELECT * FROM orders WHERE id = $1 AND user_id = $2")
        .bind(id).bind(user_id)
        .fetch_optional(&s.db)
        .await?
        .ok_or(EcommerceError::NotFound("Order"))
}

pub async fn list_orders(State(s): State<AppState>, CurrentUser(user): CurrentUser) -> Result<Json<Vec<OrderWithItems>>> {
    let orders = sqlx::query_as::<_, Order>("SELECT * FROM orders WHERE user_id = $1 ORDER BY created_at DESC")
        .bind(user.id)
        .fetch_all(&s.db)
        .await?;
    let ids: Vec<Uuid> = orders.iter().map(|o| o.id).collect();
    let items = items_for(&s, &ids).await?;
    Ok(Json(attach_items(orders, items)))
}

pub async fn get_order(
    State(s): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<OrderWithItems>> {
    let order = owned_order(&s, user.id, id).await?;
    let items = items_for(&s, &[order.id]).await?;
    Ok(Json(OrderWithItems { order, items }))
}

pub async fn create_order(
    State(s): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(r): Json<CheckoutRequest>,
) -> Result<(StatusCode, Json<OrderWithItems>)> {
    r.validate()?;
    let placed = checkout::place_order(&s.store, &s.settings.pricing, user.id, &r, Utc::now()).await?;
    s.events.publish(DomainEvent::order_placed(&placed)).await;
    Ok((StatusCode::CREATED, Json(placed)))
}

#[derive(Debug, Deserialize)]
pub struct StatusParams {
    pub status: String,
}

pub async fn update_order_status(
    State(s): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<Uuid>,
    Query(p): Query<StatusParams>,
) -> Result<Json<OrderWithItems>> {
    let status: OrderStatus = p.status.trim().parse().map_err(|e: OrderError| EcommerceError::Validation(e.to_string()))?;
    let order = sqlx::query_as::<_, Order>("UPDATE orders SET status = $3, updated_at = NOW() WHERE id = $1 AND user_id = $2 RETURNING *")
        .bind(id).bind(user.id).bind(status.as_str())
        .fetch_optional(&s.db)
        .await?
        .ok_or(EcommerceError::NotFound("Order"))?;
    tracing::info!(order_number = %order.order_number, %status, "order status changed");
    s.events.publish(DomainEvent::Order(OrderEvent::StatusChanged { order_id: order.id, status })).await;
    let items = items_for(&s, &[order.id]).await?;
    Ok(Json(OrderWithItems { order, items }))
}

pub async fn delete_order(
    State(s): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>> {
    let owner: Uuid = sqlx::query_scalar("SELECT user_id FROM orders WHERE id = $1")
        .bind(id)
        .fetch_optional(&s.db)
        .await?
        .ok_or(EcommerceError::NotFound("Order"))?;
    if owner != user.id {
        return Err(EcommerceError::Forbidden("Not authorized to delete this order".into()));
    }
    sqlx::query("DELETE FROM orders WHERE id = $1").bind(id).execute(&s.db).await?;
    s.events.publish(DomainEvent::Order(OrderEvent::Deleted { order_id: id })).await;
    Ok(Json(serde_json::json!({"message": "Order deleted successfully"})))
}
