//! Domain events
use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

use crate::domain::aggregates::{OrderStatus, OrderWithItems};

#[derive(Clone, Debug, Serialize)]
#[serde(untagged)]
pub enum DomainEvent {
    Order(OrderEvent),
    Review(ReviewEvent),
}

#[derive(Clone, Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OrderEvent {
    Placed { order_id: Uuid, order_number: String, user_id: Uuid, total: Decimal, items: usize },
    StatusChanged { order_id: Uuid, status: OrderStatus },
    Deleted { order_id: Uuid },
}

#[derive(Clone, Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ReviewEvent {
    Added { review_id: Uuid, product_id: Uuid, product_rating: Decimal },
    Removed { review_id: Uuid, product_id: Uuid, product_rating: Decimal },
}

impl DomainEvent {
    pub fn order_placed(placed: &OrderWithItems) -> Self {
        Self::Order(OrderEvent::Placed {
            order_id: placed.order.id,
            order_number: placed.order.order_number.clone(),
            user_id: placed.order.user_id,
            total: placed.order.total,
            items: placed.items.len(),
        })
    }

    pub fn subject(&self) -> &'static str {
        match self {
            Self::Order(OrderEvent::Placed { .. }) => "ecommerce.order.placed",
            Self::Order(OrderEvent::StatusChanged { .. }) => "ecommerce.order.status_changed",
            Self::Order(OrderEvent::Deleted { .. }) => "ecommerce.order.deleted",
            Self::Review(ReviewEvent::Added { .. }) => "ecommerce.review.added",
            Self::Review(ReviewEvent::Removed { .. }) => "ecommerce.review.removed",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_subject_and_payload() {
        let event = DomainEvent::Review(ReviewEvent::Removed { review_id: Uuid::nil(), product_id: Uuid::nil(), product_rating: dec!(4.5) });
        assert_eq!(event.subject(), "ecommerce.review.removed");
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "removed");
        assert_eq!(json["product_rating"], 4.5);
    }

    #[test]
    fn test_status_changed_payload() {
        let event = DomainEvent::Order(OrderEvent::StatusChanged { order_id: Uuid::nil(), status: OrderStatus::Shipped });
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["status"], "shipped");
        assert_eq!(event.subject(), "ecommerce.order.status_changed");
    }
}
