use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use super::AppState;
use crate::auth::CurrentUser;
use crate::domain::aggregates::{NewReview, Review};
use crate::domain::events::{DomainEvent, ReviewEvent};
use crate::{reviews, EcommerceError, Result};

pub async fn list_product_reviews(State(s): State<AppState>, Path(product_id): Path<Uuid>) -> Result<Json<Vec<Review>>> {
    let exists: bool = sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM products WHERE id = $1)")
        .bind(product_id)
        .fetch_one(&s.db)
        .await?;
    if !exists {
        return Err(EcommerceError::NotFound("Product"));
    }
    let reviews = sqlx::query_as::<_, Review>("SELECT * FROM reviews WHERE product_id = $1 ORDER BY created_at DESC")
        .bind(product_id)
        .fetch_all(&s.db)
        .await?;
    Ok(Json(reviews))
}

pub async fn create_review(
    State(s): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(r): Json<NewReview>,
) -> Result<(StatusCode, Json<Review>)> {
    r.validate()?;
    let outcome = reviews::add_review(&s.store, user.id, &r).await?;
    s.events
        .publish(DomainEvent::Review(ReviewEvent::Added {
            review_id: outcome.review.id,
            product_id: outcome.review.product_id,
            product_rating: outcome.product_rating,
        }))
        .await;
    Ok((StatusCode::CREATED, Json(outcome.review)))
}

pub async fn delete_review(
    State(s): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>> {
    let outcome = reviews::remove_review(&s.store, user.id, id).await?;
    s.events
        .publish(DomainEvent::Review(ReviewEvent::Removed {
            review_id: outcome.review.id,
            product_id: outcome.review.product_id,
            product_rating: outcome.product_rating,
        }))
        .await;
    Ok(Json(serde_json::json!({"message": "Review deleted successfully"})))
}
