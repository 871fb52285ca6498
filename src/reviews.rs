//! Review mutations. Each one recomputes the product rating inside the same
//! transaction, with the product row locked.

use rust_decimal::Decimal;
use uuid::Uuid;

use crate::domain::aggregates::{review::average_rating, NewReview, Review};
use crate::store::{Store, Transaction};
use crate::{EcommerceError, Result};

#[derive(Clone, Debug)]
pub struct ReviewOutcome {
    pub review: Review,
    pub product_rating: Decimal,
}

pub async fn add_review<S: Store>(store: &S, user_id: Uuid, new: &NewReview) -> Result<ReviewOutcome> {
    let mut tx = store.begin().await?;
    if tx.lock_products(&[new.product_id]).await?.is_empty() {
        return Err(EcommerceError::ProductNotFound(new.product_id));
    }
    if tx.review_by_author(new.product_id, user_id).await?.is_some() {
        return Err(EcommerceError::Duplicate("You have already reviewed this product".into()));
    }
    let review = tx.insert_review(user_id, new).await?;
    let product_rating = recompute_rating(&mut tx, new.product_id).await?;
    tx.commit().await?;
    tracing::info!(review_id = %review.id, product_id = %review.product_id, %product_rating, "review added");
    Ok(ReviewOutcome { review, product_rating })
}

pub async fn remove_review<S: Store>(store: &S, user_id: Uuid, review_id: Uuid) -> Result<ReviewOutcome> {
    let mut tx = store.begin().await?;
    let review = tx.review(review_id).await?.ok_or(EcommerceError::NotFound("Review"))?;
    if review.user_id != user_id {
        return Err(EcommerceError::Forbidden("Not authorized to delete this review".into()));
    }
    tx.lock_products(&[review.product_id]).await?;
    tx.delete_review(review.id).await?;
    let product_rating = recompute_rating(&mut tx, review.product_id).await?;
    tx.commit().await?;
    tracing::info!(%review_id, product_id = %review.product_id, %product_rating, "review removed");
    Ok(ReviewOutcome { review, product_rating })
}

async fn recompute_rating<T: Transaction>(tx: &mut T, product_id: Uuid) -> Result<Decimal> {
    let rating = average_rating(&tx.product_ratings(product_id).await?);
    tx.set_product_rating(product_id, rating).await?;
    Ok(rating)
}
