use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::AppState;
use crate::auth::CurrentUser;
use crate::domain::aggregates::{Favorite, Product};
use crate::store::is_unique_violation;
use crate::{EcommerceError, Result};

/// A favorite together with the product it points at.
#[derive(Debug, Serialize)]
pub struct FavoriteWithProduct {
    pub id: Uuid,
    pub user_id: Uuid,
    pub product_id: Uuid,
    pub product: Product,
    pub created_at: DateTime<Utc>,
}

pub async fn list_favorites(State(s): State<AppState>, CurrentUser(user): CurrentUser) -> Result<Json<Vec<FavoriteWithProduct>>> {
    let favorites = sqlx::query_as::<_, Favorite>("SELECT * FROM favorites WHERE user_id = $1 ORDER BY created_at DESC")
        .bind(user.id)
        .fetch_all(&s.db)
        .await?;
    let ids: Vec<Uuid> = favorites.iter().map(|f| f.product_id).collect();
    let mut products = sqlx::query_as::<_, Product>("SELECT * FROM products WHERE id = ANY($1)")
        .bind(&ids)
        .fetch_all(&s.db)
        .await?;

    let result = favorites
        .into_iter()
        .filter_map(|f| {
            let idx = products.iter().position(|p| p.id == f.product_id)?;
            Some(FavoriteWithProduct { id: f.id, user_id: f.user_id, product_id: f.product_id, product: products.swap_remove(idx), created_at: f.created_at })
        })
        .collect();
    Ok(Json(result))
}

#[derive(Debug, Deserialize)]
pub struct AddFavoriteRequest {
    pub product_id: Uuid,
}

pub async fn add_favorite(
    State(s): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(r): Json<AddFavoriteRequest>,
) -> Result<(StatusCode, Json<FavoriteWithProduct>)> {
    let product = sqlx::query_as::<_, Product>("SELECT * FROM products WHERE id = $1")
        .bind(r.product_id)
        .fetch_optional(&s.db)
        .await?
        .ok_or(EcommerceError::NotFound("Product"))?;
    let f = sqlx::query_as::<_, Favorite>("INSERT INTO favorites (id, user_id, product_id, created_at) VALUES ($1, $2, $3, NOW()) RETURNING *")
        .bind(Uuid::now_v7()).bind(user.id).bind(product.id)
        .fetch_one(&s.db)
        .await
        .map_err(|e| if is_unique_violation(&e) { EcommerceError::Duplicate("Product already in favorites".into()) } else { e.into() })?;
    Ok((StatusCode::CREATED, Json(FavoriteWithProduct { id: f.id, user_id: f.user_id, product_id: f.product_id, product, created_at: f.created_at })))
}

pub async fn remove_favorite(
    State(s): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(product_id): Path<Uuid>,
) -> Result<Json<serde_json::Value>> {
    let deleted = sqlx::query("DELETE FROM favorites WHERE user_id = $1 AND product_id = $2")
        .bind(user.id).bind(product_id)
        .execute(&s.db)
        .await?;
    if deleted.rows_affected() == 0 {
        return Err(EcommerceError::NotFound("Favorite"));
    }
    Ok(Json(serde_json::json!({"message": "Favorite removed successfully"})))
}

pub async fn check_favorite(
    State(s): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(product_id): Path<Uuid>,
) -> Result<Json<serde_json::Value>> {
    let is_favorite: bool = sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM favorites WHERE user_id = $1 AND product_id = $2)")
        .bind(user.id).bind(product_id)
        .fetch_one(&s.db)
        .await?;
    Ok(Json(serde_json::json!({"is_favorite": is_favorite})))
}
