use axum::{
    extract::{Query, State},
    http::StatusCode,
    Form, Json,
};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use super::AppState;
use crate::auth::{self, CurrentUser, Token};
use crate::domain::aggregates::{Registration, User};
use crate::store::is_unique_violation;
use crate::{EcommerceError, Result};

pub async fn register(State(s): State<AppState>, Json(r): Json<Registration>) -> Result<(StatusCode, Json<User>)> {
    r.validate()?;
    let email = r.normalized_email();
    let hashed = auth::hash_password(&r.password)?;
    let user = sqlx::query_as::<_, User>(
        "INSERT INTO users (id, email, hashed_password, full_name, is_active, created_at) VALUES ($1, $2, $3, $4, TRUE, NOW()) RETURNING *",
    )
    .bind(Uuid::now_v7()).bind(&email).bind(&hashed).bind(&r.full_name)
    .fetch_one(&s.db)
    .await
    .map_err(|e| if is_unique_violation(&e) { EcommerceError::Duplicate("Email already registered".into()) } else { e.into() })?;
    tracing::info!(user_id = %user.id, "user registered");
    Ok((StatusCode::CREATED, Json(user)))
}

/// OAuth2 password-flow form; `username` carries the email.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

pub async fn login(State(s): State<AppState>, Form(f): Form<LoginForm>) -> Result<Json<Token>> {
    let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = $1")
        .bind(f.username.trim().to_lowercase())
        .fetch_optional(&s.db)
        .await?
        .filter(|u| auth::verify_password(&f.password, &u.hashed_password))
        .ok_or(EcommerceError::BadCredentials)?;
    if !user.is_active {
        return Err(EcommerceError::InactiveUser);
    }
    let token = auth::issue_token(&s.settings.secret_key, &user.email, s.settings.access_token_expire_minutes)?;
    Ok(Json(token))
}

pub async fn me(CurrentUser(user): CurrentUser) -> Json<User> {
    Json(user)
}

#[derive(Debug, Deserialize)]
pub struct ProfileUpdate {
    pub full_name: Option<String>,
}

pub async fn update_me(
    State(s): State<AppState>,
    CurrentUser(user): CurrentUser,
    Query(p): Query<ProfileUpdate>,
) -> Result<Json<User>> {
    let Some(full_name) = p.full_name.filter(|n| !n.trim().is_empty()) else { return Ok(Json(user)) };
    let user = sqlx::query_as::<_, User>("UPDATE users SET full_name = $2, updated_at = NOW() WHERE id = $1 RETURNING *")
        .bind(user.id).bind(full_name.trim())
        .fetch_one(&s.db)
        .await?;
    Ok(Json(user))
}
