//! Storefront backend
//!
//! Catalog, reviews, favorites and checkout over PostgreSQL.
//!
//! ## Features
//! - Product catalog and categories
//! - Reviews with aggregate product rating
//! - Favorites
//! - Checkout with coupons, shipping tiers and atomic stock updates
//! - JWT authentication

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use rust_decimal::Decimal;
use thiserror::Error;
use uuid::Uuid;

pub mod auth;
pub mod checkout;
pub mod config;
pub mod domain;
pub mod notify;
pub mod pricing;
pub mod reviews;
pub mod routes;
pub mod seed;
pub mod store;

pub use routes::{router, AppState};

// =============================================================================
// Error Types
// =============================================================================

#[derive(Error, Debug)]
pub enum EcommerceError {
    #[error("Order must contain at least one item")]
    EmptyOrder,

    #[error("Quantity must be at least 1")]
    InvalidQuantity,

    #[error("Product with ID {0} not found")]
    ProductNotFound(Uuid),

    #[error("Insufficient stock for product {0}")]
    InsufficientStock(String),

    #[error("Invalid coupon code")]
    InvalidCoupon,

    #[error("Coupon has expired")]
    CouponExpired,

    #[error("Minimum purchase of ${0} required for this coupon")]
    MinimumPurchaseNotMet(Decimal),

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("{0}")]
    Duplicate(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    Validation(String),

    #[error("Could not validate credentials")]
    Unauthenticated,

    #[error("Incorrect email or password")]
    BadCredentials,

    #[error("Inactive user")]
    InactiveUser,

    #[error("{0}")]
    Forbidden(String),

    #[error("Could not allocate a unique order number")]
    OrderNumberExhausted,

    #[error("Storage error: {0}")]
    StorageError(#[from] sqlx::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, EcommerceError>;

impl EcommerceError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::EmptyOrder
            | Self::InvalidQuantity
            | Self::InsufficientStock(_)
            | Self::InvalidCoupon
            | Self::CouponExpired
            | Self::MinimumPurchaseNotMet(_)
            | Self::Duplicate(_)
            | Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::ProductNotFound(_) | Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::Unauthenticated | Self::BadCredentials => StatusCode::UNAUTHORIZED,
            Self::InactiveUser | Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::OrderNumberExhausted | Self::StorageError(_) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl From<validator::ValidationErrors> for EcommerceError {
    fn from(err: validator::ValidationErrors) -> Self {
        Self::Validation(err.to_string())
    }
}

impl IntoResponse for EcommerceError {
    fn into_response(self) -> Response {
        let status = self.status();
        let detail = if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
            "Internal server error".to_string()
        } else {
            self.to_string()
        };
        let body = Json(serde_json::json!({
            "error": status.canonical_reason().unwrap_or("Error"),
            "detail": detail,
        }));
        let mut response = (status, body).into_response();
        if status == StatusCode::UNAUTHORIZED {
            response.headers_mut().insert(
                axum::http::header::WWW_AUTHENTICATE,
                axum::http::HeaderValue::from_static("Bearer"),
            );
        }
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_checkout_errors_are_client_errors() {
        assert_eq!(EcommerceError::EmptyOrder.status(), StatusCode::BAD_REQUEST);
        assert_eq!(EcommerceError::InsufficientStock("Lamp".into()).status(), StatusCode::BAD_REQUEST);
        assert_eq!(EcommerceError::ProductNotFound(Uuid::nil()).status(), StatusCode::NOT_FOUND);
        assert_eq!(EcommerceError::Forbidden("no".into()).status(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn test_minimum_purchase_message_names_threshold() {
        let err = EcommerceError::MinimumPurchaseNotMet(dec!(20000));
        assert_eq!(err.to_string(), "Minimum purchase of $20000 required for this coupon");
    }

    #[tokio::test]
    async fn test_server_errors_hide_detail() {
        let response = EcommerceError::Internal("pool exhausted".into()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["detail"], "Internal server error");
        assert_eq!(body["error"], "Internal Server Error");
    }
}
