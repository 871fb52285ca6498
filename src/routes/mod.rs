//! HTTP surface.

use axum::{
    http::{HeaderValue, Method},
    routing::{delete, get, patch, post},
    Json, Router,
};
use sqlx::PgPool;
use std::sync::Arc;
use tower_http::{
    cors::{AllowHeaders, CorsLayer},
    trace::TraceLayer,
};

use crate::config::Settings;
use crate::notify::EventBus;
use crate::store::PgStore;

mod account;
mod catalog;
mod coupons;
mod favorites;
mod orders;
mod reviews;

#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub store: PgStore,
    pub events: EventBus,
    pub settings: Arc<Settings>,
}

impl AppState {
    pub fn new(db: PgPool, events: EventBus, settings: Settings) -> Self {
        Self { store: PgStore::new(db.clone()), db, events, settings: Arc::new(settings) }
    }
}

pub fn router(state: AppState) -> Router {
    let origins: Vec<HeaderValue> = state.settings.cors_origins().iter().filter_map(|o| o.parse().ok()).collect();
    let cors = CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::PATCH, Method::DELETE, Method::OPTIONS])
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true);

    Router::new()
        .route("/", get(root))
        .route("/health", get(|| async { Json(serde_json::json!({"status": "healthy", "service": "storefront"})) }))
        .route("/api/auth/register", post(account::register))
        .route("/api/auth/login", post(account::login))
        .route("/api/auth/me", get(account::me).put(account::update_me))
        .route("/api/products", get(catalog::list_products).post(catalog::create_product))
        .route("/api/products/sku/:sku", get(catalog::get_product_by_sku))
        .route("/api/products/:id", get(catalog::get_product).put(catalog::update_product).delete(catalog::delete_product))
        .route("/api/categories", get(catalog::list_categories).post(catalog::create_category))
        .route("/api/categories/:id", get(catalog::get_category))
        .route("/api/reviews", post(reviews::create_review))
        .route("/api/reviews/product/:product_id", get(reviews::list_product_reviews))
        .route("/api/reviews/:id", delete(reviews::delete_review))
        .route("/api/favorites", get(favorites::list_favorites).post(favorites::add_favorite))
        .route("/api/favorites/:product_id", delete(favorites::remove_favorite))
        .route("/api/favorites/:product_id/check", get(favorites::check_favorite))
        .route("/api/orders", get(orders::list_orders).post(orders::create_order))
        .route("/api/orders/:id", get(orders::get_order).delete(orders::delete_order))
        .route("/api/orders/:id/status", patch(orders::update_order_status))
        .route("/api/coupons/validate", post(coupons::validate_coupon))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

async fn root() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "message": "Storefront API",
        "status": "online",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
