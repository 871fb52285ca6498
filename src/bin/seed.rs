//! Loads demo categories, products and coupons.
//!
//! Usage: `seed [path/to/catalog.json]`; without a path the bundled catalog is used.

use anyhow::{Context, Result};
use chrono::Utc;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use storefront::seed::{self, SeedData};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let data = match std::env::args().nth(1) {
        Some(path) => {
            let raw = std::fs::read_to_string(&path).with_context(|| format!("reading {path}"))?;
            SeedData::from_json(&raw)?
        }
        None => SeedData::bundled()?,
    };

    let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL must be set")?;
    let db = PgPoolOptions::new().max_connections(1).connect(&database_url).await?;
    sqlx::migrate!("./migrations").run(&db).await?;

    let report = seed::run(&db, &data, Utc::now()).await?;
    tracing::info!(?report, "seeding finished");
    Ok(())
}
