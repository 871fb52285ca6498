//! Storefront API server

use anyhow::Result;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use storefront::{config::Settings, notify::EventBus, AppState};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let settings = Settings::from_env()?;
    let db = PgPoolOptions::new().max_connections(settings.db_max_connections).connect(&settings.database_url).await?;
    sqlx::migrate!("./migrations").run(&db).await?;
    let events = EventBus::connect(settings.nats_url.as_deref()).await;

    let addr = settings.bind_addr();
    let app = storefront::router(AppState::new(db, events, settings));

    tracing::info!(%addr, "storefront listening");
    axum::serve(tokio::net::TcpListener::bind(&addr).await?, app).await?;
    Ok(())
}
