mod config;
mod domain;
mod error;
mod middleware;
mod services;
mod state;
mod store;
mod web;

use std::sync::Arc;

use sqlx::postgres::PgPoolOptions;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::{AppConfig, StoreBackend};
use crate::middleware::RateLimiter;
use crate::state::{AppState, SharedState};
use crate::store::{MemoryStore, PgStore, WellnessStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::from_env()?;

    let store: Arc<dyn WellnessStore> = match &config.backend {
        StoreBackend::Postgres { database_url } => {
            tracing::info!("connecting to database");
            let pool = PgPoolOptions::new()
                .max_connections(10)
                .connect(database_url)
                .await?;
            tracing::info!("running database migrations");
            sqlx::migrate!("./migrations").run(&pool).await?;
            Arc::new(PgStore::new(pool))
        }
        StoreBackend::Memory => {
            tracing::warn!("using the in-memory store; data is lost on shutdown");
            Arc::new(MemoryStore::new())
        }
    };

    let shared: SharedState = Arc::new(AppState {
        store,
        session_key: config.session_key.clone(),
        login_limiter: RateLimiter::new(5, 60),
    });

    let app = web::routes(shared)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    tracing::info!("listening on {}", config.bind_addr);
    axum::serve(listener, app).await?;

    Ok(())
}
