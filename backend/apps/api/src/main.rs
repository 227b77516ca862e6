//! API Server Entry Point
//!
//! Application entry point and server initialization.
//! Uses `anyhow` for startup errors, but application-level
//! errors should use `kernel::error::AppError`.

mod app;
mod config;
mod middleware;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use auth::{AuthAppState, PgUserRepository};
use axum::http::{self, Method, header};
use catalog::{CatalogAppState, PgCatalogRepository};
use kernel::clock::{Clock, SystemClock};
use platform::rate_limit::MemoryRateLimitStore;
use sqlx::postgres::PgPoolOptions;
use tokio::net::TcpListener;
use tower_http::cors::{AllowHeaders, AllowMethods, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::ApiConfig;
use crate::middleware::RateLimitState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "api=info,auth=info,catalog=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ApiConfig::from_env()?;
    kernel::error::exposure::set_expose_details(config.is_development());

    // Database connection
    let pool = PgPoolOptions::new()
        .max_connections(config.database_max_connections)
        .connect(&config.database_url)
        .await?;

    tracing::info!("Connected to database");

    // Run migrations
    sqlx::migrate!("../../../database/migrations")
        .run(&pool)
        .await?;

    tracing::info!("Migrations completed");

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);

    let auth_state = AuthAppState::new(
        PgUserRepository::new(pool.clone()),
        config.auth_config(),
        clock.clone(),
    );
    let catalog_state = CatalogAppState::new(
        PgCatalogRepository::new(pool.clone()),
        config.catalog_config(),
        auth_state.clone(),
    );

    // Rate limiting, with a background sweep of finished windows
    let limiter = RateLimitState::new(
        MemoryRateLimitStore::new(clock.clone()),
        config.rate_limit.clone(),
    );
    spawn_rate_limit_purge(limiter.clone());

    // CORS configuration
    let allowed_origins: Vec<http::HeaderValue> = config
        .frontend_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    let cors = CorsLayer::new()
        .allow_origin(allowed_origins)
        .allow_methods(AllowMethods::list([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ]))
        .allow_headers(AllowHeaders::list([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            header::ACCEPT,
            header::CACHE_CONTROL,
        ]))
        .allow_credentials(true);

    // Build router
    let app = app::build_router(auth_state, catalog_state, limiter)
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!(environment = ?config.environment, "Listening on {}", addr);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}

fn spawn_rate_limit_purge(limiter: RateLimitState) {
    let period = limiter.config.window.max(Duration::from_secs(60));
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        loop {
            ticker.tick().await;
            let removed = limiter.store.purge_expired(&limiter.config);
            if removed > 0 {
                tracing::debug!(removed, "Purged finished rate limit windows");
            }
        }
    });
}
