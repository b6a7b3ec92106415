use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use portal::api::HttpCvApi;
use portal::cache::SystemClock;
use portal::config::Config;
use portal::matching::MatchService;
use portal::routes::build_router;
use portal::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting portal v{}", env!("CARGO_PKG_VERSION"));

    let api = Arc::new(HttpCvApi::new(
        &config.api_base_url,
        config.request_timeout_secs,
    )?);
    info!("CV service client initialized ({})", config.api_base_url);

    let matches = Arc::new(MatchService::new(
        api.clone(),
        config.match_cache_capacity,
        Arc::new(SystemClock),
    ));
    info!(
        "Match cache initialized (capacity {} per direction)",
        config.match_cache_capacity
    );

    let state = AppState {
        api,
        matches,
        config: config.clone(),
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
