mod config;
mod errors;
mod models;
mod routes;
mod screening;
mod session;
mod state;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::routes::build_router;
use crate::screening::nlp::HeuristicAnalyzer;
use crate::session::build_session_store;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails fast on malformed env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={},tower_http={}",
                env!("CARGO_CRATE_NAME"),
                &config.rust_log,
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Resume Screener v{}", env!("CARGO_PKG_VERSION"));

    // Initialize session store (memory / file / redis)
    let sessions = build_session_store(&config).await?;

    // Rule-based language pipeline; swap for a model-backed TextAnalyzer here
    let analyzer = Arc::new(HeuristicAnalyzer);

    info!(
        "Upload limit: {} MiB per request",
        config.max_upload_bytes / (1024 * 1024)
    );

    let state = AppState {
        config: config.clone(),
        analyzer,
        sessions,
    };

    let app = build_router(state).layer(TraceLayer::new_for_http());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
