// All Ten Nutrition API server
//
// POST /analyze_food with {"image": "<base64>"} to get an estimated
// nutrition breakdown. Labels come from the configured oracle when one
// is available; otherwise the estimate is a seeded mixed-meal guess.

use allten_nutrition_api::{app, config::ServerConfig, logging, oracle, AppState};
use std::sync::Arc;
use tracing::info;

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
    }
    info!("shutting down");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    let config = ServerConfig::from_env()?;
    logging::init(config.log_format);

    let oracle = oracle::from_config(&config);
    let state = Arc::new(AppState::new(&config, oracle));
    let label_source = state.label_source();

    let app = app(state);

    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(addr).await?;

    info!(%addr, label_source, "🚀 All Ten Nutrition API listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}
