//! Evac Server - evacuation route and safe-zone aggregation

use anyhow::Result;
use evac_providers::ProviderSet;
use evac_server::{api, config::Config, logging, state::AppState, Engine};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env();
    logging::init(config.log_json, "evac_server=debug,evac_providers=info")?;

    tracing::info!("Starting Evac Server...");

    let providers = ProviderSet::from_settings(&config.providers)?;
    if config.providers.maps_api_key.is_none() {
        tracing::warn!("EVAC_MAPS_API_KEY not set; safe zones will be synthetic");
    }
    let engine = Engine::new(providers, config.policy.clone());
    let state = Arc::new(AppState::new(engine, &config));
    let shutdown = state.shutdown.clone();

    let app = api::routes()
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            if let Err(err) = tokio::signal::ctrl_c().await {
                tracing::warn!("Failed to listen for shutdown signal: {}", err);
                std::future::pending::<()>().await;
            }
            tracing::info!("Shutting down; cancelling in-flight aggregations");
            shutdown.cancel();
        })
        .await?;

    Ok(())
}
