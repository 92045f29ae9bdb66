mod auth;
mod config;
mod cookies;
mod error;
mod gateway;
mod handlers;
mod oauth;
mod render;
mod submission;
mod types;

use std::sync::Arc;

use axum::http::header::CACHE_CONTROL;
use axum::http::HeaderValue;
use axum::middleware;
use axum::routing::get;
use axum::Router;
use log::{info, warn};
use tower_http::set_header::SetResponseHeaderLayer;

use config::Config;
use gateway::GatewayClient;
use handlers::AppState;

fn app(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(handlers::index).post(handlers::submit))
        .layer(middleware::from_fn_with_state(state.clone(), auth::require_auth))
        .layer(SetResponseHeaderLayer::overriding(
            CACHE_CONTROL,
            HeaderValue::from_static("no-cache, must-revalidate, max-age=0"),
        ))
        .with_state(state)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if let Err(e) = dotenvy::dotenv() {
        if !e.not_found() {
            return Err(e.into());
        }
    }
    pretty_env_logger::init_timed();

    let config = Config::from_env()?;

    info!("Gateway: {}", config.gateway_url);
    info!("{} user(s) allowed, realm {:?}", config.users.len(), config.realm);
    if config.fallback_credentials.is_empty() {
        warn!("No consumer_key/consumer_secret configured, sends need browser-stored credentials");
    }

    let gateway = GatewayClient::new(&config.gateway_url)?;
    let addr = format!("0.0.0.0:{}", config.port);
    let state = Arc::new(AppState { config, gateway });

    info!("Starting server on {}", addr);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app(state)).await?;

    Ok(())
}
