use std::sync::Arc;

use anyhow::Context;
use axum::{
    Router, debug_handler,
    http::{HeaderValue, Method, header},
    response::IntoResponse,
    routing::get,
};
use backchat::{AppState, config::Config, relay};
use tower_http::cors::CorsLayer;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("backchat=debug,info")),
        )
        .init();

    let config = Config::from_env()?;

    let app_state = AppState {
        hub: Arc::new(relay::Hub::new()),
    };

    let cors = CorsLayer::new()
        .allow_origin(
            config
                .frontend_origin
                .parse::<HeaderValue>()
                .context("FRONTEND_ORIGIN is not a valid origin")?,
        )
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE])
        .allow_credentials(true);

    let app = Router::new()
        .route("/", get(hello))
        .merge(relay::router())
        .with_state(app_state)
        .layer(cors);

    info!("relay listening on {}", config.bind_addr);
    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

#[debug_handler]
async fn hello() -> impl IntoResponse {
    "backchat relay"
}
