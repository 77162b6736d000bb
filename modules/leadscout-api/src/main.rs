use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use anyhow::Result;
use axum::{
    routing::{get, post},
    Router,
};
use tokio::sync::Mutex;
use tracing::info;
use tracing_subscriber::EnvFilter;

use leadscout_common::Config;
use leadscout_scout::scout::ScoutStats;

mod rest;

pub struct AppState {
    pub config: Config,
    /// At-most-one-run guard shared by the interval loop and /run-now.
    pub running: AtomicBool,
    pub last_run: Mutex<Option<ScoutStats>>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("leadscout=info".parse()?))
        .init();

    info!("LeadScout starting...");

    let config = Config::from_env();
    config.log_redacted();

    let addr = format!("{}:{}", config.web_host, config.web_port);
    let interval_hours = config.discovery_interval_hours;

    let state = Arc::new(AppState {
        config,
        running: AtomicBool::new(false),
        last_run: Mutex::new(None),
    });

    rest::start_discovery_interval(state.clone(), interval_hours);

    let app = Router::new()
        .route("/health", get(rest::health))
        .route("/run-now", post(rest::run_now))
        .route("/status", get(rest::status))
        .with_state(state)
        .layer(
            tower_http::cors::CorsLayer::new()
                .allow_origin(tower_http::cors::Any)
                .allow_methods(tower_http::cors::Any)
                .allow_headers(tower_http::cors::Any),
        )
        .layer(
            tower_http::trace::TraceLayer::new_for_http().make_span_with(
                |request: &axum::http::Request<_>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        path = %request.uri().path(),
                    )
                },
            ),
        );

    info!("LeadScout API listening on {addr}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
