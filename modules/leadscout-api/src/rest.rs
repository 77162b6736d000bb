use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde_json::json;
use tracing::{error, info};

use leadscout_scout::scout::Scout;

use crate::AppState;

/// Claim the run slot. Only one discovery run executes at a time; two runs
/// would race on the dedup snapshot and double-count persistence.
fn try_begin_run(state: &AppState) -> bool {
    state
        .running
        .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
        .is_ok()
}

/// Execute one discovery run and release the slot. Caller must have claimed
/// the slot via `try_begin_run`.
async fn run_discovery(state: Arc<AppState>) {
    let result = async {
        let scout = Scout::from_config(&state.config).await?;
        scout.run().await
    }
    .await;

    match result {
        Ok(stats) => {
            info!("Discovery run complete. {stats}");
            *state.last_run.lock().await = Some(stats);
        }
        Err(e) => error!(error = %e, "Discovery run failed"),
    }

    state.running.store(false, Ordering::SeqCst);
}

/// Spawn a discovery run in the background.
/// Returns false when one is already in progress.
pub fn spawn_discovery_run(state: Arc<AppState>) -> bool {
    if !try_begin_run(&state) {
        return false;
    }
    tokio::spawn(run_discovery(state));
    true
}

/// Periodic discovery loop. The first scheduled run fires one interval after
/// startup; /run-now covers immediate runs.
pub fn start_discovery_interval(state: Arc<AppState>, interval_hours: u64) {
    info!(interval_hours, "Starting discovery interval loop");

    tokio::spawn(async move {
        loop {
            tokio::time::sleep(Duration::from_secs(interval_hours * 3600)).await;

            if !try_begin_run(&state) {
                info!("Discovery interval: run already in progress, skipping tick");
                continue;
            }
            run_discovery(state.clone()).await;
        }
    });
}

// --- HTTP handlers ---

pub async fn health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    // Enabled flags only, never credential values
    Json(json!({
        "status": "active",
        "service": "leadscout",
        "sources": {
            "reddit": true,
            "x": state.config.twitter_enabled(),
            "linkedin": state.config.linkedin_enabled(),
        }
    }))
}

pub async fn run_now(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    if spawn_discovery_run(state) {
        (StatusCode::ACCEPTED, Json(json!({"status": "started"})))
    } else {
        (
            StatusCode::CONFLICT,
            Json(json!({"error": "Discovery run already in progress"})),
        )
    }
}

pub async fn status(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let last_run = state.last_run.lock().await;
    Json(json!({
        "running": state.running.load(Ordering::SeqCst),
        "last_run": *last_run,
    }))
}
