use super::state::AppState;
use crate::error::CaptureError;
use crate::session::{SessionSnapshot, SessionStats};
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::{Deserialize, Serialize};
use tracing::{error, info};

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Serialize, Deserialize)]
pub struct CaptureStatusResponse {
    #[serde(flatten)]
    pub snapshot: SessionSnapshot,

    /// Prediction or "No transcription available."
    pub display_text: String,

    /// "Click to start" / "Click to end"
    pub toggle_label: String,
}

impl From<SessionSnapshot> for CaptureStatusResponse {
    fn from(snapshot: SessionSnapshot) -> Self {
        Self {
            display_text: snapshot.display_text().to_string(),
            toggle_label: snapshot.toggle_label().to_string(),
            snapshot,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub kind: String,
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /capture
/// Current capture state and prediction
pub async fn get_capture(State(state): State<AppState>) -> impl IntoResponse {
    Json(CaptureStatusResponse::from(state.session.snapshot()))
}

/// GET /capture/stats
/// Session counters
pub async fn get_capture_stats(State(state): State<AppState>) -> impl IntoResponse {
    let stats: SessionStats = state.session.stats().await;
    Json(stats)
}

/// POST /capture/start
/// Start capturing; a no-op if already capturing
pub async fn start_capture(State(state): State<AppState>) -> Response {
    info!("Start requested");

    match state.session.start().await {
        Ok(_) => status_response(&state),
        Err(e) => start_failed(e),
    }
}

/// POST /capture/stop
/// Stop capturing; a no-op if idle
pub async fn stop_capture(State(state): State<AppState>) -> Response {
    info!("Stop requested");

    state.session.stop().await;
    status_response(&state)
}

/// POST /capture/toggle
/// Start when idle, stop when capturing
pub async fn toggle_capture(State(state): State<AppState>) -> Response {
    match state.session.toggle().await {
        Ok(new_state) => {
            info!("Toggled capture to {:?}", new_state);
            status_response(&state)
        }
        Err(e) => start_failed(e),
    }
}

/// GET /health
/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

fn status_response(state: &AppState) -> Response {
    (
        StatusCode::OK,
        Json(CaptureStatusResponse::from(state.session.snapshot())),
    )
        .into_response()
}

fn start_failed(e: CaptureError) -> Response {
    error!("Failed to start capture: {}", e);
    (
        StatusCode::SERVICE_UNAVAILABLE,
        Json(ErrorResponse {
            error: format!("Failed to start capture: {}", e),
            kind: e.kind().to_string(),
        }),
    )
        .into_response()
}
