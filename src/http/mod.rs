//! HTTP control API for the capture session
//!
//! This module exposes the session to front ends:
//! - GET /capture - Current state and prediction
//! - GET /capture/stats - Session counters
//! - POST /capture/start - Start capturing
//! - POST /capture/stop - Stop capturing
//! - POST /capture/toggle - Start or stop, depending on the current state
//! - GET /health - Health check

mod handlers;
mod routes;
mod state;

pub use handlers::CaptureStatusResponse;
pub use routes::create_router;
pub use state::AppState;
