use crate::session::CaptureSession;
use std::sync::Arc;

/// Shared application state for HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// The process-wide capture session
    pub session: Arc<CaptureSession>,
}

impl AppState {
    pub fn new(session: Arc<CaptureSession>) -> Self {
        Self { session }
    }
}
