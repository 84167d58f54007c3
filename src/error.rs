//! Capture error taxonomy
//!
//! Every failure in the capture loop falls into one of four kinds. None of them is fatal: the
//! session logs the error, bumps a counter and waits for the next tick.

use thiserror::Error;

/// Camera acquisition failures (permission, hardware, exclusivity)
#[derive(Debug, Error)]
pub enum DeviceError {
    #[error("permission to access the capture device was denied")]
    PermissionDenied,

    #[error("capture device not found: {0}")]
    NotFound(String),

    #[error("capture device is already in use")]
    Busy,

    #[error("capture backend not supported: {0}")]
    Unsupported(String),

    #[error("capture device failed: {0}")]
    Io(String),
}

/// Frame encoding failures
#[derive(Debug, Error)]
pub enum EncodeError {
    /// The stream has not produced a usable frame yet (expected during startup)
    #[error("frame not ready ({width}x{height})")]
    NotReady { width: u32, height: u32 },

    #[error("frame buffer holds {actual} bytes, expected {expected}")]
    BufferSize { expected: usize, actual: usize },

    #[error("jpeg encoding failed: {0}")]
    Jpeg(String),
}

/// Transport-level failures talking to the recognition service
#[derive(Debug, Error)]
pub enum NetworkError {
    #[error("request to {url} failed: {reason}")]
    Transport { url: String, reason: String },

    #[error("background request task failed: {0}")]
    Join(String),
}

/// The service answered, but not with something usable
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("service returned {status} {reason}")]
    Status { status: u16, reason: String },

    #[error("malformed response body: {0}")]
    MalformedBody(String),
}

#[derive(Debug, Error)]
pub enum CaptureError {
    #[error(transparent)]
    Device(#[from] DeviceError),

    #[error(transparent)]
    Encode(#[from] EncodeError),

    #[error(transparent)]
    Network(#[from] NetworkError),

    #[error(transparent)]
    Service(#[from] ServiceError),
}

impl CaptureError {
    /// Short kind label for logs and counters
    pub fn kind(&self) -> &'static str {
        match self {
            CaptureError::Device(_) => "device",
            CaptureError::Encode(_) => "encode",
            CaptureError::Network(_) => "network",
            CaptureError::Service(_) => "service",
        }
    }

    /// Whether this is the expected "no frame yet" condition during stream warm-up
    pub fn is_not_ready(&self) -> bool {
        matches!(self, CaptureError::Encode(EncodeError::NotReady { .. }))
    }
}

pub type Result<T> = std::result::Result<T, CaptureError>;
