//! Capture session management
//!
//! This module provides the `CaptureSession` state machine that manages:
//! - Device acquisition and release
//! - The periodic sample timer
//! - Dispatching encoded frames to the recognition service
//! - The latest prediction text and capture state, published to subscribers

mod config;
mod session;
mod stats;

pub use config::SessionConfig;
pub use session::CaptureSession;
pub use stats::{CaptureState, SessionSnapshot, SessionStats, NO_TRANSCRIPTION};
