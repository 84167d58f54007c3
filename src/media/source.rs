use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use super::frame::RawFrame;
use super::still::StillImageSource;
use super::synthetic::SyntheticSource;
use crate::error::{DeviceError, Result};

/// A live video stream opened on a capture device
pub trait VideoStream: Send + Sync {
    /// Current visual buffer. Empty (0x0) until the stream has produced video.
    fn latest_frame(&self) -> RawFrame;

    /// Stop every track of the stream
    fn stop(&self);

    /// Human-readable stream label for logging
    fn label(&self) -> &str;
}

/// Opaque reference to an acquired stream
///
/// Owned by the capture session for the duration of one capturing interval and handed back to
/// its [`MediaSource`] on stop.
pub struct SessionHandle {
    id: Uuid,
    stream: Arc<dyn VideoStream>,
    released: AtomicBool,
    opened_at: DateTime<Utc>,
}

impl SessionHandle {
    pub fn new(stream: Arc<dyn VideoStream>) -> Self {
        Self {
            id: Uuid::new_v4(),
            stream,
            released: AtomicBool::new(false),
            opened_at: Utc::now(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn label(&self) -> &str {
        self.stream.label()
    }

    pub fn opened_at(&self) -> DateTime<Utc> {
        self.opened_at
    }

    /// Read-only access to the frames behind this handle
    pub fn frames(&self) -> FrameTap {
        FrameTap::new(Arc::clone(&self.stream))
    }

    pub fn is_released(&self) -> bool {
        self.released.load(Ordering::SeqCst)
    }

    /// Stop the underlying tracks. Returns true only for the call that actually released them.
    pub fn stop_tracks(&self) -> bool {
        if self.released.swap(true, Ordering::SeqCst) {
            return false;
        }
        self.stream.stop();
        true
    }
}

impl std::fmt::Debug for SessionHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionHandle")
            .field("id", &self.id)
            .field("label", &self.stream.label())
            .field("released", &self.is_released())
            .finish()
    }
}

/// Frame reader detached from the handle's release capability
#[derive(Clone)]
pub struct FrameTap {
    stream: Arc<dyn VideoStream>,
}

impl FrameTap {
    pub fn new(stream: Arc<dyn VideoStream>) -> Self {
        Self { stream }
    }

    pub fn grab(&self) -> RawFrame {
        self.stream.latest_frame()
    }
}

/// Capture device abstraction
///
/// Implementations:
/// - Synthetic: generated test pattern (development, tests)
/// - Still: a decoded image file served as the live frame
#[async_trait]
pub trait MediaSource: Send + Sync {
    /// Request exclusive access to the device
    async fn acquire(&self) -> Result<SessionHandle>;

    /// Stop all tracks behind `handle`. Safe to call more than once.
    fn release(&self, handle: &SessionHandle);

    /// Whether the capture indicator is currently on
    fn is_active(&self) -> bool;

    /// Source name for logging
    fn name(&self) -> &str;
}

/// Exclusive-use flag doubling as the physical capture indicator
#[derive(Debug)]
pub struct CaptureIndicator {
    name: String,
    on: AtomicBool,
}

impl CaptureIndicator {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            on: AtomicBool::new(false),
        }
    }

    /// Claim the device, failing if a handle is already outstanding
    pub fn claim(&self) -> Result<()> {
        self.on
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .map_err(|_| DeviceError::Busy)?;
        info!("Capture indicator on ({})", self.name);
        Ok(())
    }

    pub fn clear(&self) {
        if self.on.swap(false, Ordering::SeqCst) {
            info!("Capture indicator off ({})", self.name);
        }
    }

    pub fn is_on(&self) -> bool {
        self.on.load(Ordering::SeqCst)
    }
}

/// Kind of capture device
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    /// Generated moving test pattern
    #[default]
    Synthetic,
    /// Image file served as a still frame
    Still,
    /// Native camera (no backend compiled in)
    Camera,
}

/// Configuration for the capture device
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MediaSourceConfig {
    pub kind: MediaKind,
    /// Synthetic frame width
    pub width: u32,
    /// Synthetic frame height
    pub height: u32,
    /// Time after acquisition during which the stream yields empty frames
    pub warmup_ms: u64,
    /// Image path for the still source (`~` is expanded)
    pub path: Option<String>,
}

impl Default for MediaSourceConfig {
    fn default() -> Self {
        Self {
            kind: MediaKind::Synthetic,
            width: 640,
            height: 480,
            warmup_ms: 200,
            path: None,
        }
    }
}

/// Media source factory
pub struct MediaSourceFactory;

impl MediaSourceFactory {
    /// Create a capture source from configuration
    pub fn create(config: &MediaSourceConfig) -> Result<Arc<dyn MediaSource>> {
        match config.kind {
            MediaKind::Synthetic => Ok(Arc::new(SyntheticSource::new(
                config.width,
                config.height,
                std::time::Duration::from_millis(config.warmup_ms),
            ))),

            MediaKind::Still => {
                let path = config
                    .path
                    .as_deref()
                    .ok_or_else(|| DeviceError::NotFound("no image path configured".to_string()))?;
                let expanded = shellexpand::tilde(path).into_owned();
                Ok(Arc::new(StillImageSource::new(expanded)))
            }

            MediaKind::Camera => Err(DeviceError::Unsupported(
                "no native camera backend is compiled into this build".to_string(),
            )
            .into()),
        }
    }
}
