use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::time::Instant;
use tracing::info;

use super::frame::RawFrame;
use super::source::{CaptureIndicator, MediaSource, SessionHandle, VideoStream};
use crate::error::{DeviceError, Result};

/// Capture device backed by an image file
///
/// The file is decoded on every acquisition, so replacing it between sessions is picked up.
pub struct StillImageSource {
    path: PathBuf,
    indicator: CaptureIndicator,
}

impl StillImageSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            indicator: CaptureIndicator::new("still"),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl MediaSource for StillImageSource {
    async fn acquire(&self) -> Result<SessionHandle> {
        self.indicator.claim()?;

        let path = self.path.clone();
        let decoded = tokio::task::spawn_blocking(move || decode_image(&path))
            .await
            .map_err(|e| DeviceError::Io(format!("decode task failed: {}", e)));

        let (pixels, width, height) = match decoded.and_then(|r| r) {
            Ok(image) => image,
            Err(e) => {
                self.indicator.clear();
                return Err(e.into());
            }
        };

        info!(
            "Still image stream opened: {} ({}x{})",
            self.path.display(),
            width,
            height
        );

        let stream = StillStream {
            label: self.path.display().to_string(),
            pixels,
            width,
            height,
            opened_at: Instant::now(),
            stopped: AtomicBool::new(false),
        };

        Ok(SessionHandle::new(Arc::new(stream)))
    }

    fn release(&self, handle: &SessionHandle) {
        if handle.stop_tracks() {
            info!("Still image stream {} stopped", handle.id());
            self.indicator.clear();
        }
    }

    fn is_active(&self) -> bool {
        self.indicator.is_on()
    }

    fn name(&self) -> &str {
        "still"
    }
}

fn decode_image(path: &Path) -> std::result::Result<(Vec<u8>, u32, u32), DeviceError> {
    if !path.exists() {
        return Err(DeviceError::NotFound(path.display().to_string()));
    }

    let image = image::open(path).map_err(|e| match e {
        image::ImageError::IoError(io) if io.kind() == std::io::ErrorKind::PermissionDenied => {
            DeviceError::PermissionDenied
        }
        other => DeviceError::Io(format!("{}: {}", path.display(), other)),
    })?;

    let rgb = image.into_rgb8();
    let (width, height) = rgb.dimensions();
    Ok((rgb.into_raw(), width, height))
}

struct StillStream {
    label: String,
    pixels: Vec<u8>,
    width: u32,
    height: u32,
    opened_at: Instant,
    stopped: AtomicBool,
}

impl VideoStream for StillStream {
    fn latest_frame(&self) -> RawFrame {
        let timestamp_ms = self.opened_at.elapsed().as_millis() as u64;
        if self.stopped.load(Ordering::SeqCst) {
            return RawFrame::empty(timestamp_ms);
        }

        RawFrame {
            pixels: self.pixels.clone(),
            width: self.width,
            height: self.height,
            timestamp_ms,
        }
    }

    fn stop(&self) {
        self.stopped.store(true, Ordering::SeqCst);
    }

    fn label(&self) -> &str {
        &self.label
    }
}
