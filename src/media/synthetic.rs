// Synthetic capture device: a moving gradient test pattern
//
// Useful for running the capture loop without camera hardware. The stream yields empty frames
// during its warm-up period, the same way a real camera reports zero dimensions before the first
// frame arrives.

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::info;

use super::frame::RawFrame;
use super::source::{CaptureIndicator, MediaSource, SessionHandle, VideoStream};
use crate::error::{DeviceError, Result};

pub struct SyntheticSource {
    width: u32,
    height: u32,
    warmup: Duration,
    indicator: CaptureIndicator,
}

impl SyntheticSource {
    pub fn new(width: u32, height: u32, warmup: Duration) -> Self {
        Self {
            width,
            height,
            warmup,
            indicator: CaptureIndicator::new("synthetic"),
        }
    }
}

#[async_trait]
impl MediaSource for SyntheticSource {
    async fn acquire(&self) -> Result<SessionHandle> {
        if self.width == 0 || self.height == 0 {
            return Err(DeviceError::NotFound(format!(
                "synthetic device with invalid resolution {}x{}",
                self.width, self.height
            ))
            .into());
        }

        self.indicator.claim()?;

        info!(
            "Synthetic stream opened ({}x{}, warm-up {}ms)",
            self.width,
            self.height,
            self.warmup.as_millis()
        );

        let stream = SyntheticStream {
            width: self.width,
            height: self.height,
            warmup: self.warmup,
            opened_at: Instant::now(),
            stopped: AtomicBool::new(false),
        };

        Ok(SessionHandle::new(Arc::new(stream)))
    }

    fn release(&self, handle: &SessionHandle) {
        if handle.stop_tracks() {
            info!("Synthetic stream {} stopped", handle.id());
            self.indicator.clear();
        }
    }

    fn is_active(&self) -> bool {
        self.indicator.is_on()
    }

    fn name(&self) -> &str {
        "synthetic"
    }
}

struct SyntheticStream {
    width: u32,
    height: u32,
    warmup: Duration,
    opened_at: Instant,
    stopped: AtomicBool,
}

impl VideoStream for SyntheticStream {
    fn latest_frame(&self) -> RawFrame {
        let elapsed = self.opened_at.elapsed();
        let timestamp_ms = elapsed.as_millis() as u64;

        if self.stopped.load(Ordering::SeqCst) || elapsed < self.warmup {
            return RawFrame::empty(timestamp_ms);
        }

        RawFrame {
            pixels: render_pattern(self.width, self.height, timestamp_ms),
            width: self.width,
            height: self.height,
            timestamp_ms,
        }
    }

    fn stop(&self) {
        self.stopped.store(true, Ordering::SeqCst);
    }

    fn label(&self) -> &str {
        "synthetic"
    }
}

/// Diagonal gradient scrolling one pixel every 10ms
fn render_pattern(width: u32, height: u32, timestamp_ms: u64) -> Vec<u8> {
    let shift = (timestamp_ms / 10) as u32;
    let mut pixels = Vec::with_capacity(width as usize * height as usize * 3);

    for y in 0..height {
        for x in 0..width {
            let r = ((x + shift) % 256) as u8;
            let g = ((y + shift / 2) % 256) as u8;
            let b = ((x + y) % 256) as u8;
            pixels.extend_from_slice(&[r, g, b]);
        }
    }

    pixels
}
