use chrono::Utc;
use image::codecs::jpeg::JpegEncoder;
use image::ExtendedColorType;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use super::frame::{FramePayload, RawFrame, JPEG_CONTENT_TYPE};
use super::source::FrameTap;
use crate::error::{EncodeError, Result};

/// Configuration for frame sampling
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SamplerConfig {
    /// Sampling cadence in milliseconds
    pub interval_ms: u64,
    /// JPEG quality (1-100)
    pub jpeg_quality: u8,
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self {
            interval_ms: 1500,
            jpeg_quality: 85,
        }
    }
}

/// Grabs the current frame behind a handle and encodes it for transmission
#[derive(Debug)]
pub struct FrameSampler {
    interval_ms: AtomicU64,
    jpeg_quality: u8,
    next_index: AtomicU64,
}

impl FrameSampler {
    pub fn new(config: &SamplerConfig) -> Self {
        Self {
            interval_ms: AtomicU64::new(config.interval_ms.max(1)),
            jpeg_quality: config.jpeg_quality.clamp(1, 100),
            next_index: AtomicU64::new(0),
        }
    }

    /// Set the sampling cadence. Takes effect the next time the timer is armed.
    pub fn configure(&self, interval: Duration) {
        let ms = (interval.as_millis() as u64).max(1);
        self.interval_ms.store(ms, Ordering::SeqCst);
        debug!("Sampling interval set to {}ms", ms);
    }

    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms.load(Ordering::SeqCst))
    }

    /// Read the current frame and encode it as JPEG
    ///
    /// Fails with [`EncodeError::NotReady`] while the stream has not produced video yet.
    pub fn sample_once(&self, frames: &FrameTap) -> Result<FramePayload> {
        let frame = frames.grab();
        self.encode(&frame)
    }

    /// [`sample_once`](Self::sample_once) on the blocking pool, keeping JPEG work off the runtime
    pub async fn sample(self: Arc<Self>, frames: FrameTap) -> Result<FramePayload> {
        tokio::task::spawn_blocking(move || self.sample_once(&frames))
            .await
            .map_err(|e| EncodeError::Jpeg(format!("encode task failed: {}", e)))?
    }

    /// Encode an already-grabbed frame
    pub fn encode(&self, frame: &RawFrame) -> Result<FramePayload> {
        if frame.is_empty() {
            return Err(EncodeError::NotReady {
                width: frame.width,
                height: frame.height,
            }
            .into());
        }

        if frame.pixels.len() != frame.expected_len() {
            return Err(EncodeError::BufferSize {
                expected: frame.expected_len(),
                actual: frame.pixels.len(),
            }
            .into());
        }

        let mut bytes = Vec::new();
        let mut encoder = JpegEncoder::new_with_quality(&mut bytes, self.jpeg_quality);
        encoder
            .encode(&frame.pixels, frame.width, frame.height, ExtendedColorType::Rgb8)
            .map_err(|e| EncodeError::Jpeg(e.to_string()))?;

        let index = self.next_index.fetch_add(1, Ordering::SeqCst);

        debug!(
            "Encoded frame #{} ({}x{}, {} bytes)",
            index,
            frame.width,
            frame.height,
            bytes.len()
        );

        Ok(FramePayload {
            bytes,
            content_type: JPEG_CONTENT_TYPE,
            index,
            width: frame.width,
            height: frame.height,
            captured_at: Utc::now(),
        })
    }
}

impl Default for FrameSampler {
    fn default() -> Self {
        Self::new(&SamplerConfig::default())
    }
}
