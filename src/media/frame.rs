use chrono::{DateTime, Utc};

/// Content type tag for JPEG payloads
pub const JPEG_CONTENT_TYPE: &str = "image/jpeg";

/// Raw video frame as read from a stream (8-bit RGB, row-major, no padding)
#[derive(Debug, Clone)]
pub struct RawFrame {
    /// RGB8 pixel data, `width * height * 3` bytes
    pub pixels: Vec<u8>,
    /// Frame width in pixels (0 while the stream is still warming up)
    pub width: u32,
    /// Frame height in pixels (0 while the stream is still warming up)
    pub height: u32,
    /// Milliseconds since the stream was opened
    pub timestamp_ms: u64,
}

impl RawFrame {
    /// Placeholder returned before the stream has produced real video
    pub fn empty(timestamp_ms: u64) -> Self {
        Self {
            pixels: Vec::new(),
            width: 0,
            height: 0,
            timestamp_ms,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Expected length of `pixels` for the frame dimensions
    pub fn expected_len(&self) -> usize {
        self.width as usize * self.height as usize * 3
    }
}

/// A single encoded frame ready for transmission
#[derive(Debug, Clone)]
pub struct FramePayload {
    /// Encoded image bytes
    pub bytes: Vec<u8>,
    /// MIME type of `bytes`
    pub content_type: &'static str,
    /// Monotonic per-session frame index (diagnoses out-of-order responses)
    pub index: u64,
    pub width: u32,
    pub height: u32,
    /// When the frame was sampled
    pub captured_at: DateTime<Utc>,
}

impl FramePayload {
    /// File name used in the multipart upload
    pub fn file_name(&self) -> &'static str {
        match self.content_type {
            JPEG_CONTENT_TYPE => "frame.jpg",
            _ => "frame.bin",
        }
    }
}
