// Test doubles for the capture device and the recognition service

#![allow(dead_code)]

use async_trait::async_trait;
use gesture_capture::error::{CaptureError, DeviceError, Result};
use gesture_capture::media::{
    CaptureIndicator, FramePayload, MediaSource, RawFrame, SessionHandle, VideoStream,
};
use gesture_capture::recognition::{PredictionResult, Recognizer, ResetAck};
use gesture_capture::{CaptureSession, SamplerConfig, SessionConfig};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Capture device that counts acquisitions and releases
pub struct MockSource {
    pub acquires: AtomicUsize,
    pub releases: AtomicUsize,
    pub deny: AtomicBool,
    pub ready: Arc<AtomicBool>,
    indicator: CaptureIndicator,
}

impl MockSource {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            acquires: AtomicUsize::new(0),
            releases: AtomicUsize::new(0),
            deny: AtomicBool::new(false),
            ready: Arc::new(AtomicBool::new(true)),
            indicator: CaptureIndicator::new("mock"),
        })
    }

    pub fn denying() -> Arc<Self> {
        let source = Self::new();
        source.deny.store(true, Ordering::SeqCst);
        source
    }

    pub fn acquires(&self) -> usize {
        self.acquires.load(Ordering::SeqCst)
    }

    pub fn releases(&self) -> usize {
        self.releases.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MediaSource for MockSource {
    async fn acquire(&self) -> Result<SessionHandle> {
        if self.deny.load(Ordering::SeqCst) {
            return Err(DeviceError::PermissionDenied.into());
        }
        self.indicator.claim()?;
        self.acquires.fetch_add(1, Ordering::SeqCst);

        Ok(SessionHandle::new(Arc::new(MockStream {
            ready: Arc::clone(&self.ready),
        })))
    }

    fn release(&self, handle: &SessionHandle) {
        if handle.stop_tracks() {
            self.releases.fetch_add(1, Ordering::SeqCst);
            self.indicator.clear();
        }
    }

    fn is_active(&self) -> bool {
        self.indicator.is_on()
    }

    fn name(&self) -> &str {
        "mock"
    }
}

struct MockStream {
    ready: Arc<AtomicBool>,
}

impl VideoStream for MockStream {
    fn latest_frame(&self) -> RawFrame {
        if !self.ready.load(Ordering::SeqCst) {
            return RawFrame::empty(0);
        }
        RawFrame {
            pixels: vec![200; 4 * 4 * 3],
            width: 4,
            height: 4,
            timestamp_ms: 0,
        }
    }

    fn stop(&self) {}

    fn label(&self) -> &str {
        "mock"
    }
}

/// Scripted recognition service
///
/// Each predict call takes the next scripted `(delay, outcome)`; once the script runs out it
/// answers instantly with no detection.
pub struct MockRecognizer {
    script: Mutex<VecDeque<(Duration, Result<PredictionResult>)>>,
    pub predicts: AtomicUsize,
    pub resets: AtomicUsize,
    pub reset_delay: Mutex<Duration>,
    pub reset_error: Mutex<Option<CaptureError>>,
    pub frame_indices: Mutex<Vec<u64>>,
}

impl MockRecognizer {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(VecDeque::new()),
            predicts: AtomicUsize::new(0),
            resets: AtomicUsize::new(0),
            reset_delay: Mutex::new(Duration::ZERO),
            reset_error: Mutex::new(None),
            frame_indices: Mutex::new(Vec::new()),
        })
    }

    pub fn answer(&self, delay: Duration, text: &str) {
        self.script
            .lock()
            .unwrap()
            .push_back((delay, Ok(PredictionResult::new(text))));
    }

    pub fn fail(&self, delay: Duration, error: CaptureError) {
        self.script.lock().unwrap().push_back((delay, Err(error)));
    }

    /// Make the next reset call fail with `error`
    pub fn fail_reset(&self, error: CaptureError) {
        *self.reset_error.lock().unwrap() = Some(error);
    }

    pub fn predicts(&self) -> usize {
        self.predicts.load(Ordering::SeqCst)
    }

    pub fn resets(&self) -> usize {
        self.resets.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Recognizer for MockRecognizer {
    async fn predict(&self, payload: &FramePayload) -> Result<PredictionResult> {
        self.predicts.fetch_add(1, Ordering::SeqCst);
        self.frame_indices.lock().unwrap().push(payload.index);

        let next = self.script.lock().unwrap().pop_front();
        match next {
            Some((delay, outcome)) => {
                tokio::time::sleep(delay).await;
                outcome
            }
            None => Ok(PredictionResult::default()),
        }
    }

    async fn reset_session(&self) -> Result<ResetAck> {
        let delay = *self.reset_delay.lock().unwrap();
        tokio::time::sleep(delay).await;
        self.resets.fetch_add(1, Ordering::SeqCst);

        if let Some(error) = self.reset_error.lock().unwrap().take() {
            return Err(error);
        }
        Ok(ResetAck {
            message: "Capture reset".to_string(),
        })
    }
}

pub fn session_with(
    interval_ms: u64,
    source: Arc<MockSource>,
    recognizer: Arc<MockRecognizer>,
) -> CaptureSession {
    let config = SessionConfig {
        session_id: "test-session".to_string(),
        sampler: SamplerConfig {
            interval_ms,
            jpeg_quality: 80,
        },
        event_capacity: 100,
    };
    CaptureSession::new(config, source, recognizer)
}

pub async fn sleep_ms(ms: u64) {
    tokio::time::sleep(Duration::from_millis(ms)).await;
}
