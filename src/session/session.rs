use super::config::SessionConfig;
use super::stats::{CaptureState, SessionSnapshot, SessionStats};
use crate::error::Result;
use crate::media::{FrameSampler, MediaSource, SessionHandle};
use crate::recognition::{PredictionResult, Recognizer};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, error, info, warn};

/// Events consumed by the session loop
enum Event {
    Start(oneshot::Sender<Result<CaptureState>>),
    Stop(oneshot::Sender<CaptureState>),
    Toggle(oneshot::Sender<Result<CaptureState>>),
    Configure(Duration, oneshot::Sender<()>),
    Stats(oneshot::Sender<SessionStats>),
    Shutdown(oneshot::Sender<()>),
    /// Sample timer fired; `generation` identifies the timer that sent it
    Tick { epoch: u64, generation: u64 },
    /// A tick's sample/predict pipeline settled
    Outcome {
        epoch: u64,
        frame_index: Option<u64>,
        result: Result<PredictionResult>,
    },
}

/// A capture session that samples frames from a media source and displays the latest prediction
///
/// All state lives in a single event loop task; this type is a cheap front end that sends it
/// commands and reads its published snapshot.
pub struct CaptureSession {
    session_id: String,
    events: mpsc::Sender<Event>,
    snapshot: watch::Receiver<SessionSnapshot>,
    loop_handle: std::sync::Mutex<Option<JoinHandle<()>>>,
}

impl CaptureSession {
    /// Create a session and spawn its event loop. Must be called inside a tokio runtime.
    pub fn new(
        config: SessionConfig,
        source: Arc<dyn MediaSource>,
        recognizer: Arc<dyn Recognizer>,
    ) -> Self {
        info!(
            "Creating capture session: {} (source={}, interval={}ms)",
            config.session_id,
            source.name(),
            config.sampler.interval_ms
        );

        let (events_tx, events_rx) = mpsc::channel(config.event_capacity.max(1));
        let (snapshot_tx, snapshot_rx) = watch::channel(SessionSnapshot::default());

        let session_loop = SessionLoop::new(
            &config,
            source,
            recognizer,
            events_tx.clone(),
            snapshot_tx,
        );

        let loop_handle = tokio::spawn(session_loop.run(events_rx));

        Self {
            session_id: config.session_id,
            events: events_tx,
            snapshot: snapshot_rx,
            loop_handle: std::sync::Mutex::new(Some(loop_handle)),
        }
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// Start capturing (Idle → Capturing)
    ///
    /// A no-op while already capturing. If the device cannot be acquired the session stays Idle
    /// and the device error is returned.
    pub async fn start(&self) -> Result<CaptureState> {
        match self.request(Event::Start).await {
            Some(result) => result,
            None => Ok(self.closed_state()),
        }
    }

    /// Stop capturing (Capturing → Idle)
    ///
    /// Returns as soon as the state is Idle; the reset call to the service runs detached.
    pub async fn stop(&self) -> CaptureState {
        self.request(Event::Stop)
            .await
            .unwrap_or_else(|| self.closed_state())
    }

    /// Start when idle, stop when capturing
    pub async fn toggle(&self) -> Result<CaptureState> {
        match self.request(Event::Toggle).await {
            Some(result) => result,
            None => Ok(self.closed_state()),
        }
    }

    /// Change the sampling cadence. Re-arms the timer if currently capturing.
    pub async fn configure(&self, interval: Duration) {
        self.request(|tx| Event::Configure(interval, tx)).await;
    }

    /// Current session counters
    pub async fn stats(&self) -> SessionStats {
        self.request(Event::Stats).await.unwrap_or_default()
    }

    /// Latest published state
    pub fn snapshot(&self) -> SessionSnapshot {
        self.snapshot.borrow().clone()
    }

    /// Receive a notification on every state or prediction change
    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.snapshot.clone()
    }

    /// Stop capturing if needed and end the event loop
    pub async fn shutdown(&self) {
        if self.request(Event::Shutdown).await.is_none() {
            debug!("Capture session {} already shut down", self.session_id);
        }

        let handle = self.loop_handle.lock().ok().and_then(|mut h| h.take());
        if let Some(handle) = handle {
            if let Err(e) = handle.await {
                error!("Capture session loop panicked: {}", e);
            }
        }
    }

    async fn request<T>(&self, make: impl FnOnce(oneshot::Sender<T>) -> Event) -> Option<T> {
        let (tx, rx) = oneshot::channel();
        if self.events.send(make(tx)).await.is_err() {
            warn!("Capture session {} is shut down", self.session_id);
            return None;
        }
        rx.await.ok()
    }

    fn closed_state(&self) -> CaptureState {
        self.snapshot.borrow().state
    }
}

impl Drop for CaptureSession {
    fn drop(&mut self) {
        if let Ok(mut handle) = self.loop_handle.lock() {
            if let Some(handle) = handle.take() {
                handle.abort();
            }
        }
    }
}

/// State owned by the event loop task
struct SessionLoop {
    session_id: String,
    source: Arc<dyn MediaSource>,
    recognizer: Arc<dyn Recognizer>,
    sampler: Arc<FrameSampler>,
    events: mpsc::Sender<Event>,
    snapshot: watch::Sender<SessionSnapshot>,

    state: CaptureState,
    /// Present iff Capturing
    handle: Option<SessionHandle>,
    /// Present iff Capturing
    timer: Option<JoinHandle<()>>,
    /// Bumped on every start and stop; outcomes from another epoch are stale
    epoch: u64,
    /// Bumped every time a timer is armed; ticks from a replaced timer are dropped
    timer_generation: u64,
    prediction: String,
    updated_at: Option<DateTime<Utc>>,
    started_at: Option<DateTime<Utc>>,
    stats: SessionStats,
}

impl SessionLoop {
    fn new(
        config: &SessionConfig,
        source: Arc<dyn MediaSource>,
        recognizer: Arc<dyn Recognizer>,
        events: mpsc::Sender<Event>,
        snapshot: watch::Sender<SessionSnapshot>,
    ) -> Self {
        Self {
            session_id: config.session_id.clone(),
            source,
            recognizer,
            sampler: Arc::new(FrameSampler::new(&config.sampler)),
            events,
            snapshot,
            state: CaptureState::Idle,
            handle: None,
            timer: None,
            epoch: 0,
            timer_generation: 0,
            prediction: String::new(),
            updated_at: None,
            started_at: None,
            stats: SessionStats::default(),
        }
    }

    async fn run(mut self, mut events: mpsc::Receiver<Event>) {
        info!("Capture session loop started: {}", self.session_id);

        while let Some(event) = events.recv().await {
            match event {
                Event::Start(reply) => {
                    let result = self.start().await;
                    let _ = reply.send(result);
                }
                Event::Stop(reply) => {
                    let _ = reply.send(self.stop());
                }
                Event::Toggle(reply) => {
                    let result = match self.state {
                        CaptureState::Idle => self.start().await,
                        CaptureState::Capturing => Ok(self.stop()),
                    };
                    let _ = reply.send(result);
                }
                Event::Configure(interval, reply) => {
                    self.configure(interval);
                    let _ = reply.send(());
                }
                Event::Stats(reply) => {
                    let _ = reply.send(self.stats());
                }
                Event::Shutdown(reply) => {
                    self.stop();
                    let _ = reply.send(());
                    break;
                }
                Event::Tick { epoch, generation } => self.on_tick(epoch, generation),
                Event::Outcome {
                    epoch,
                    frame_index,
                    result,
                } => self.on_outcome(epoch, frame_index, result),
            }
        }

        info!("Capture session loop stopped: {}", self.session_id);
    }

    async fn start(&mut self) -> Result<CaptureState> {
        if self.state == CaptureState::Capturing {
            warn!("Capture already started");
            return Ok(self.state);
        }

        info!("Starting capture session: {}", self.session_id);

        // A leftover timer must never run alongside the new one
        self.disarm_timer();

        let handle = match self.source.acquire().await {
            Ok(handle) => handle,
            Err(e) => {
                error!("Error accessing capture device ({}): {}", self.source.name(), e);
                self.stats.failures += 1;
                return Err(e);
            }
        };

        info!("Acquired stream {} ({})", handle.id(), handle.label());

        self.handle = Some(handle);
        self.epoch += 1;
        self.state = CaptureState::Capturing;
        self.started_at = Some(Utc::now());
        self.arm_timer();
        self.publish();

        info!("Capture session started (epoch {})", self.epoch);

        Ok(self.state)
    }

    fn stop(&mut self) -> CaptureState {
        if self.state == CaptureState::Idle {
            debug!("Capture not active");
            return self.state;
        }

        info!("Stopping capture session: {}", self.session_id);

        self.state = CaptureState::Idle;
        self.disarm_timer();

        if let Some(handle) = self.handle.take() {
            self.source.release(&handle);
        }

        self.epoch += 1;
        self.started_at = None;
        self.publish();

        self.stats.resets_sent += 1;
        let recognizer = Arc::clone(&self.recognizer);
        tokio::spawn(async move {
            match recognizer.reset_session().await {
                Ok(ack) => info!("Reset capture: {}", ack.message),
                Err(e) => error!("Error resetting capture: {}", e),
            }
        });

        info!("Capture session stopped (epoch {})", self.epoch);

        self.state
    }

    fn configure(&mut self, interval: Duration) {
        self.sampler.configure(interval);
        if self.state == CaptureState::Capturing {
            self.arm_timer();
        }
    }

    fn arm_timer(&mut self) {
        self.disarm_timer();

        self.timer_generation += 1;

        let period = self.sampler.interval();
        let epoch = self.epoch;
        let generation = self.timer_generation;
        let events = self.events.clone();

        self.timer = Some(tokio::spawn(async move {
            let mut interval = tokio::time::interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                interval.tick().await;
                if events.send(Event::Tick { epoch, generation }).await.is_err() {
                    break;
                }
            }
        }));

        debug!(
            "Sample timer armed ({}ms, generation {})",
            period.as_millis(),
            generation
        );
    }

    fn disarm_timer(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.abort();
            debug!("Sample timer disarmed");
        }
    }

    fn on_tick(&mut self, epoch: u64, generation: u64) {
        if epoch != self.epoch || self.state != CaptureState::Capturing {
            debug!("Ignoring tick from epoch {}", epoch);
            return;
        }

        // Queued by a timer that has since been re-armed
        if generation != self.timer_generation {
            debug!("Ignoring tick from timer generation {}", generation);
            return;
        }

        let Some(handle) = &self.handle else {
            return;
        };

        self.stats.ticks += 1;

        let frames = handle.frames();
        let sampler = Arc::clone(&self.sampler);
        let recognizer = Arc::clone(&self.recognizer);
        let events = self.events.clone();

        // Fire and forget: the next tick never waits on this one
        tokio::spawn(async move {
            let (frame_index, result) = match sampler.sample(frames).await {
                Ok(payload) => (Some(payload.index), recognizer.predict(&payload).await),
                Err(e) => (None, Err(e)),
            };

            let _ = events
                .send(Event::Outcome {
                    epoch,
                    frame_index,
                    result,
                })
                .await;
        });
    }

    fn on_outcome(&mut self, epoch: u64, frame_index: Option<u64>, result: Result<PredictionResult>) {
        if frame_index.is_some() {
            self.stats.frames_encoded += 1;
        }

        let prediction = match result {
            Ok(prediction) => prediction,
            Err(e) if e.is_not_ready() => {
                debug!("Frame not ready yet: {}", e);
                return;
            }
            Err(e) => {
                self.stats.failures += 1;
                warn!("Error predicting frame {:?} ({}): {}", frame_index, e.kind(), e);
                return;
            }
        };

        if epoch != self.epoch || self.state != CaptureState::Capturing {
            self.stats.predictions_discarded += 1;
            debug!(
                "Discarding late prediction for frame {:?} from epoch {}",
                frame_index, epoch
            );
            return;
        }

        if !prediction.is_detection() {
            self.stats.empty_predictions += 1;
            debug!("No valid character detected (frame {:?})", frame_index);
            return;
        }

        info!("Predicted text: {} (frame {:?})", prediction.text, frame_index);

        self.prediction = prediction.text;
        self.updated_at = Some(Utc::now());
        self.stats.predictions_applied += 1;
        self.publish();
    }

    fn stats(&self) -> SessionStats {
        let duration_secs = self
            .started_at
            .map(|t| Utc::now().signed_duration_since(t).num_milliseconds() as f64 / 1000.0)
            .unwrap_or(0.0);

        SessionStats {
            is_capturing: self.state == CaptureState::Capturing,
            timer_armed: self.timer.is_some(),
            epoch: self.epoch,
            started_at: self.started_at,
            duration_secs,
            ..self.stats.clone()
        }
    }

    fn publish(&self) {
        self.snapshot.send_replace(SessionSnapshot {
            state: self.state,
            prediction: self.prediction.clone(),
            epoch: self.epoch,
            updated_at: self.updated_at,
        });
    }
}

impl Drop for SessionLoop {
    fn drop(&mut self) {
        self.disarm_timer();
        if let Some(handle) = self.handle.take() {
            self.source.release(&handle);
        }
    }
}
