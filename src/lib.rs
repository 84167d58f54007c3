pub mod config;
pub mod error;
pub mod http;
pub mod media;
pub mod recognition;
pub mod session;
pub mod view;

pub use config::Config;
pub use error::{CaptureError, DeviceError, EncodeError, NetworkError, ServiceError};
pub use http::{create_router, AppState};
pub use media::{
    FramePayload, FrameSampler, MediaKind, MediaSource, MediaSourceConfig, MediaSourceFactory,
    SamplerConfig, SessionHandle,
};
pub use recognition::{HttpPredictionClient, PredictionResult, RecognitionConfig, Recognizer};
pub use session::{CaptureSession, CaptureState, SessionConfig, SessionSnapshot, SessionStats};
pub use view::ConsoleView;
