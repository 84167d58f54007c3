pub mod client;
pub mod messages;

pub use client::{HttpPredictionClient, RecognitionConfig, Recognizer};
pub use messages::{PredictFrameResponse, PredictionResult, ResetAck, ResetCaptureResponse};
