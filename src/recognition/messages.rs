use serde::{Deserialize, Serialize};

/// Response body of `POST /predict_frame`
#[derive(Debug, Serialize, Deserialize)]
pub struct PredictFrameResponse {
    #[serde(default)]
    pub predicted_text: Option<String>,
}

/// Response body of `GET /reset_capture`
#[derive(Debug, Serialize, Deserialize)]
pub struct ResetCaptureResponse {
    #[serde(default)]
    pub message: String,
}

/// Parsed outcome of a prediction request
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PredictionResult {
    /// Predicted text; empty means nothing was detected
    pub text: String,
}

impl PredictionResult {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    /// Whether the service reported an actual detection
    pub fn is_detection(&self) -> bool {
        !self.text.is_empty()
    }
}

impl From<PredictFrameResponse> for PredictionResult {
    fn from(response: PredictFrameResponse) -> Self {
        Self {
            text: response.predicted_text.unwrap_or_default(),
        }
    }
}

/// Acknowledgement of a session reset
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResetAck {
    pub message: String,
}
