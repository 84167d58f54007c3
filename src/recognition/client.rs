use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info};
use uuid::Uuid;

use super::messages::{PredictFrameResponse, PredictionResult, ResetAck, ResetCaptureResponse};
use crate::error::{NetworkError, Result, ServiceError};
use crate::media::FramePayload;

/// Multipart field carrying the encoded frame
pub const FRAME_FIELD: &str = "frame";

/// Remote recognition service contract
#[async_trait]
pub trait Recognizer: Send + Sync {
    /// Submit one encoded frame and return the predicted text
    async fn predict(&self, payload: &FramePayload) -> Result<PredictionResult>;

    /// Tell the service the capture session ended
    async fn reset_session(&self) -> Result<ResetAck>;
}

/// Connection settings for the recognition service
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RecognitionConfig {
    /// Base URL, e.g. `http://127.0.0.1:8000`
    pub base_url: String,
    /// Per-request timeout
    pub timeout_ms: u64,
}

impl Default for RecognitionConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8000".to_string(),
            timeout_ms: 5000,
        }
    }
}

/// HTTP client for the recognition service
///
/// Requests run on tokio's blocking pool so a slow service never stalls the capture loop.
#[derive(Clone)]
pub struct HttpPredictionClient {
    agent: ureq::Agent,
    base_url: String,
}

impl HttpPredictionClient {
    pub fn new(config: &RecognitionConfig) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build();

        info!("Recognition service at {}", config.base_url);

        Self {
            agent,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn predict_url(&self) -> String {
        format!("{}/predict_frame", self.base_url)
    }

    pub fn reset_url(&self) -> String {
        format!("{}/reset_capture", self.base_url)
    }
}

#[async_trait]
impl Recognizer for HttpPredictionClient {
    async fn predict(&self, payload: &FramePayload) -> Result<PredictionResult> {
        let boundary = format!("----gesture-capture-{}", Uuid::new_v4().simple());
        let body = multipart_body(&boundary, payload);
        let content_type = format!("multipart/form-data; boundary={}", boundary);
        let agent = self.agent.clone();
        let url = self.predict_url();
        let index = payload.index;

        let text = tokio::task::spawn_blocking(move || {
            let response = agent
                .post(&url)
                .set("Content-Type", &content_type)
                .send_bytes(&body);
            read_body(&url, response)
        })
        .await
        .map_err(|e| NetworkError::Join(e.to_string()))??;

        let parsed: PredictFrameResponse =
            serde_json::from_str(&text).map_err(|e| ServiceError::MalformedBody(e.to_string()))?;

        debug!("Frame #{} -> {:?}", index, parsed.predicted_text);

        Ok(parsed.into())
    }

    async fn reset_session(&self) -> Result<ResetAck> {
        let agent = self.agent.clone();
        let url = self.reset_url();

        let text = tokio::task::spawn_blocking(move || {
            let response = agent.get(&url).call();
            read_body(&url, response)
        })
        .await
        .map_err(|e| NetworkError::Join(e.to_string()))??;

        let parsed: ResetCaptureResponse =
            serde_json::from_str(&text).map_err(|e| ServiceError::MalformedBody(e.to_string()))?;

        Ok(ResetAck {
            message: parsed.message,
        })
    }
}

/// Map a ureq outcome to the response text, treating anything but 200 as a failure
fn read_body(
    url: &str,
    response: std::result::Result<ureq::Response, ureq::Error>,
) -> Result<String> {
    let response = match response {
        Ok(response) => response,
        Err(ureq::Error::Status(status, response)) => {
            return Err(ServiceError::Status {
                status,
                reason: response.status_text().to_string(),
            }
            .into());
        }
        Err(ureq::Error::Transport(transport)) => {
            return Err(NetworkError::Transport {
                url: url.to_string(),
                reason: transport.to_string(),
            }
            .into());
        }
    };

    if response.status() != 200 {
        return Err(ServiceError::Status {
            status: response.status(),
            reason: response.status_text().to_string(),
        }
        .into());
    }

    response.into_string().map_err(|e| {
        NetworkError::Transport {
            url: url.to_string(),
            reason: format!("reading body: {}", e),
        }
        .into()
    })
}

/// Build a `multipart/form-data` body holding the frame as its only field
pub fn multipart_body(boundary: &str, payload: &FramePayload) -> Vec<u8> {
    let mut body = Vec::with_capacity(payload.bytes.len() + 256);

    body.extend_from_slice(format!("--{}\r\n", boundary).as_bytes());
    body.extend_from_slice(
        format!(
            "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n",
            FRAME_FIELD,
            payload.file_name()
        )
        .as_bytes(),
    );
    body.extend_from_slice(format!("Content-Type: {}\r\n\r\n", payload.content_type).as_bytes());
    body.extend_from_slice(&payload.bytes);
    body.extend_from_slice(format!("\r\n--{}--\r\n", boundary).as_bytes());

    body
}
