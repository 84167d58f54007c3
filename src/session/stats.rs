use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Text shown when no prediction has been received yet
pub const NO_TRANSCRIPTION: &str = "No transcription available.";

/// Whether sampling is active
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum CaptureState {
    #[default]
    Idle,
    Capturing,
}

/// Read-only view of the session, published on every change
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct SessionSnapshot {
    pub state: CaptureState,

    /// Latest applied prediction (empty until the first detection)
    pub prediction: String,

    /// Start/stop generation counter
    pub epoch: u64,

    /// When the prediction was last updated
    pub updated_at: Option<DateTime<Utc>>,
}

impl SessionSnapshot {
    pub fn is_capturing(&self) -> bool {
        self.state == CaptureState::Capturing
    }

    /// Prediction text, or the placeholder when nothing has been recognised
    pub fn display_text(&self) -> &str {
        if self.prediction.is_empty() {
            NO_TRANSCRIPTION
        } else {
            &self.prediction
        }
    }

    /// Label for the start/stop control
    pub fn toggle_label(&self) -> &'static str {
        match self.state {
            CaptureState::Idle => "Click to start",
            CaptureState::Capturing => "Click to end",
        }
    }
}

/// Statistics about the capture session
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionStats {
    /// Whether capture is currently active
    pub is_capturing: bool,

    /// Whether the sample timer is armed (always equals `is_capturing`)
    pub timer_armed: bool,

    /// Current start/stop generation
    pub epoch: u64,

    /// When the current capturing interval started
    pub started_at: Option<DateTime<Utc>>,

    /// Seconds since `started_at`
    pub duration_secs: f64,

    /// Timer ticks handled while capturing
    pub ticks: u64,

    /// Frames successfully encoded
    pub frames_encoded: u64,

    /// Predictions that updated the displayed text
    pub predictions_applied: u64,

    /// Successful predictions that arrived after their session ended
    pub predictions_discarded: u64,

    /// Successful predictions with no detected text
    pub empty_predictions: u64,

    /// Device, encode, network and service failures
    pub failures: u64,

    /// Reset calls issued on stop
    pub resets_sent: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_text_placeholder() {
        let mut snapshot = SessionSnapshot::default();
        assert_eq!(snapshot.display_text(), "No transcription available.");

        snapshot.prediction = "A".to_string();
        assert_eq!(snapshot.display_text(), "A");
    }

    #[test]
    fn test_toggle_label_follows_state() {
        let mut snapshot = SessionSnapshot::default();
        assert_eq!(snapshot.toggle_label(), "Click to start");

        snapshot.state = CaptureState::Capturing;
        assert_eq!(snapshot.toggle_label(), "Click to end");
    }

    #[test]
    fn test_snapshot_serialization() {
        let snapshot = SessionSnapshot {
            state: CaptureState::Capturing,
            prediction: "hello".to_string(),
            epoch: 3,
            updated_at: None,
        };

        let json = serde_json::to_string(&snapshot).unwrap();
        assert!(json.contains("\"state\":\"capturing\""));
        assert!(json.contains("\"epoch\":3"));
    }
}
