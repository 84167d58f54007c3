use serde::{Deserialize, Serialize};

use crate::media::SamplerConfig;

/// Configuration for a capture session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Session identifier used in logs (e.g., "capture-4f0c...")
    pub session_id: String,

    /// Sampling cadence and encoding settings
    pub sampler: SamplerConfig,

    /// Capacity of the session event queue
    pub event_capacity: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            session_id: format!("capture-{}", uuid::Uuid::new_v4()),
            sampler: SamplerConfig::default(),
            event_capacity: 100,
        }
    }
}
