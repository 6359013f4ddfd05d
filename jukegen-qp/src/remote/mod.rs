//! Remote generation service client
//!
//! The queue core talks to the backend exclusively through the
//! [`SongService`] trait: submit a generation task, poll task results,
//! fetch finished audio. [`HttpSongService`] is the production
//! implementation; tests substitute scripted mocks.

pub mod http;

pub use http::HttpSongService;

use async_trait::async_trait;
use jukegen_common::SongRequest;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Remote client errors
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("API error {0}: {1}")]
    Api(u16, String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Backend error: {0}")]
    Backend(String),
}

/// Decoded audio payload for one completed track.
///
/// The byte field is base64-encoded in serialized form, matching the wire
/// shape of the backend's audio responses.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AudioPayload {
    #[serde(with = "base64_bytes")]
    pub bytes: Vec<u8>,
    /// MIME type reported by the backend (audio/mpeg when unspecified)
    pub mime_type: String,
}

/// Handle returned when a generation task is accepted
#[derive(Debug, Clone, Deserialize)]
pub struct TaskHandle {
    pub task_id: String,
    pub status: String,
    pub queue_position: u32,
}

/// Task status as reported by the result endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskStatus {
    Processing,
    Success,
    Failed,
}

impl TaskStatus {
    /// Map the backend's numeric code (0/1/2). Unknown codes count as
    /// still-processing so polling continues rather than erroring out.
    pub fn from_code(code: i64) -> Self {
        match code {
            1 => TaskStatus::Success,
            2 => TaskStatus::Failed,
            _ => TaskStatus::Processing,
        }
    }
}

/// One task's poll result, with the outcome list already decoded
#[derive(Debug, Clone)]
pub struct TaskResult {
    pub task_id: String,
    pub status: TaskStatus,
    /// Human-readable progress text, when the backend sent any
    pub progress_text: Option<String>,
    /// Generated tracks; empty until the task succeeds (and empty when the
    /// backend's result string fails to decode)
    pub outcomes: Vec<TaskOutcome>,
}

/// One generated track inside a task result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskOutcome {
    /// Backend-relative audio path; empty until generation finished
    #[serde(default)]
    pub file: String,
    #[serde(default)]
    pub status: i64,
    #[serde(default)]
    pub seed_value: Option<String>,
    #[serde(default)]
    pub generation_info: Option<String>,
}

/// Operations the queue core depends on
#[async_trait]
pub trait SongService: Send + Sync {
    /// Submit a generation request; returns the accepted task handle
    async fn request_song(&self, request: &SongRequest) -> Result<TaskHandle, ClientError>;

    /// Poll the results of one or more tasks
    async fn query_result(&self, task_ids: &[String]) -> Result<Vec<TaskResult>, ClientError>;

    /// Fetch generated audio from a backend-relative path
    async fn fetch_audio(&self, path: &str) -> Result<AudioPayload, ClientError>;
}

mod base64_bytes {
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine as _;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        STANDARD.decode(encoded).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn task_status_mapping() {
        assert_eq!(TaskStatus::from_code(0), TaskStatus::Processing);
        assert_eq!(TaskStatus::from_code(1), TaskStatus::Success);
        assert_eq!(TaskStatus::from_code(2), TaskStatus::Failed);
        // Unknown codes keep the poll loop alive
        assert_eq!(TaskStatus::from_code(7), TaskStatus::Processing);
    }

    #[test]
    fn audio_payload_serializes_as_base64() {
        let payload = AudioPayload {
            bytes: vec![0x49, 0x44, 0x33],
            mime_type: "audio/mpeg".to_string(),
        };

        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["bytes"], "SUQz");
        assert_eq!(json["mime_type"], "audio/mpeg");

        let back: AudioPayload = serde_json::from_value(json).unwrap();
        assert_eq!(back, payload);
    }
}
