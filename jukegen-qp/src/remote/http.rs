//! HTTP implementation of the remote generation service

use super::{AudioPayload, ClientError, SongService, TaskHandle, TaskOutcome, TaskResult, TaskStatus};
use async_trait::async_trait;
use jukegen_common::SongRequest;
use serde::Deserialize;
use std::time::Duration;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const DEFAULT_MIME_TYPE: &str = "audio/mpeg";

/// Response envelope shared by the task endpoints.
///
/// The backend also sends `timestamp` and `extra`; nothing here reads them,
/// so they are left to serde's unknown-field handling.
#[derive(Debug, Deserialize)]
struct Envelope<T> {
    #[serde(default)]
    error: Option<String>,
    data: T,
}

/// Raw per-task record from `/query_result`, with the outcome list still
/// encoded as a JSON string
#[derive(Debug, Deserialize)]
struct RawTaskResult {
    task_id: String,
    #[serde(default)]
    result: String,
    status: i64,
    #[serde(default)]
    progress_text: String,
}

/// reqwest-backed [`SongService`]
pub struct HttpSongService {
    http_client: reqwest::Client,
    base_url: String,
}

impl HttpSongService {
    pub fn new(base_url: impl Into<String>) -> Result<Self, ClientError> {
        let http_client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| ClientError::Network(e.to_string()))?;

        Ok(Self {
            http_client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

#[async_trait]
impl SongService for HttpSongService {
    async fn request_song(&self, request: &SongRequest) -> Result<TaskHandle, ClientError> {
        tracing::debug!(
            caption = %request.caption,
            duration = request.duration,
            "Submitting generation task"
        );

        let response = self
            .http_client
            .post(self.endpoint("/release_task"))
            .json(request)
            .send()
            .await
            .map_err(|e| ClientError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ClientError::Api(status.as_u16(), body));
        }

        let envelope: Envelope<TaskHandle> = response
            .json()
            .await
            .map_err(|e| ClientError::Parse(e.to_string()))?;

        if let Some(error) = envelope.error.filter(|e| !e.is_empty()) {
            return Err(ClientError::Backend(error));
        }

        tracing::info!(
            task_id = %envelope.data.task_id,
            queue_position = envelope.data.queue_position,
            "Generation task accepted"
        );

        Ok(envelope.data)
    }

    async fn query_result(&self, task_ids: &[String]) -> Result<Vec<TaskResult>, ClientError> {
        let body = serde_json::json!({ "task_id_list": task_ids });

        let response = self
            .http_client
            .post(self.endpoint("/query_result"))
            .json(&body)
            .send()
            .await
            .map_err(|e| ClientError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ClientError::Api(status.as_u16(), body));
        }

        let envelope: Envelope<Vec<RawTaskResult>> = response
            .json()
            .await
            .map_err(|e| ClientError::Parse(e.to_string()))?;

        if let Some(error) = envelope.error.filter(|e| !e.is_empty()) {
            return Err(ClientError::Backend(error));
        }

        Ok(envelope.data.into_iter().map(decode_task_result).collect())
    }

    async fn fetch_audio(&self, path: &str) -> Result<AudioPayload, ClientError> {
        let response = self
            .http_client
            .get(self.endpoint(path))
            .send()
            .await
            .map_err(|e| ClientError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::Api(status.as_u16(), "failed to fetch audio".to_string()));
        }

        let mime_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or(DEFAULT_MIME_TYPE)
            .to_string();

        let bytes = response
            .bytes()
            .await
            .map_err(|e| ClientError::Network(e.to_string()))?
            .to_vec();

        tracing::debug!(path = path, size = bytes.len(), mime_type = %mime_type, "Fetched audio");

        Ok(AudioPayload { bytes, mime_type })
    }
}

fn decode_task_result(raw: RawTaskResult) -> TaskResult {
    TaskResult {
        status: TaskStatus::from_code(raw.status),
        progress_text: if raw.progress_text.is_empty() {
            None
        } else {
            Some(raw.progress_text)
        },
        outcomes: decode_outcomes(&raw.task_id, &raw.result),
        task_id: raw.task_id,
    }
}

/// Decode the outcome list the backend ships as a JSON-encoded string.
///
/// A malformed or empty string means "no results yet", never an error.
fn decode_outcomes(task_id: &str, encoded: &str) -> Vec<TaskOutcome> {
    match serde_json::from_str::<Vec<TaskOutcome>>(encoded) {
        Ok(outcomes) => outcomes,
        Err(e) => {
            if !encoded.is_empty() {
                tracing::debug!(task_id = task_id, "Undecodable result payload: {}", e);
            }
            Vec::new()
        }
    }
}
