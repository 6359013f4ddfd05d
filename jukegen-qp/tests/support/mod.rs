//! Shared test doubles and helpers for the integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use jukegen_common::SongRequest;
use jukegen_qp::generation::PipelineConfig;
use jukegen_qp::playback::AudioSink;
use jukegen_qp::remote::{
    AudioPayload, ClientError, SongService, TaskHandle, TaskOutcome, TaskResult, TaskStatus,
};
use std::collections::VecDeque;
use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

/// Distinct payload per marker byte so tests can tell tracks apart
pub fn test_audio(marker: u8) -> AudioPayload {
    AudioPayload {
        bytes: vec![marker; 4],
        mime_type: "audio/mpeg".to_string(),
    }
}

/// Pipeline timing suitable for tests (milliseconds instead of seconds)
pub fn fast_pipeline_config() -> PipelineConfig {
    PipelineConfig {
        poll_interval: Duration::from_millis(10),
        max_wait: Duration::from_secs(5),
        idle_recheck: Duration::from_millis(10),
    }
}

pub fn processing(progress: &str) -> TaskResult {
    TaskResult {
        task_id: String::new(),
        status: TaskStatus::Processing,
        progress_text: if progress.is_empty() {
            None
        } else {
            Some(progress.to_string())
        },
        outcomes: Vec::new(),
    }
}

pub fn success_with_file(path: &str) -> TaskResult {
    TaskResult {
        task_id: String::new(),
        status: TaskStatus::Success,
        progress_text: Some("Done".to_string()),
        outcomes: vec![TaskOutcome {
            file: path.to_string(),
            status: 1,
            seed_value: None,
            generation_info: None,
        }],
    }
}

pub fn success_without_file() -> TaskResult {
    TaskResult {
        task_id: String::new(),
        status: TaskStatus::Success,
        progress_text: Some("Done".to_string()),
        outcomes: vec![TaskOutcome {
            file: String::new(),
            status: 1,
            seed_value: None,
            generation_info: None,
        }],
    }
}

pub fn backend_failed() -> TaskResult {
    TaskResult {
        task_id: String::new(),
        status: TaskStatus::Failed,
        progress_text: Some("Generation error".to_string()),
        outcomes: Vec::new(),
    }
}

/// Scripted [`SongService`]: poll responses are served in order and the
/// last entry repeats once the script is exhausted.
pub struct MockSongService {
    script: Mutex<VecDeque<TaskResult>>,
    pub requests: Mutex<Vec<SongRequest>>,
    pub fetched: Mutex<Vec<String>>,
    poll_count: AtomicUsize,
    submit_count: AtomicUsize,
    audio: AudioPayload,
    fail_submit: Option<String>,
}

impl MockSongService {
    pub fn scripted(script: Vec<TaskResult>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            requests: Mutex::new(Vec::new()),
            fetched: Mutex::new(Vec::new()),
            poll_count: AtomicUsize::new(0),
            submit_count: AtomicUsize::new(0),
            audio: test_audio(7),
            fail_submit: None,
        }
    }

    pub fn failing_submission(message: &str) -> Self {
        let mut service = Self::scripted(Vec::new());
        service.fail_submit = Some(message.to_string());
        service
    }

    pub fn with_audio(mut self, audio: AudioPayload) -> Self {
        self.audio = audio;
        self
    }

    pub fn polls(&self) -> usize {
        self.poll_count.load(Ordering::SeqCst)
    }

    pub fn submissions(&self) -> usize {
        self.submit_count.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SongService for MockSongService {
    async fn request_song(&self, request: &SongRequest) -> Result<TaskHandle, ClientError> {
        self.requests.lock().unwrap().push(request.clone());
        if let Some(message) = &self.fail_submit {
            return Err(ClientError::Network(message.clone()));
        }
        let n = self.submit_count.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(TaskHandle {
            task_id: format!("task-{}", n),
            status: "queued".to_string(),
            queue_position: 0,
        })
    }

    async fn query_result(&self, task_ids: &[String]) -> Result<Vec<TaskResult>, ClientError> {
        self.poll_count.fetch_add(1, Ordering::SeqCst);
        let template = {
            let mut script = self.script.lock().unwrap();
            if script.len() > 1 {
                script.pop_front().unwrap()
            } else {
                script.front().cloned().unwrap_or_else(|| processing(""))
            }
        };
        Ok(task_ids
            .iter()
            .map(|id| {
                let mut result = template.clone();
                result.task_id = id.clone();
                result
            })
            .collect())
    }

    async fn fetch_audio(&self, path: &str) -> Result<AudioPayload, ClientError> {
        self.fetched.lock().unwrap().push(path.to_string());
        Ok(self.audio.clone())
    }
}

/// Recording [`AudioSink`]; payloads whose first byte matches a failure
/// marker produce a playback error after "playing".
pub struct MockSink {
    pub played: Mutex<Vec<AudioPayload>>,
    fail_markers: Vec<u8>,
    delay: Duration,
    active: AtomicUsize,
    pub max_active: AtomicUsize,
}

impl MockSink {
    pub fn new() -> Self {
        Self {
            played: Mutex::new(Vec::new()),
            fail_markers: Vec::new(),
            delay: Duration::ZERO,
            active: AtomicUsize::new(0),
            max_active: AtomicUsize::new(0),
        }
    }

    pub fn failing_on(marker: u8) -> Self {
        let mut sink = Self::new();
        sink.fail_markers.push(marker);
        sink
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// First byte of each played payload, in play order
    pub fn played_markers(&self) -> Vec<u8> {
        self.played
            .lock()
            .unwrap()
            .iter()
            .map(|p| p.bytes.first().copied().unwrap_or(0))
            .collect()
    }

    pub fn play_count(&self) -> usize {
        self.played.lock().unwrap().len()
    }
}

#[async_trait]
impl AudioSink for MockSink {
    async fn play(&self, audio: AudioPayload) -> jukegen_qp::Result<()> {
        let now_active = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_active.fetch_max(now_active, Ordering::SeqCst);

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        self.active.fetch_sub(1, Ordering::SeqCst);

        let fails = self
            .fail_markers
            .contains(&audio.bytes.first().copied().unwrap_or(0));
        self.played.lock().unwrap().push(audio);

        if fails {
            Err(jukegen_qp::Error::Playback("decode failure".to_string()))
        } else {
            Ok(())
        }
    }
}

/// Poll an async condition until it holds or the timeout elapses
pub async fn wait_until<F, Fut>(timeout: Duration, mut condition: F) -> bool
where
    F: FnMut() -> Fut,
    Fut: Future<Output = bool>,
{
    let deadline = tokio::time::Instant::now() + timeout;
    while tokio::time::Instant::now() < deadline {
        if condition().await {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    false
}
