//! Generation pipeline
//!
//! Drives the head of the input queue through submission, polling, and the
//! terminal transition. Exactly one item is in flight at a time; the active
//! slot is released on every exit path (success, backend failure, timeout,
//! client error), so a failing item can never stall the pipeline.

use crate::queue::item::ActiveItem;
use crate::queue::{GenerationOutcome, QueueStore};
use crate::remote::{ClientError, SongService, TaskOutcome, TaskStatus};
use jukegen_common::SongRequest;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Progress placeholder while the backend reports nothing
const DEFAULT_PROGRESS: &str = "Generating...";

/// Terminal failure reasons surfaced on queue items
pub const REASON_GENERATION_FAILED: &str = "Generation failed";
pub const REASON_GENERATION_TIMEOUT: &str = "Generation timeout";
pub const REASON_NO_AUDIO_URL: &str = "No audio URL returned";
pub const REASON_UNKNOWN: &str = "Unknown error";

/// Polling configuration for the generation pipeline
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Delay between result polls
    pub poll_interval: Duration,
    /// Wall-clock budget per item, measured from submission
    pub max_wait: Duration,
    /// Fallback re-check period when no store change arrives
    pub idle_recheck: Duration,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(2),
            max_wait: Duration::from_secs(300),
            idle_recheck: Duration::from_millis(500),
        }
    }
}

/// Tagged result of the bounded poll routine
enum PollOutcome {
    /// Terminal success with the decoded outcome list
    Success(Vec<TaskOutcome>),
    /// Terminal failure reported by the backend
    Failed,
    /// Deadline elapsed without a terminal status
    TimedOut,
}

/// Moves queued items through the active slot, one at a time
pub struct GenerationPipeline {
    store: QueueStore,
    client: Arc<dyn SongService>,
    config: PipelineConfig,
}

impl GenerationPipeline {
    pub fn new(store: QueueStore, client: Arc<dyn SongService>, config: PipelineConfig) -> Self {
        Self {
            store,
            client,
            config,
        }
    }

    /// Spawn the pipeline loop as a background task
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(async move { self.run().await })
    }

    async fn run(self) {
        info!("Generation pipeline started");
        let mut tick = tokio::time::interval(self.config.idle_recheck);

        loop {
            // Drain promotable work; promote_next returns None while the
            // active slot is occupied, which serializes submissions.
            while let Some(item) = self.store.promote_next().await {
                let item_id = item.id;
                let outcome = self.process(item).await;
                self.store.finish_active(item_id, outcome).await;
            }

            tokio::select! {
                _ = self.store.changed() => {}
                _ = tick.tick() => {}
            }
        }
    }

    /// Drive one active item to a terminal outcome.
    ///
    /// Every return is a terminal transition; the caller parks the item and
    /// releases the slot.
    async fn process(&self, item: ActiveItem) -> GenerationOutcome {
        let request = SongRequest::from_settings(&item.settings);

        let handle = match self.client.request_song(&request).await {
            Ok(handle) => handle,
            Err(e) => {
                warn!("Submission failed for item {}: {}", item.id, e);
                return GenerationOutcome::Failed(failure_reason(e));
            }
        };
        debug!("Item {} submitted as task {}", item.id, handle.task_id);

        match self.poll_until_terminal(&handle.task_id, item.id).await {
            Ok(PollOutcome::Success(outcomes)) => {
                let file = outcomes
                    .first()
                    .map(|o| o.file.as_str())
                    .filter(|f| !f.is_empty());

                match file {
                    Some(path) => match self.client.fetch_audio(path).await {
                        Ok(audio) => GenerationOutcome::Completed(audio),
                        Err(e) => {
                            warn!("Audio fetch failed for item {}: {}", item.id, e);
                            GenerationOutcome::Failed(failure_reason(e))
                        }
                    },
                    None => GenerationOutcome::Failed(REASON_NO_AUDIO_URL.to_string()),
                }
            }
            Ok(PollOutcome::Failed) => {
                GenerationOutcome::Failed(REASON_GENERATION_FAILED.to_string())
            }
            Ok(PollOutcome::TimedOut) => {
                warn!(
                    "Item {} exceeded the {}s generation budget",
                    item.id,
                    self.config.max_wait.as_secs()
                );
                GenerationOutcome::Failed(REASON_GENERATION_TIMEOUT.to_string())
            }
            Err(e) => {
                warn!("Polling failed for item {}: {}", item.id, e);
                GenerationOutcome::Failed(failure_reason(e))
            }
        }
    }

    /// Bounded poll: fixed interval, wall-clock deadline from submission.
    ///
    /// Progress text is pushed to the store on every poll regardless of
    /// status. Returns a tagged outcome instead of mutating terminal state
    /// from inside the loop.
    async fn poll_until_terminal(
        &self,
        task_id: &str,
        item_id: Uuid,
    ) -> Result<PollOutcome, ClientError> {
        let deadline = Instant::now() + self.config.max_wait;
        let task_ids = [task_id.to_string()];

        loop {
            if Instant::now() >= deadline {
                return Ok(PollOutcome::TimedOut);
            }

            let results = self.client.query_result(&task_ids).await?;
            let result = results.into_iter().find(|r| r.task_id == task_ids[0]);

            match result {
                Some(result) => {
                    let progress = result
                        .progress_text
                        .unwrap_or_else(|| DEFAULT_PROGRESS.to_string());
                    self.store.set_progress(item_id, progress).await;

                    match result.status {
                        TaskStatus::Success => return Ok(PollOutcome::Success(result.outcomes)),
                        TaskStatus::Failed => return Ok(PollOutcome::Failed),
                        TaskStatus::Processing => {}
                    }
                }
                None => {
                    // Backend doesn't report the task yet; same as processing
                    debug!("Task {} missing from poll response", task_id);
                }
            }

            tokio::time::sleep(self.config.poll_interval).await;
        }
    }
}

fn failure_reason(error: ClientError) -> String {
    let message = error.to_string();
    if message.is_empty() {
        REASON_UNKNOWN.to_string()
    } else {
        message
    }
}
