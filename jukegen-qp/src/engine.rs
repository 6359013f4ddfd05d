//! Engine orchestration
//!
//! Owns the queue store, shared state, and the three background processes
//! (auto-adder, generation pipeline, playback controller) with an explicit
//! create/start/shutdown lifecycle.

use crate::error::Result;
use crate::generation::auto_adder::DEFAULT_ADD_INTERVAL;
use crate::generation::{AutoAdder, GenerationPipeline, PipelineConfig};
use crate::playback::{AudioSink, PlaybackController, RodioSink};
use crate::queue::QueueStore;
use crate::remote::{HttpSongService, SongService};
use crate::state::{SharedState, DEFAULT_TARGET_SIZE};
use jukegen_common::config::DEFAULT_SERVER_URL;
use jukegen_common::TrackSettings;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::info;

/// Engine configuration
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Backend base URL
    pub server_url: String,
    /// Initial settings template
    pub settings: TrackSettings,
    /// Queue size the auto-adder fills up to
    pub target_size: usize,
    /// Whether the auto-adder starts with the engine
    pub auto_add: bool,
    /// Delay between auto-add attempts
    pub add_interval: Duration,
    /// Poll/deadline configuration for the generation pipeline
    pub pipeline: PipelineConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            server_url: DEFAULT_SERVER_URL.to_string(),
            settings: TrackSettings::default(),
            target_size: DEFAULT_TARGET_SIZE,
            auto_add: true,
            add_interval: DEFAULT_ADD_INTERVAL,
            pipeline: PipelineConfig::default(),
        }
    }
}

/// Top-level coordinator for the queue player
pub struct Engine {
    state: Arc<SharedState>,
    store: QueueStore,
    auto_adder: Arc<AutoAdder>,
    client: Arc<dyn SongService>,
    sink: Arc<dyn AudioSink>,
    config: EngineConfig,
    tasks: Vec<JoinHandle<()>>,
}

impl Engine {
    /// Build an engine with the HTTP task client and rodio output
    pub fn new(config: EngineConfig) -> Result<Self> {
        let client = Arc::new(HttpSongService::new(&config.server_url)?);
        Self::with_parts(config, client, Arc::new(RodioSink))
    }

    /// Build with explicit collaborators (tests inject mocks here)
    pub fn with_parts(
        config: EngineConfig,
        client: Arc<dyn SongService>,
        sink: Arc<dyn AudioSink>,
    ) -> Result<Self> {
        config.settings.validate()?;

        let state = Arc::new(SharedState::new(config.settings.clone(), config.target_size));
        let store = QueueStore::new(state.event_sender());
        let auto_adder = Arc::new(AutoAdder::new(
            store.clone(),
            Arc::clone(&state),
            config.add_interval,
        ));

        Ok(Self {
            state,
            store,
            auto_adder,
            client,
            sink,
            config,
            tasks: Vec::new(),
        })
    }

    pub fn state(&self) -> Arc<SharedState> {
        Arc::clone(&self.state)
    }

    pub fn store(&self) -> QueueStore {
        self.store.clone()
    }

    pub fn auto_adder(&self) -> &AutoAdder {
        &self.auto_adder
    }

    /// Start the background processes. Idempotent.
    pub fn start(&mut self) {
        if !self.tasks.is_empty() {
            return;
        }

        let pipeline = GenerationPipeline::new(
            self.store.clone(),
            Arc::clone(&self.client),
            self.config.pipeline.clone(),
        );
        self.tasks.push(pipeline.spawn());

        let playback = PlaybackController::new(
            self.store.clone(),
            Arc::clone(&self.state),
            Arc::clone(&self.sink),
            self.config.pipeline.idle_recheck,
        );
        self.tasks.push(playback.spawn());

        self.auto_adder.set_enabled(self.config.auto_add);

        info!("Engine started");
    }

    /// Stop all background processes. Idempotent; safe to call twice.
    pub fn shutdown(&mut self) {
        self.auto_adder.stop();
        if self.tasks.is_empty() {
            return;
        }
        for task in self.tasks.drain(..) {
            task.abort();
        }
        info!("Engine stopped");
    }
}

impl Drop for Engine {
    fn drop(&mut self) {
        self.shutdown();
    }
}
