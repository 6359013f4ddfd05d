//! jukegen Queue Player (jukegen-qp) - Main entry point
//!
//! Headless daemon that keeps a generation queue topped up against a remote
//! music-synthesis backend and plays completed tracks on the default output
//! device.

use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::signal;
use tokio::sync::broadcast::error::RecvError;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use jukegen_common::config::resolve_server_url;
use jukegen_common::events::QueueEvent;
use jukegen_common::TrackSettings;
use jukegen_qp::engine::{Engine, EngineConfig};
use jukegen_qp::generation::PipelineConfig;

/// Command-line arguments for jukegen-qp
#[derive(Parser, Debug)]
#[command(name = "jukegen-qp")]
#[command(about = "Generation-queue player for a remote music synthesis backend")]
#[command(version)]
struct Args {
    /// Backend base URL (falls back to JUKEGEN_SERVER_URL, then config.toml)
    #[arg(long)]
    server_url: Option<String>,

    /// Queue size the auto-adder fills up to
    #[arg(long, default_value = "3", env = "JUKEGEN_TARGET_SIZE")]
    target_size: usize,

    /// Disable the auto-adder
    #[arg(long)]
    no_auto_add: bool,

    /// Seconds between auto-add attempts
    #[arg(long, default_value = "2")]
    add_interval: u64,

    /// Seconds between result polls
    #[arg(long, default_value = "2")]
    poll_interval: u64,

    /// Per-track generation budget in seconds
    #[arg(long, default_value = "300")]
    generation_timeout: u64,

    /// Style prompt used for every generated track
    #[arg(long, default_value = "A jazz fusion piece with saxophone")]
    caption: String,

    /// Track length in seconds
    #[arg(long, default_value = "30")]
    duration: u32,

    /// Lyrics (newline-separated)
    #[arg(long)]
    lyrics: Option<String>,

    #[arg(long)]
    bpm: Option<u32>,

    /// Key scale, e.g. "A Minor"
    #[arg(long)]
    key: Option<String>,

    #[arg(long)]
    genre: Option<String>,

    #[arg(long)]
    temperature: Option<f64>,

    #[arg(long)]
    seed: Option<i64>,

    /// Tracks generated per task (the first is played)
    #[arg(long)]
    batch_size: Option<u32>,

    #[arg(long)]
    inference_steps: Option<u32>,

    /// Time signature, e.g. "4/4"
    #[arg(long)]
    time_signature: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "jukegen_qp=debug,jukegen_common=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();
    let server_url = resolve_server_url(args.server_url.as_deref());

    info!("Starting jukegen queue player against {}", server_url);

    let settings = TrackSettings {
        caption: args.caption,
        duration: args.duration,
        lyrics: args.lyrics,
        bpm: args.bpm,
        key: args.key,
        genre: args.genre,
        temperature: args.temperature,
        seed: args.seed,
        batch_size: args.batch_size.or(Some(1)),
        inference_steps: args.inference_steps,
        time_signature: args.time_signature,
        ..TrackSettings::default()
    };

    let config = EngineConfig {
        server_url,
        settings,
        target_size: args.target_size,
        auto_add: !args.no_auto_add,
        add_interval: Duration::from_secs(args.add_interval),
        pipeline: PipelineConfig {
            poll_interval: Duration::from_secs(args.poll_interval),
            max_wait: Duration::from_secs(args.generation_timeout),
            ..PipelineConfig::default()
        },
    };

    let mut engine = Engine::new(config).context("Failed to initialize engine")?;

    // Lifecycle event log: one line per queue transition
    let mut events = engine.state().subscribe_events();
    tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(event) => info!(event = event.event_type(), "{}", describe(&event)),
                Err(RecvError::Lagged(n)) => warn!("Event log lagged by {} events", n),
                Err(RecvError::Closed) => break,
            }
        }
    });

    // Periodic queue status line
    let store = engine.store();
    tokio::spawn(async move {
        let mut tick = tokio::time::interval(Duration::from_secs(30));
        loop {
            tick.tick().await;
            let counts = store.counts().await;
            info!(
                "Queue: {} queued, {} generating, {} completed, {} failed",
                counts.queued, counts.generating, counts.completed, counts.failed
            );
        }
    });

    engine.start();
    info!("Engine running; press Ctrl+C to stop");

    shutdown_signal().await;
    engine.shutdown();
    info!("Shutdown complete");
    Ok(())
}

fn describe(event: &QueueEvent) -> String {
    match event {
        QueueEvent::ItemQueued { item_id, caption, .. } => {
            format!("queued {} ({})", item_id, caption)
        }
        QueueEvent::GenerationStarted { item_id, .. } => format!("generating {}", item_id),
        QueueEvent::GenerationProgress { item_id, progress, .. } => {
            format!("{}: {}", item_id, progress)
        }
        QueueEvent::ItemCompleted { item_id, .. } => format!("completed {}", item_id),
        QueueEvent::ItemFailed { item_id, reason, .. } => {
            format!("failed {}: {}", item_id, reason)
        }
        QueueEvent::ItemRemoved { item_id, .. } => format!("removed {}", item_id),
        QueueEvent::QueueCleared { .. } => "queue cleared".to_string(),
        QueueEvent::PlaybackStarted { item_id, caption, .. } => {
            format!("playing {} ({})", item_id, caption)
        }
        QueueEvent::PlaybackFinished { item_id, .. } => {
            format!("playback finished {}", item_id)
        }
    }
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
