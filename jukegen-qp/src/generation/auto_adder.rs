//! Auto-adder loop
//!
//! Keeps the queue populated up to the target size using the current
//! settings snapshot. Start and stop are idempotent; stopping aborts the
//! timer task immediately, so no tick can fire after disablement.

use crate::queue::QueueStore;
use crate::state::SharedState;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, info};

/// Default delay between add attempts
pub const DEFAULT_ADD_INTERVAL: Duration = Duration::from_secs(2);

/// Periodic queue-filling process
pub struct AutoAdder {
    store: QueueStore,
    state: Arc<SharedState>,
    interval: Duration,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl AutoAdder {
    pub fn new(store: QueueStore, state: Arc<SharedState>, interval: Duration) -> Self {
        Self {
            store,
            state,
            interval,
            task: Mutex::new(None),
        }
    }

    /// Start the loop. No-op when already running.
    pub fn start(&self) {
        let mut task = self.task.lock().unwrap();
        if task.as_ref().is_some_and(|t| !t.is_finished()) {
            debug!("Auto-adder already running");
            return;
        }

        let store = self.store.clone();
        let state = Arc::clone(&self.state);
        let period = self.interval;

        *task = Some(tokio::spawn(async move {
            let mut tick = tokio::time::interval(period);
            loop {
                tick.tick().await;

                let target = state.target_size().await;
                if store.is_full(target).await {
                    continue;
                }

                let settings = state.settings().await;
                let item = store.add_item(&settings).await;
                debug!(
                    "Auto-added item {} ({}/{} in queue)",
                    item.id,
                    store.len().await,
                    target
                );
            }
        }));

        info!("Auto-adder started ({}ms interval)", self.interval.as_millis());
    }

    /// Stop the loop, canceling any pending tick. No-op when not running.
    pub fn stop(&self) {
        if let Some(task) = self.task.lock().unwrap().take() {
            task.abort();
            info!("Auto-adder stopped");
        }
    }

    /// Toggle surface for control layers
    pub fn set_enabled(&self, enabled: bool) {
        if enabled {
            self.start();
        } else {
            self.stop();
        }
    }

    pub fn is_running(&self) -> bool {
        self.task
            .lock()
            .unwrap()
            .as_ref()
            .is_some_and(|t| !t.is_finished())
    }
}

impl Drop for AutoAdder {
    fn drop(&mut self) {
        self.stop();
    }
}
