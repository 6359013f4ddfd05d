//! Auto-adder lifecycle tests
//!
//! Timer behavior runs with millisecond intervals; assertions about "no
//! further additions" give the aborted timer generous wall-clock room to
//! prove it stayed dead.

mod support;

use jukegen_common::TrackSettings;
use jukegen_qp::generation::AutoAdder;
use jukegen_qp::queue::QueueStore;
use jukegen_qp::state::SharedState;
use std::sync::Arc;
use std::time::Duration;
use support::wait_until;

fn setup(target_size: usize, interval: Duration) -> (QueueStore, Arc<SharedState>, AutoAdder) {
    let state = Arc::new(SharedState::new(TrackSettings::default(), target_size));
    let store = QueueStore::new(state.event_sender());
    let adder = AutoAdder::new(store.clone(), Arc::clone(&state), interval);
    (store, state, adder)
}

#[tokio::test]
async fn fills_queue_to_target_and_no_further() {
    let (store, _state, adder) = setup(3, Duration::from_millis(20));

    adder.start();
    assert!(adder.is_running());

    assert!(
        wait_until(Duration::from_secs(2), || async { store.len().await == 3 }).await
    );

    // Several more ticks pass; the queue stays at the target
    tokio::time::sleep(Duration::from_millis(150)).await;
    assert_eq!(store.len().await, 3);

    adder.stop();
}

#[tokio::test]
async fn added_items_snapshot_current_settings() {
    let (store, state, adder) = setup(1, Duration::from_millis(10));

    let mut settings = state.settings().await;
    settings.caption = "synthwave sunset drive".to_string();
    settings.genre = Some("synthwave".to_string());
    state.set_settings(settings).await;

    adder.start();
    assert!(
        wait_until(Duration::from_secs(2), || async { store.len().await == 1 }).await
    );
    adder.stop();

    let snapshot = store.snapshot().await;
    match &snapshot[0] {
        jukegen_qp::queue::QueueItem::Queued(item) => {
            assert_eq!(item.settings.caption, "synthwave sunset drive");
            assert_eq!(item.settings.genre.as_deref(), Some("synthwave"));
        }
        other => panic!("expected a queued item, got {:?}", other),
    }
}

#[tokio::test]
async fn stop_halts_additions_immediately() {
    let (store, _state, adder) = setup(100, Duration::from_millis(30));

    adder.start();
    assert!(
        wait_until(Duration::from_secs(2), || async { store.len().await >= 1 }).await
    );

    adder.stop();
    assert!(!adder.is_running());
    let count_at_stop = store.len().await;

    tokio::time::sleep(Duration::from_millis(200)).await;
    assert_eq!(store.len().await, count_at_stop);
}

#[tokio::test]
async fn start_is_idempotent_and_one_stop_halts() {
    let (store, _state, adder) = setup(3, Duration::from_millis(20));

    adder.start();
    adder.start(); // second start is a no-op
    assert!(adder.is_running());

    assert!(
        wait_until(Duration::from_secs(2), || async { store.len().await == 3 }).await
    );

    // A single stop cancels the (single) timer task
    adder.stop();
    store.clear_all().await;
    tokio::time::sleep(Duration::from_millis(150)).await;
    assert_eq!(store.len().await, 0);
}

#[tokio::test]
async fn restarts_cleanly_after_stop() {
    let (store, _state, adder) = setup(2, Duration::from_millis(10));

    adder.start();
    assert!(
        wait_until(Duration::from_secs(2), || async { store.len().await == 2 }).await
    );
    adder.stop();

    store.clear_all().await;
    adder.start();
    assert!(
        wait_until(Duration::from_secs(2), || async { store.len().await == 2 }).await
    );
    adder.stop();
}

#[tokio::test]
async fn follows_target_size_changes() {
    let (store, state, adder) = setup(1, Duration::from_millis(10));

    adder.start();
    assert!(
        wait_until(Duration::from_secs(2), || async { store.len().await == 1 }).await
    );

    state.set_target_size(4).await;
    assert!(
        wait_until(Duration::from_secs(2), || async { store.len().await == 4 }).await
    );

    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(store.len().await, 4);

    adder.stop();
}

#[tokio::test]
async fn drop_cancels_the_timer() {
    let (store, state, adder) = setup(100, Duration::from_millis(20));

    adder.start();
    assert!(
        wait_until(Duration::from_secs(2), || async { store.len().await >= 1 }).await
    );

    drop(adder);
    let count_at_drop = store.len().await;

    tokio::time::sleep(Duration::from_millis(150)).await;
    assert_eq!(store.len().await, count_at_drop);
    drop(state);
}
