use std::sync::Arc;
use std::sync::atomic::Ordering;
use std::time::Duration;

use shot_logger::controller::round::{EndOutcome, finish_round, retry_pending};
use shot_logger::controller::sheets::ExportError;
use shot_logger::model::{Hole, Lie};

mod common;
use common::RecordingSink;

async fn play_one_hole(state: &shot_logger::AppState, player: &str) {
    let mut session = state.session.lock().await;
    session.start_round(Some(common::round_date()), "Pebble Beach", player);
    session.set_pending_location(36.56, -121.95);
    session.log_shot(Hole::new(1).unwrap(), Lie::Tee).unwrap();
    session.log_shot(Hole::new(1).unwrap(), Lie::Holed).unwrap();
}

#[tokio::test]
async fn test_finish_round_exports_all_rows() {
    let sink = Arc::new(RecordingSink::default());
    let state = common::state_with(sink.clone());
    play_one_hole(&state, "Alice").await;

    let outcome = finish_round(&state).await.expect("export succeeds");
    match outcome {
        EndOutcome::Exported(summary) => assert_eq!(summary.updated_rows, 2),
        other => panic!("expected an export, got {other:?}"),
    }

    let exported = sink.exported();
    assert_eq!(exported.len(), 1);
    assert_eq!(exported[0].rows.len(), 2);
    assert_eq!(exported[0].info.player, "Alice");

    let session = state.session.lock().await;
    assert!(!session.is_active());
    assert!(session.shots().is_empty());
    assert!(state.queue.lock().await.is_empty());
}

#[tokio::test]
async fn test_finish_round_without_shots_skips_export() {
    let sink = Arc::new(RecordingSink::default());
    let state = common::state_with(sink.clone());
    state
        .session
        .lock()
        .await
        .start_round(None, "Pebble Beach", "Alice");

    assert_eq!(
        finish_round(&state).await.unwrap(),
        EndOutcome::NothingToExport
    );
    assert_eq!(sink.attempts(), 0);
    assert!(!state.session.lock().await.is_active());
}

#[tokio::test]
async fn test_failed_export_is_queued_and_reported() {
    let sink = Arc::new(RecordingSink::failing());
    let state = common::state_with(sink.clone());
    play_one_hole(&state, "Alice").await;

    let err = finish_round(&state).await.unwrap_err();
    assert!(matches!(err, ExportError::Service { status: 503, .. }));

    // the session resets regardless; the shots live on in the queue
    {
        let session = state.session.lock().await;
        assert!(!session.is_active());
        assert!(session.info().is_none());
        assert!(session.shots().is_empty());
    }
    let queue = state.queue.lock().await;
    assert_eq!(queue.len(), 1);
    assert_eq!(queue.pending_rows(), 2);
}

#[tokio::test]
async fn test_retry_drains_queue_in_order() {
    let sink = Arc::new(RecordingSink::failing());
    let state = common::state_with(sink.clone());

    play_one_hole(&state, "Alice").await;
    assert!(finish_round(&state).await.is_err());
    play_one_hole(&state, "Bob").await;
    assert!(finish_round(&state).await.is_err());
    assert_eq!(state.queue.lock().await.len(), 2);

    // still down: nothing leaves the queue, head stays the oldest round
    assert!(retry_pending(&state).await.is_err());
    assert_eq!(state.queue.lock().await.len(), 2);

    sink.set_failing(false);
    assert_eq!(retry_pending(&state).await.unwrap(), 2);
    assert!(state.queue.lock().await.is_empty());

    let players: Vec<String> = sink
        .exported()
        .iter()
        .map(|r| r.info.player.clone())
        .collect();
    assert_eq!(players, ["Alice", "Bob"]);

    assert_eq!(retry_pending(&state).await.unwrap(), 0);
}

#[tokio::test]
async fn test_concurrent_retries_keep_queue_order() {
    let sink = Arc::new(RecordingSink::failing());
    let state = common::state_with(sink.clone());

    play_one_hole(&state, "Alice").await;
    assert!(finish_round(&state).await.is_err());
    play_one_hole(&state, "Bob").await;
    assert!(finish_round(&state).await.is_err());

    // the first retried export fails slowly while a second retry is waiting
    sink.set_failing(false);
    sink.fail_next.store(1, Ordering::SeqCst);
    sink.set_delay(Duration::from_millis(20));

    let (first, second) = tokio::join!(retry_pending(&state), retry_pending(&state));
    let mut outcomes = [first, second];
    outcomes.sort_by_key(Result::is_ok);
    assert!(outcomes[0].is_err(), "{outcomes:?}");
    assert_eq!(outcomes[1].as_ref().ok(), Some(&2));

    assert!(state.queue.lock().await.is_empty());
    let players: Vec<String> = sink
        .exported()
        .iter()
        .map(|r| r.info.player.clone())
        .collect();
    assert_eq!(players, ["Alice", "Bob"]);
}

#[tokio::test]
async fn test_reexport_duplicates_rows() {
    let sink = Arc::new(RecordingSink::default());
    let state = common::state_with(sink.clone());
    play_one_hole(&state, "Alice").await;
    finish_round(&state).await.unwrap();

    let round = sink.exported()[0].clone();
    state.queue.lock().await.push(round);
    assert_eq!(retry_pending(&state).await.unwrap(), 1);

    let exported = sink.exported();
    assert_eq!(exported.len(), 2);
    assert_eq!(exported[0], exported[1]);
}
