use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use paige_config::ObserverConfig;
use paige_protocol::Session;
use tokio::sync::broadcast;

use crate::classifier::test_support::ScriptedClassifier;
use crate::classifier::TriageResult;

use super::*;

async fn fresh_log() -> (Arc<ActionLogStore>, tempfile::TempDir, u64) {
    let dir = tempfile::tempdir().expect("tempdir");
    let log = Arc::new(ActionLogStore::open(dir.path()).expect("open store"));
    log.insert_session(Session::new(1, PathBuf::from("/proj")))
        .await
        .expect("insert session");
    (log, dir, 1)
}

fn nudging(confidence: f64) -> TriageResult {
    TriageResult {
        should_nudge: true,
        confidence,
        signal: "stuck".to_string(),
        reasoning: Some("repeated edits without progress".to_string()),
    }
}

#[tokio::test]
async fn cooldown_suppresses_the_second_nudge() {
    let (action_log, _dir, session_id) = fresh_log().await;
    let classifier = Arc::new(ScriptedClassifier::new(vec![
        nudging(0.9),
        nudging(0.9),
    ]));
    let (tx, _rx) = broadcast::channel(16);
    let mut config = ObserverConfig::default();
    config.cooldown_ms = 120_000;
    config.confidence_threshold = 0.7;
    config.buffer_update_trigger_count = 1;

    let (handle, task) = ObserverHandle::start(
        session_id,
        action_log.clone(),
        classifier.clone(),
        tx,
        config,
    );

    action_log
        .log_action(session_id, ActionType::FileOpened, None)
        .await
        .expect("log");
    tokio::time::sleep(Duration::from_millis(50)).await;
    action_log
        .log_action(session_id, ActionType::FileOpened, None)
        .await
        .expect("log");
    tokio::time::sleep(Duration::from_millis(50)).await;

    handle.stop();
    task.abort();

    let triage = action_log
        .actions_by_type(session_id, ActionType::ObserverTriage)
        .await
        .expect("query");
    assert_eq!(triage.len(), 2);

    let delivered = action_log
        .actions_by_type(session_id, ActionType::NudgeDelivered)
        .await
        .expect("query");
    assert_eq!(delivered.len(), 1);

    let suppressed = action_log
        .actions_by_type(session_id, ActionType::NudgeSuppressed)
        .await
        .expect("query");
    assert_eq!(suppressed.len(), 1);
    assert_eq!(suppressed[0].payload["reason"], "cooldown");
}

#[tokio::test]
async fn muted_observer_runs_no_triage() {
    let (action_log, _dir, session_id) = fresh_log().await;
    let classifier = Arc::new(ScriptedClassifier::new(vec![nudging(0.9)]));
    let (tx, _rx) = broadcast::channel(16);
    let config = ObserverConfig::default();

    let (handle, task) =
        ObserverHandle::start(session_id, action_log.clone(), classifier.clone(), tx, config);
    handle.set_muted(true);
    tokio::time::sleep(Duration::from_millis(10)).await;

    action_log
        .log_action(session_id, ActionType::FileOpened, None)
        .await
        .expect("log");
    tokio::time::sleep(Duration::from_millis(50)).await;

    handle.stop();
    task.abort();

    assert_eq!(classifier.call_count(), 0);
}

#[tokio::test]
async fn stopped_observer_ignores_further_events() {
    let (action_log, _dir, session_id) = fresh_log().await;
    let classifier = Arc::new(ScriptedClassifier::new(vec![nudging(0.9)]));
    let (tx, _rx) = broadcast::channel(16);
    let config = ObserverConfig::default();

    let (handle, task) =
        ObserverHandle::start(session_id, action_log.clone(), classifier.clone(), tx, config);
    handle.stop();
    tokio::time::sleep(Duration::from_millis(10)).await;

    action_log
        .log_action(session_id, ActionType::FileOpened, None)
        .await
        .expect("log");
    tokio::time::sleep(Duration::from_millis(30)).await;
    task.abort();

    assert_eq!(classifier.call_count(), 0);
}
