use paige_protocol::CoachingMessage;
use paige_protocol::NudgeTrigger;
use paige_protocol::ServerMessage;

use super::*;

fn coaching_message() -> ServerMessage {
    ServerMessage::ObserverNudge(CoachingMessage {
        id: 1,
        session_id: 1,
        trigger: NudgeTrigger::Manual,
        confidence: 0.9,
        title: "t".to_string(),
        body: "b".to_string(),
        delivered_at: chrono::Utc::now(),
    })
}

fn buffer_content() -> ServerMessage {
    ServerMessage::BufferContent(paige_protocol::Buffer::new(
        std::path::PathBuf::from("/a.rs"),
        String::new(),
    ))
}

#[tokio::test]
async fn pop_returns_pushed_frames_in_order() {
    let queue = EgressQueue::new(4);
    assert!(queue.push(coaching_message()).await);
    assert!(queue.push(buffer_content()).await);

    let first = queue.pop().await.expect("first");
    assert_eq!(first.type_name(), "observer:nudge");
    let second = queue.pop().await.expect("second");
    assert_eq!(second.type_name(), "buffer:content");
}

#[tokio::test]
async fn overflow_drops_oldest_low_priority_frame_before_high_priority() {
    let queue = EgressQueue::new(2);
    assert!(queue.push(buffer_content()).await);
    assert!(queue.push(coaching_message()).await);
    // Queue full of one low-priority and one high-priority frame;
    // pushing another high-priority frame must evict the low-priority one.
    assert!(queue.push(coaching_message()).await);

    let first = queue.pop().await.expect("first");
    assert_eq!(first.type_name(), "observer:nudge");
    let second = queue.pop().await.expect("second");
    assert_eq!(second.type_name(), "observer:nudge");
}

#[tokio::test]
async fn overflow_with_no_low_priority_frame_drops_the_incoming_low_priority_frame() {
    let queue = EgressQueue::new(1);
    assert!(queue.push(coaching_message()).await);
    assert!(!queue.push(buffer_content()).await);

    let only = queue.pop().await.expect("only");
    assert_eq!(only.type_name(), "observer:nudge");
}

#[tokio::test]
async fn close_makes_pop_return_none_once_drained() {
    let queue = EgressQueue::new(2);
    assert!(queue.push(coaching_message()).await);
    queue.close().await;

    assert!(queue.pop().await.is_some());
    assert!(queue.pop().await.is_none());
}
