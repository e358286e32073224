//! Bounded per-client egress queue with the overflow-drop policy from
//! spec §4.1: a broadcast to a slow client must not block delivery to
//! any other client, and when a client's queue is full the oldest
//! pending low-priority frame is dropped before any coaching/session
//! frame is ever touched.

use std::collections::VecDeque;

use paige_protocol::ServerMessage;
use tokio::sync::Mutex;
use tokio::sync::Notify;

use crate::client::is_low_priority;

struct Inner {
    queue: VecDeque<ServerMessage>,
    closed: bool,
}

/// FIFO per client; pushes never block the pusher (spec §4.1's
/// "ordering is FIFO per client" plus the no-blocking overflow policy).
pub struct EgressQueue {
    capacity: usize,
    inner: Mutex<Inner>,
    notify: Notify,
}

impl EgressQueue {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            inner: Mutex::new(Inner {
                queue: VecDeque::with_capacity(capacity),
                closed: false,
            }),
        }
    }

    /// Enqueues `message`, applying the overflow-drop policy if the
    /// queue is already at capacity. Returns `true` if `message` was
    /// queued (it may instead have been the frame dropped to make
    /// room, or — when the queue is saturated with non-low-priority
    /// frames — the incoming frame itself).
    pub async fn push(&self, message: ServerMessage) -> bool {
        let mut guard = self.inner.lock().await;
        if guard.closed {
            return false;
        }
        if guard.queue.len() >= self.capacity {
            match guard
                .queue
                .iter()
                .position(|queued| is_low_priority(queued))
            {
                Some(index) => {
                    guard.queue.remove(index);
                }
                None if is_low_priority(&message) => {
                    drop(guard);
                    return false;
                }
                None => {
                    guard.queue.pop_front();
                }
            }
        }
        guard.queue.push_back(message);
        drop(guard);
        self.notify.notify_one();
        true
    }

    /// Waits for and removes the oldest queued frame. Returns `None`
    /// once [`EgressQueue::close`] has been called and the queue has
    /// drained.
    pub async fn pop(&self) -> Option<ServerMessage> {
        loop {
            {
                let mut guard = self.inner.lock().await;
                if let Some(message) = guard.queue.pop_front() {
                    return Some(message);
                }
                if guard.closed {
                    return None;
                }
            }
            self.notify.notified().await;
        }
    }

    pub async fn close(&self) {
        let mut guard = self.inner.lock().await;
        guard.closed = true;
        drop(guard);
        self.notify.notify_one();
    }
}

#[cfg(test)]
#[path = "egress.test.rs"]
mod tests;
