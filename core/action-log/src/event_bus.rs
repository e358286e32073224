//! In-process event bus the action log publishes to on every append
//! (spec §4.3): a `RwLock<Vec<Handler>>` that broadcasts synchronously
//! in registration order.

use std::sync::RwLock;

use chrono::DateTime;
use chrono::Utc;
use serde_json::Value;

/// Payload delivered to subscribers for every logged action.
#[derive(Debug, Clone)]
pub struct ActionEvent {
    pub session_id: u64,
    pub action_type: paige_protocol::ActionType,
    pub data: Option<Value>,
    pub created_at: DateTime<Utc>,
}

type Handler = Box<dyn Fn(&ActionEvent) + Send + Sync>;

/// Broadcasts [`ActionEvent`]s to every registered subscriber. The
/// Observer subscribes here to receive triage triggers (spec §4.8).
#[derive(Default)]
pub struct EventBus {
    handlers: RwLock<Vec<Handler>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe<F>(&self, handler: F)
    where
        F: Fn(&ActionEvent) + Send + Sync + 'static,
    {
        if let Ok(mut handlers) = self.handlers.write() {
            handlers.push(Box::new(handler));
        }
    }

    /// Synchronously notifies every subscriber, in registration order.
    pub fn publish(&self, event: &ActionEvent) {
        if let Ok(handlers) = self.handlers.read() {
            for handler in handlers.iter() {
                handler(event);
            }
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.handlers.read().map(|h| h.len()).unwrap_or(0)
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("subscriber_count", &self.subscriber_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;
    use std::sync::atomic::Ordering;
    use std::sync::Arc;

    #[test]
    fn publish_calls_every_subscriber() {
        let bus = EventBus::new();
        let counter = Arc::new(AtomicUsize::new(0));
        let c1 = counter.clone();
        let c2 = counter.clone();
        bus.subscribe(move |_| {
            c1.fetch_add(1, Ordering::SeqCst);
        });
        bus.subscribe(move |_| {
            c2.fetch_add(1, Ordering::SeqCst);
        });

        bus.publish(&ActionEvent {
            session_id: 1,
            action_type: paige_protocol::ActionType::BufferUpdated,
            data: None,
            created_at: Utc::now(),
        });

        assert_eq!(counter.load(Ordering::SeqCst), 2);
    }
}
