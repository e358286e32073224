//! Starts and stops a per-session [`ObserverHandle`] (spec §4.8) as
//! sessions come and go, mirroring the Coaching Pipeline's Reflect
//! stage: a cheap synchronous subscriber forwards action-log events
//! onto a channel, and an owning task reacts to `session_started`/
//! `session_ended` without holding any lock across an await point.

use std::collections::HashMap;
use std::sync::Arc;

use paige_action_log::ActionEvent;
use paige_action_log::ActionLogStore;
use paige_config::ObserverConfig;
use paige_model_client::ModelClient;
use paige_observer::Classifier;
use paige_observer::ModelClassifier;
use paige_observer::ObserverHandle;
use paige_protocol::ActionType;
use paige_protocol::ServerMessage;
use tokio::sync::broadcast;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Starts the manager task. Returns its handle for process shutdown.
pub fn start(
    action_log: Arc<ActionLogStore>,
    model_client: Arc<dyn ModelClient>,
    broadcast_tx: broadcast::Sender<ServerMessage>,
    config: ObserverConfig,
) -> JoinHandle<()> {
    let (tx, mut rx) = mpsc::unbounded_channel::<ActionEvent>();
    action_log.events().subscribe(move |event: &ActionEvent| {
        if matches!(
            event.action_type,
            ActionType::SessionStarted | ActionType::SessionEnded
        ) {
            let _ = tx.send(event.clone());
        }
    });

    tokio::spawn(async move {
        let mut observers: HashMap<u64, ObserverHandle> = HashMap::new();
        while let Some(event) = rx.recv().await {
            match event.action_type {
                ActionType::SessionStarted => {
                    let classifier: Arc<dyn Classifier> = Arc::new(ModelClassifier::new(
                        model_client.clone(),
                        action_log.clone(),
                    ));
                    let (handle, _task) = ObserverHandle::start(
                        event.session_id,
                        action_log.clone(),
                        classifier,
                        broadcast_tx.clone(),
                        config,
                    );
                    observers.insert(event.session_id, handle);
                }
                ActionType::SessionEnded => {
                    if let Some(handle) = observers.remove(&event.session_id) {
                        handle.stop();
                    }
                }
                _ => {}
            }
        }
    })
}

#[cfg(test)]
#[path = "observer_manager.test.rs"]
mod tests;
