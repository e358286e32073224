//! The external triage classifier (spec §4.8 `runTriage`): given recent
//! action context, decides whether a nudge should fire.

use async_trait::async_trait;
use serde::Deserialize;
use serde::Serialize;

use paige_error::PaigeError;
use paige_model_client::CallOptions;
use paige_model_client::ModelClient;
use paige_model_client::ModelTier;

/// Result of one classifier run. Defaults make the `NoopModelClient`'s
/// empty-object response decode into "do not nudge" rather than an error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TriageResult {
    #[serde(default)]
    pub should_nudge: bool,
    #[serde(default)]
    pub confidence: f64,
    #[serde(default)]
    pub signal: String,
    #[serde(default)]
    pub reasoning: Option<String>,
}

impl Default for TriageResult {
    fn default() -> Self {
        Self {
            should_nudge: false,
            confidence: 0.0,
            signal: String::new(),
            reasoning: None,
        }
    }
}

/// Recent action-stream context handed to the classifier for one triage
/// run.
#[derive(Debug, Clone, Serialize)]
pub struct ClassifierContext {
    pub session_id: u64,
    pub trigger_action: String,
    pub recent_action_types: Vec<String>,
}

/// The `runTriage` seam. Implementations call out to the Model Client
/// (or, in tests, return canned results).
#[async_trait]
pub trait Classifier: Send + Sync {
    async fn classify(&self, ctx: ClassifierContext) -> Result<TriageResult, PaigeError>;
}

const SYSTEM_PROMPT: &str = "You watch a developer's recent actions inside their editor and \
decide whether a short coaching nudge would help right now. Respond with JSON matching \
{should_nudge: bool, confidence: number between 0 and 1, signal: string, reasoning: string}.";

/// [`Classifier`] backed by a [`ModelClient`], using the cheapest tier
/// (haiku) since triage runs on every qualifying action.
pub struct ModelClassifier {
    client: std::sync::Arc<dyn ModelClient>,
    action_log: std::sync::Arc<paige_action_log::ActionLogStore>,
    tier: ModelTier,
}

impl ModelClassifier {
    pub fn new(
        client: std::sync::Arc<dyn ModelClient>,
        action_log: std::sync::Arc<paige_action_log::ActionLogStore>,
    ) -> Self {
        Self {
            client,
            action_log,
            tier: ModelTier::Haiku,
        }
    }
}

#[async_trait]
impl Classifier for ModelClassifier {
    async fn classify(&self, ctx: ClassifierContext) -> Result<TriageResult, PaigeError> {
        let user_message = serde_json::to_string(&ctx).map_err(|e| PaigeError::Internal {
            message: format!("failed to encode triage context: {e}"),
        })?;
        let opts = CallOptions::new(
            "observer.classifier",
            self.tier,
            SYSTEM_PROMPT,
            user_message,
            ctx.session_id,
        )
        .with_max_tokens(512);
        paige_model_client::call(self.client.as_ref(), &self.action_log, opts).await
    }
}

#[cfg(test)]
pub mod test_support {
    use super::*;
    use std::sync::Mutex;

    /// A classifier returning a fixed sequence of canned results, one per
    /// call, cycling back to the last once exhausted.
    pub struct ScriptedClassifier {
        results: Mutex<Vec<TriageResult>>,
        calls: std::sync::atomic::AtomicUsize,
    }

    impl ScriptedClassifier {
        pub fn new(results: Vec<TriageResult>) -> Self {
            Self {
                results: Mutex::new(results),
                calls: std::sync::atomic::AtomicUsize::new(0),
            }
        }

        pub fn call_count(&self) -> usize {
            self.calls.load(std::sync::atomic::Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl Classifier for ScriptedClassifier {
        async fn classify(&self, _ctx: ClassifierContext) -> Result<TriageResult, PaigeError> {
            let idx = self.calls.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            let results = self
                .results
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            let last = results.len().saturating_sub(1);
            Ok(results[idx.min(last)].clone())
        }
    }
}
