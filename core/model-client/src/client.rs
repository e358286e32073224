//! The [`ModelClient`] trait: the seam behind which the actual external
//! provider call lives. This crate owns tier resolution, pricing, cost
//! accounting and stop-reason handling; the network call itself is an
//! out-of-scope collaborator (spec §1) implemented elsewhere against
//! this trait.

use async_trait::async_trait;

use paige_error::PaigeError;

use crate::types::CallOptions;
use crate::types::RawModelResponse;

/// Invokes an external model provider for one turn of a conversation.
#[async_trait]
pub trait ModelClient: Send + Sync {
    async fn raw_call(&self, opts: &CallOptions) -> Result<RawModelResponse, PaigeError>;
}

/// Degraded implementation used when no provider API key is configured
/// (spec §6): every call succeeds with an empty JSON-object response
/// rather than failing loudly, so dependent features silently no-op.
#[derive(Debug, Default)]
pub struct NoopModelClient;

#[async_trait]
impl ModelClient for NoopModelClient {
    async fn raw_call(&self, opts: &CallOptions) -> Result<RawModelResponse, PaigeError> {
        tracing::debug!(call_type = %opts.call_type, "model client degraded: no API key configured");
        Ok(RawModelResponse {
            stop_reason: crate::types::StopReason::EndTurn,
            text: Some("{}".to_string()),
            tool_uses: Vec::new(),
            input_tokens: 0,
            output_tokens: 0,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn noop_client_returns_empty_object() {
        let client = NoopModelClient;
        let opts = CallOptions::new(
            "coach_agent",
            crate::types::ModelTier::Sonnet,
            "system",
            "hello",
            1,
        );
        let resp = client.raw_call(&opts).await.expect("noop call");
        assert_eq!(resp.text.as_deref(), Some("{}"));
        assert_eq!(resp.input_tokens, 0);
    }
}
