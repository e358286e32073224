//! The uniform `Call[T]` API (spec §4.4): drives one [`ModelClient`]
//! turn, handles stop reasons, and logs cost/latency regardless of
//! outcome.

use std::time::Instant;

use serde::de::DeserializeOwned;
use sha2::Digest;
use sha2::Sha256;

use paige_action_log::ActionLogStore;
use paige_error::PaigeError;

use crate::client::ModelClient;
use crate::types::CallOptions;
use crate::types::StopReason;
use crate::types::compute_cost;

/// `SHA256(user_message).hex[:16]`, used as the logged `input_hash`
/// (spec §4.4, §8).
pub fn input_hash(user_message: &str) -> String {
    let digest = Sha256::digest(user_message.as_bytes());
    format!("{digest:x}")[..16].to_string()
}

/// Drives one call, parses the result against `T`, and logs the outcome
/// to the api-call log whether it succeeds or fails.
pub async fn call<T>(
    client: &dyn ModelClient,
    action_log: &ActionLogStore,
    opts: CallOptions,
) -> Result<T, PaigeError>
where
    T: DeserializeOwned,
{
    let start = Instant::now();
    let result = client.raw_call(&opts).await;

    let latency_ms = start.elapsed().as_millis() as i64;

    let response = match result {
        Ok(response) => response,
        Err(err) => {
            log_outcome(action_log, &opts, -1, 0, 0, 0.0, false).await?;
            return Err(err);
        }
    };

    let cost = compute_cost(opts.model, response.input_tokens, response.output_tokens);
    log_outcome(
        action_log,
        &opts,
        latency_ms,
        response.input_tokens,
        response.output_tokens,
        cost,
        true,
    )
    .await?;

    match response.stop_reason {
        StopReason::Refusal => Err(PaigeError::ModelRefusal),
        StopReason::MaxTokens => Err(PaigeError::ModelMaxTokens),
        StopReason::EndTurn => {
            let text = response.text.unwrap_or_default();
            let cleaned = strip_markdown_fence(&text);
            serde_json::from_str(cleaned).map_err(|e| PaigeError::ModelSchema {
                message: format!("response did not match expected schema: {e}"),
            })
        }
    }
}

/// Strips a leading/trailing ```json ... ``` (or bare ```) fence, a
/// common formatting quirk in model text responses (spec §4.10).
pub fn strip_markdown_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    let rest = rest.trim_start_matches(['\n', '\r']);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

/// Persists one api_call_log row. Per spec §7, action-log persistence
/// failures are fatal to the operation that requested them: no silent
/// drops, so this propagates rather than logging and continuing.
#[allow(clippy::too_many_arguments)]
async fn log_outcome(
    action_log: &ActionLogStore,
    opts: &CallOptions,
    latency_ms: i64,
    input_tokens: u64,
    output_tokens: u64,
    cost: f64,
    succeeded: bool,
) -> Result<(), PaigeError> {
    action_log
        .log_api_call(
            opts.session_id,
            opts.call_type.clone(),
            opts.model.as_str().to_string(),
            input_tokens,
            output_tokens,
            cost,
            latency_ms,
            succeeded,
        )
        .await
        .map(|_| ())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn input_hash_is_sixteen_hex_chars() {
        let hash = input_hash("hello world");
        assert_eq!(hash.len(), 16);
        assert!(hash.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn strip_markdown_fence_removes_json_fence() {
        let text = "```json\n{\"a\": 1}\n```";
        assert_eq!(strip_markdown_fence(text), "{\"a\": 1}");
    }

    #[test]
    fn strip_markdown_fence_is_noop_on_plain_text() {
        assert_eq!(strip_markdown_fence("{\"a\": 1}"), "{\"a\": 1}");
    }
}
