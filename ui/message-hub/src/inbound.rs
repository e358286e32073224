//! Parses a raw inbound frame into a dispatchable `(type, payload)` pair
//! (spec §4.1, §7 "Validation errors").
//!
//! Parsing via the closed [`ClientMessage`] enum does double duty: an
//! unrecognized `type` or a payload that doesn't match its variant's
//! shape both surface as the same serde error, which is exactly spec
//! §7's "invalid message envelope, unknown type, schema-mismatch
//! payload" validation-error bucket.

use paige_error::PaigeError;
use paige_protocol::ClientMessage;
use paige_protocol::Envelope;
use serde_json::Value;

/// A successfully parsed inbound frame, reduced to what [`crate::hub::Hub`]
/// needs to dispatch it: the wire type string and its opaque payload.
pub struct InboundFrame {
    pub type_name: &'static str,
    pub payload: Value,
    pub id: Option<String>,
}

pub fn parse_inbound(text: &str) -> Result<InboundFrame, PaigeError> {
    let envelope: Envelope<ClientMessage> =
        serde_json::from_str(text).map_err(|err| PaigeError::Validation {
            message: format!("invalid message envelope: {err}"),
        })?;
    let type_name = envelope.message.type_name();
    let tagged = serde_json::to_value(&envelope.message).map_err(|err| PaigeError::Internal {
        message: format!("failed to re-serialize client message: {err}"),
    })?;
    let payload = tagged.get("payload").cloned().unwrap_or(Value::Null);
    Ok(InboundFrame {
        type_name,
        payload,
        id: envelope.id,
    })
}

#[cfg(test)]
#[path = "inbound.test.rs"]
mod tests;
