//! Text-frame encoding and decoding for the relay protocol.
//!
//! Outbound messages are plain serde: [`encode_outbound`] is a thin wrapper
//! over `serde_json::to_string`.  Inbound decoding is done in two steps
//! (parse to a JSON object, then dispatch on `"type"`) so that unknown
//! discriminators decode to [`InboundMessage::Unknown`] rather than an
//! error.  New server message types therefore never break an older relay.

use serde_json::{Map, Value};
use thiserror::Error;

use super::messages::{
    InboundMessage, OutboundMessage, TYPE_ROBOT_STATUS, TYPE_WATCHER_COUNT,
};

/// Errors produced while encoding or decoding a frame.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// A message could not be serialized.
    #[error("failed to encode {kind} message: {source}")]
    Encode {
        kind: &'static str,
        #[source]
        source: serde_json::Error,
    },

    /// The frame is not valid JSON.
    #[error("frame is not valid JSON: {0}")]
    InvalidJson(#[source] serde_json::Error),

    /// The frame is valid JSON but not an object.
    #[error("frame is not a JSON object")]
    NotAnObject,

    /// The object has no string `type` field.
    #[error("frame has no string \"type\" field")]
    MissingType,

    /// A known message type carried an unusable payload.
    #[error("invalid {kind} payload: {reason}")]
    InvalidPayload { kind: String, reason: String },
}

/// Serializes an outbound message into one text frame.
///
/// # Errors
///
/// Returns [`ProtocolError::Encode`] if serialization fails.
pub fn encode_outbound(msg: &OutboundMessage) -> Result<String, ProtocolError> {
    serde_json::to_string(msg).map_err(|source| ProtocolError::Encode {
        kind: msg.type_name(),
        source,
    })
}

/// Parses an outbound frame.  Used by the server side and by tests.
pub fn decode_outbound(text: &str) -> Result<OutboundMessage, ProtocolError> {
    serde_json::from_str(text).map_err(ProtocolError::InvalidJson)
}

/// Parses one inbound text frame.
///
/// # Errors
///
/// Malformed JSON, a non-object frame, a missing `type`, or a bad payload for
/// a known type.  An unknown `type` is **not** an error.
///
/// # Example
///
/// ```rust
/// use padrelay_core::{decode_inbound, InboundMessage};
///
/// let msg = decode_inbound(r#"{"type":"watcherCount","value":3}"#).unwrap();
/// assert_eq!(msg, InboundMessage::WatcherCount { value: 3 });
///
/// let msg = decode_inbound(r#"{"type":"unknownThing"}"#).unwrap();
/// assert!(matches!(msg, InboundMessage::Unknown { .. }));
/// ```
pub fn decode_inbound(text: &str) -> Result<InboundMessage, ProtocolError> {
    let value: Value = serde_json::from_str(text).map_err(ProtocolError::InvalidJson)?;
    let Value::Object(mut obj) = value else {
        return Err(ProtocolError::NotAnObject);
    };

    let kind = match obj.remove("type") {
        Some(Value::String(kind)) => kind,
        _ => return Err(ProtocolError::MissingType),
    };

    match kind.as_str() {
        TYPE_WATCHER_COUNT => decode_watcher_count(&obj),
        TYPE_ROBOT_STATUS => Ok(InboundMessage::RobotStatus { payload: obj }),
        _ => Ok(InboundMessage::Unknown { kind }),
    }
}

fn decode_watcher_count(obj: &Map<String, Value>) -> Result<InboundMessage, ProtocolError> {
    let invalid = |reason: &str| ProtocolError::InvalidPayload {
        kind: TYPE_WATCHER_COUNT.to_string(),
        reason: reason.to_string(),
    };

    let raw = obj.get("value").ok_or_else(|| invalid("missing \"value\""))?;
    // Whole-valued floats such as `3.0` count too.
    let count = match raw.as_u64() {
        Some(n) => n,
        None => match raw.as_f64() {
            Some(f) if f >= 0.0 && f.fract() == 0.0 && f <= f64::from(u32::MAX) => f as u64,
            _ => return Err(invalid("\"value\" is not a non-negative integer")),
        },
    };
    let value = u32::try_from(count).map_err(|_| invalid("\"value\" out of range"))?;

    Ok(InboundMessage::WatcherCount { value })
}

/// Serializes an inbound message the way the server would.  Used by tests
/// and local fake servers.
pub fn encode_inbound(msg: &InboundMessage) -> String {
    let mut obj = Map::new();
    obj.insert("type".into(), Value::String(msg.type_name().to_string()));
    match msg {
        InboundMessage::WatcherCount { value } => {
            obj.insert("value".into(), Value::from(*value));
        }
        InboundMessage::RobotStatus { payload } => {
            for (k, v) in payload {
                obj.insert(k.clone(), v.clone());
            }
        }
        InboundMessage::Unknown { .. } => {}
    }
    Value::Object(obj).to_string()
}

// ── Tests ─────────────────────────────────────────────────────────────────────
