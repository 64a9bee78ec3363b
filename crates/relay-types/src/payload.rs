//! Decoded message payload.

use serde_json::{Map, Value};
use std::fmt;

/// A message body after base64 decoding and JSON classification.
///
/// Bodies that parse as JSON are kept as a [`Value`] tree; anything else is
/// carried verbatim as text.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    /// Body parsed as JSON (object, array or scalar)
    Structured(Value),
    /// Body that is not valid JSON
    Text(String),
}

impl Payload {
    /// Whether the payload counts as empty for logging purposes.
    ///
    /// JSON `null`, an empty string and an empty JSON object are empty.
    pub fn is_empty(&self) -> bool {
        match self {
            Payload::Structured(Value::Null) => true,
            Payload::Structured(Value::Object(map)) => map.is_empty(),
            Payload::Structured(_) => false,
            Payload::Text(text) => text.is_empty(),
        }
    }

    /// The JSON object behind this payload, if it is one.
    pub fn as_object(&self) -> Option<&Map<String, Value>> {
        match self {
            Payload::Structured(Value::Object(map)) => Some(map),
            _ => None,
        }
    }
}

impl fmt::Display for Payload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Payload::Structured(value) => write!(f, "{value}"),
            Payload::Text(text) => f.write_str(text),
        }
    }
}
