//! Inbound Pub/Sub message envelope.
//!
//! Mirrors the `PubsubMessage` JSON shape delivered by Pub/Sub (push
//! subscriptions and event triggers alike). Every field is optional on the
//! wire; readers go through [`Envelope::delivery_id`] and
//! [`Envelope::published_at`] so the `"<unknown>"` sentinel is substituted in
//! exactly one place.

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

/// Placeholder used for envelope metadata the transport did not supply.
pub const UNKNOWN: &str = "<unknown>";

/// Message attributes (string keys and values).
///
/// Ordered so that log lines and republished attributes are deterministic.
pub type Attributes = BTreeMap<String, String>;

/// A single message as delivered by the publish/subscribe transport.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Envelope {
    /// Broker-assigned delivery id
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message_id: Option<String>,
    /// Publish time as an ISO-8601 string
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub publish_time: Option<String>,
    /// Base64 encoded message body
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
    /// Message attributes; `null` on the wire is treated as empty
    #[serde(default, deserialize_with = "null_as_empty")]
    pub attributes: Attributes,
}

impl Envelope {
    /// Create an envelope carrying only a base64 body.
    pub fn with_data(data: impl Into<String>) -> Self {
        Self {
            data: Some(data.into()),
            ..Default::default()
        }
    }

    /// Delivery id, or [`UNKNOWN`] when the transport did not set one.
    pub fn delivery_id(&self) -> &str {
        self.message_id.as_deref().unwrap_or(UNKNOWN)
    }

    /// Publish time, or [`UNKNOWN`] when the transport did not set one.
    pub fn published_at(&self) -> &str {
        self.publish_time.as_deref().unwrap_or(UNKNOWN)
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Attributes, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Attributes>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_deserialize_full_envelope() {
        let envelope: Envelope = serde_json::from_value(json!({
            "messageId": "14538995975168121",
            "publishTime": "2025-05-15T05:13:49.502Z",
            "data": "e30=",
            "attributes": {"source": "billing"}
        }))
        .unwrap();

        assert_eq!(envelope.delivery_id(), "14538995975168121");
        assert_eq!(envelope.published_at(), "2025-05-15T05:13:49.502Z");
        assert_eq!(envelope.data.as_deref(), Some("e30="));
        assert_eq!(envelope.attributes.get("source").unwrap(), "billing");
    }

    #[test]
    fn test_missing_fields_use_sentinels() {
        let envelope: Envelope = serde_json::from_value(json!({})).unwrap();

        assert_eq!(envelope.delivery_id(), UNKNOWN);
        assert_eq!(envelope.published_at(), UNKNOWN);
        assert!(envelope.data.is_none());
        assert!(envelope.attributes.is_empty());
    }

    #[test]
    fn test_null_attributes_are_empty() {
        let envelope: Envelope =
            serde_json::from_value(json!({"data": "", "attributes": null})).unwrap();

        assert!(envelope.attributes.is_empty());
        assert_eq!(envelope.data.as_deref(), Some(""));
    }

    #[test]
    fn test_with_data() {
        let envelope = Envelope::with_data("abcd");
        assert_eq!(envelope.data.as_deref(), Some("abcd"));
        assert_eq!(envelope.delivery_id(), UNKNOWN);
    }
}
