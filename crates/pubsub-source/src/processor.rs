use chrono::{DateTime, SecondsFormat, Utc};
use pubsub_publisher::{PublishError, RelayPublisher};
use relay_types::{
    Attributes, ColumnFamily, ColumnValue, Envelope, Payload, DEFAULT_EVENT_TYPE, DEFAULT_SOURCE,
    STATUS_PENDING,
};
use row_sink::RowSink;
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::codec::{decode_base64_data, parse_data, CodecError};

/// Payload field and republished attribute carrying the event id.
const EVENT_ID: &str = "eventId";

/// What happened to one message.
#[derive(Debug, Clone, PartialEq)]
pub enum ProcessOutcome {
    /// The body could not be decoded; nothing was stored or published
    Discarded(CodecError),
    /// The payload is not a JSON object; nothing was stored or published
    Rejected,
    /// A store write was attempted and the message was republished
    Relayed(RelayReceipt),
}

/// Result of the store and relay steps for one message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayReceipt {
    pub event_id: String,
    pub row_key: String,
    /// Whether the row store acknowledged the write
    pub stored: bool,
    /// Delivery id assigned by the downstream topic
    pub delivery_id: String,
}

/// Decodes, stores and relays Pub/Sub messages.
///
/// Holds no per-message state: one processor is shared (behind an `Arc`) by
/// every concurrent invocation.
pub struct MessageProcessor<S, P> {
    sink: Arc<S>,
    publisher: Arc<P>,
    topic_name: String,
}

impl<S: RowSink, P: RelayPublisher> MessageProcessor<S, P> {
    pub fn new(sink: Arc<S>, publisher: Arc<P>, topic_name: impl Into<String>) -> Self {
        Self {
            sink,
            publisher,
            topic_name: topic_name.into(),
        }
    }

    /// Topic every relayed message is published to.
    pub fn topic_name(&self) -> &str {
        &self.topic_name
    }

    /// Process one message.
    ///
    /// Only a failed publish is returned as an error; every other problem is
    /// logged and reported through [`ProcessOutcome`].
    pub async fn handle_message(&self, envelope: &Envelope) -> Result<ProcessOutcome, PublishError> {
        let text = match decode_base64_data(envelope.data.as_deref()) {
            Ok(text) => text,
            Err(err) => {
                log_decode_failure(&err);
                return Ok(ProcessOutcome::Discarded(err));
            }
        };

        let payload = parse_data(text);

        info!(
            "Received Pub/Sub message: ID={}, published at {}",
            envelope.delivery_id(),
            envelope.published_at()
        );
        log_message_details(&payload, &envelope.attributes);

        self.save_event(&payload, &envelope.attributes).await
    }

    async fn save_event(
        &self,
        payload: &Payload,
        attributes: &Attributes,
    ) -> Result<ProcessOutcome, PublishError> {
        let Some(fields) = payload.as_object() else {
            error!("Payload is not a valid JSON object");
            return Ok(ProcessOutcome::Rejected);
        };
        let body = Value::Object(fields.clone());

        let now = Utc::now();
        let event_id = event_id_of(fields).unwrap_or_else(|| Uuid::new_v4().to_string());
        let row_key = row_key(&event_id, &now);

        let meta = meta_family(&now, attributes);
        let data = data_family(&body, &event_id, attributes);

        // The write outcome is recorded, but publishing happens regardless
        let stored = self.sink.insert_event(&row_key, &data, &meta).await;

        let mut relay_attributes = attributes.clone();
        relay_attributes.insert(EVENT_ID.to_string(), event_id.clone());

        let delivery_id = self
            .publisher
            .publish_message(&self.topic_name, &body, &relay_attributes)
            .await?;

        Ok(ProcessOutcome::Relayed(RelayReceipt {
            event_id,
            row_key,
            stored,
            delivery_id,
        }))
    }
}

fn log_decode_failure(err: &CodecError) {
    match err {
        CodecError::Decode { source } => error!(detail = ?source, "{err}"),
        _ if err.is_expected() => warn!("{err}"),
        _ => error!("{err}"),
    }
}

fn log_message_details(payload: &Payload, attributes: &Attributes) {
    if payload.is_empty() {
        info!("Message Payload: (empty)");
    } else {
        info!("Message Payload: {payload}");
    }

    if attributes.is_empty() {
        info!("Message Attributes: (none)");
    } else {
        info!("Message Attributes: {attributes:?}");
    }
}

/// The payload's own `eventId` when it is set to a truthy value.
///
/// Strings are used as-is; numbers, booleans and nested values are used in
/// their JSON form. `null`, `false`, `0` and `""` count as unset.
fn event_id_of(fields: &Map<String, Value>) -> Option<String> {
    match fields.get(EVENT_ID)? {
        Value::Null | Value::Bool(false) => None,
        Value::String(id) if id.is_empty() => None,
        Value::String(id) => Some(id.clone()),
        Value::Number(n) if n.as_f64() == Some(0.0) => None,
        other => Some(other.to_string()),
    }
}

/// `{eventId}-{epochMillis}` using the write time.
fn row_key(event_id: &str, now: &DateTime<Utc>) -> String {
    format!("{event_id}-{}", now.timestamp_millis())
}

fn attribute_or<'a>(attributes: &'a Attributes, key: &str, default: &'a str) -> &'a str {
    attributes
        .get(key)
        .map(String::as_str)
        .filter(|value| !value.is_empty())
        .unwrap_or(default)
}

fn meta_family(now: &DateTime<Utc>, attributes: &Attributes) -> ColumnFamily {
    let timestamp = now.to_rfc3339_opts(SecondsFormat::Millis, true);

    let mut meta = ColumnFamily::new();
    meta.insert("createdAt".to_string(), ColumnValue::from(timestamp.clone()));
    meta.insert("updatedAt".to_string(), ColumnValue::from(timestamp));
    meta.insert("status".to_string(), ColumnValue::from(STATUS_PENDING));
    meta.insert("retryCount".to_string(), ColumnValue::from("0"));
    meta.insert(
        "source".to_string(),
        ColumnValue::from(attribute_or(attributes, "source", DEFAULT_SOURCE)),
    );
    meta
}

fn data_family(body: &Value, event_id: &str, attributes: &Attributes) -> ColumnFamily {
    let mut data = ColumnFamily::new();
    data.insert("eventBody".to_string(), ColumnValue::Json(body.clone()));
    data.insert(EVENT_ID.to_string(), ColumnValue::from(event_id));
    data.insert(
        "eventType".to_string(),
        ColumnValue::from(attribute_or(attributes, "eventType", DEFAULT_EVENT_TYPE)),
    );
    data
}
