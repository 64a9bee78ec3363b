//! Function-style entry point: one raw event in, one processed message out.
//!
//! Used by the push endpoint and by the `process` subcommand. The raw event
//! is either a bare Pub/Sub message or the push wrapper
//! `{"message": {...}, "subscription": "..."}`.

use std::io::Read;
use std::path::Path;

use anyhow::Context;
use pubsub_publisher::{PublishError, RelayPublisher};
use pubsub_source::{MessageProcessor, ProcessOutcome};
use relay_types::Envelope;
use row_sink::RowSink;
use serde::Deserialize;
use serde_json::Value;

/// Body of a Pub/Sub push delivery.
#[derive(Debug, Clone, Deserialize)]
pub struct PushRequest {
    pub message: Envelope,
    #[serde(default)]
    pub subscription: Option<String>,
}

/// Extract the message from a raw event.
pub fn envelope_from_event(event: Value) -> serde_json::Result<Envelope> {
    if event.get("message").is_some() {
        let push: PushRequest = serde_json::from_value(event)?;
        if let Some(subscription) = &push.subscription {
            tracing::debug!("Push delivery from subscription {subscription}");
        }
        Ok(push.message)
    } else {
        serde_json::from_value(event)
    }
}

pub fn log_raw_event(event: &Value) {
    let pretty = serde_json::to_string_pretty(event).unwrap_or_else(|_| event.to_string());
    tracing::info!("RAW EVENT ↓\n{pretty}");
}

/// Run one message through the processor, logging a propagated failure.
pub async fn process_event<S, P>(
    processor: &MessageProcessor<S, P>,
    envelope: &Envelope,
) -> Result<ProcessOutcome, PublishError>
where
    S: RowSink,
    P: RelayPublisher,
{
    processor.handle_message(envelope).await.inspect_err(|e| {
        tracing::error!("Error processing PubSub message: {e}");
    })
}

/// Read a raw event from `path`, or from stdin when no path is given.
pub fn read_event(path: Option<&Path>) -> anyhow::Result<Value> {
    let raw = match path {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read event file {}", path.display()))?,
        None => {
            let mut raw = String::new();
            std::io::stdin()
                .read_to_string(&mut raw)
                .context("Failed to read event from stdin")?;
            raw
        }
    };
    serde_json::from_str(&raw).context("Event is not valid JSON")
}

/// Process a single event read from a file or stdin.
pub async fn run_once<S, P>(
    processor: &MessageProcessor<S, P>,
    path: Option<&Path>,
) -> anyhow::Result<ProcessOutcome>
where
    S: RowSink,
    P: RelayPublisher,
{
    let event = read_event(path)?;
    log_raw_event(&event);
    let envelope = envelope_from_event(event).context("Event is not a Pub/Sub message")?;

    let outcome = process_event(processor, &envelope).await?;
    match &outcome {
        ProcessOutcome::Relayed(receipt) => tracing::info!(
            "Relayed event {} to {} as {} (stored: {})",
            receipt.event_id,
            processor.topic_name(),
            receipt.delivery_id,
            receipt.stored
        ),
        ProcessOutcome::Rejected => tracing::info!("Message rejected, nothing relayed"),
        ProcessOutcome::Discarded(reason) => {
            tracing::info!("Message discarded, nothing relayed: {reason}")
        }
    }
    Ok(outcome)
}
