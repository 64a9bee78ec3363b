//! In-memory publisher.

use relay_types::Attributes;
use serde_json::Value;
use std::sync::{Mutex, MutexGuard};

use crate::error::{PublishError, Result};
use crate::traits::RelayPublisher;

/// A message as the in-memory publisher received it.
#[derive(Debug, Clone, PartialEq)]
pub struct PublishedMessage {
    pub topic: String,
    pub data: Value,
    pub attributes: Attributes,
    pub message_id: String,
}

/// Publisher that keeps messages in memory and hands out sequential ids.
///
/// Backs `--dry-run` and the processor tests; `failing()` rejects every
/// publish to exercise error propagation.
#[derive(Debug, Default)]
pub struct MemoryPublisher {
    messages: Mutex<Vec<PublishedMessage>>,
    fail_publishes: bool,
}

impl MemoryPublisher {
    pub fn new() -> Self {
        Self::default()
    }

    /// A publisher whose publishes always fail.
    pub fn failing() -> Self {
        Self {
            fail_publishes: true,
            ..Self::default()
        }
    }

    /// Snapshot of every message published so far.
    pub fn messages(&self) -> Vec<PublishedMessage> {
        self.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<PublishedMessage>> {
        self.messages
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait::async_trait]
impl RelayPublisher for MemoryPublisher {
    async fn publish_message(
        &self,
        topic: &str,
        data: &Value,
        attributes: &Attributes,
    ) -> Result<String> {
        if self.fail_publishes {
            let err = PublishError::Rejected {
                topic: topic.to_string(),
                reason: "publishing is disabled".to_string(),
            };
            tracing::error!("Failed to publish message to {topic}: {err}");
            return Err(err);
        }

        let mut messages = self.lock();
        let message_id = format!("memory-{}", messages.len() + 1);
        messages.push(PublishedMessage {
            topic: topic.to_string(),
            data: data.clone(),
            attributes: attributes.clone(),
            message_id: message_id.clone(),
        });

        tracing::debug!("📤 Message published to {topic}: {message_id}");
        Ok(message_id)
    }
}
