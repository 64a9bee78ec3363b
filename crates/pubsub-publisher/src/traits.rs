//! RelayPublisher trait definition.

use relay_types::Attributes;
use serde_json::Value;

use crate::error::Result;

/// Trait for publishing one message to a topic.
#[async_trait::async_trait]
pub trait RelayPublisher: Send + Sync {
    /// Publish `data` (serialized as JSON) with `attributes` to `topic`.
    ///
    /// Returns the broker-assigned delivery id. Errors are logged by the
    /// implementation and then returned unchanged.
    async fn publish_message(
        &self,
        topic: &str,
        data: &Value,
        attributes: &Attributes,
    ) -> Result<String>;
}
