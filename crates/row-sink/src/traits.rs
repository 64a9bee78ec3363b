//! RowSink trait definition.

use relay_types::ColumnFamily;

/// Trait for writing one event row to a wide-column store.
///
/// Writes never fail to the caller: an implementation catches every error
/// (including connectivity problems), logs it, and reports `false`. The
/// processor records the outcome but carries on with the publish step either
/// way.
///
/// # Usage Pattern
///
/// The processor is generic over the sink so the entry point picks an
/// implementation once:
///
/// ```ignore
/// pub struct MessageProcessor<S: RowSink, P: RelayPublisher> { sink: Arc<S>, /* ... */ }
///
/// let stored = self.sink.insert_event(&row_key, &data, &meta).await;
/// ```
#[async_trait::async_trait]
pub trait RowSink: Send + Sync {
    /// Write a row with the given key and its `data` and `meta` families.
    ///
    /// Returns `true` when the store acknowledged the write.
    async fn insert_event(&self, row_key: &str, data: &ColumnFamily, meta: &ColumnFamily) -> bool;
}
