//! Column values and column families of a stored row.
//!
//! A row is written as two column families, [`META_FAMILY`] and
//! [`DATA_FAMILY`]. Values are tagged when they are built so the formatter
//! only has to match on [`ColumnValue`] to pick an encoding.

use serde_json::Value;
use std::collections::BTreeMap;

/// Column family holding bookkeeping columns.
pub const META_FAMILY: &str = "meta";
/// Column family holding the event itself.
pub const DATA_FAMILY: &str = "data";

/// Initial `status` of every written row.
pub const STATUS_PENDING: &str = "PENDING";
/// `source` column value when the message carries no `source` attribute.
pub const DEFAULT_SOURCE: &str = "pubsub";
/// `eventType` column value when the message carries no `eventType` attribute.
pub const DEFAULT_EVENT_TYPE: &str = "UNKNOWN";

/// A column value before byte encoding.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnValue {
    /// Stored as its UTF-8 bytes
    Text(String),
    /// Stored as the UTF-8 bytes of its JSON serialization
    Json(Value),
}

impl From<String> for ColumnValue {
    fn from(value: String) -> Self {
        ColumnValue::Text(value)
    }
}

impl From<&str> for ColumnValue {
    fn from(value: &str) -> Self {
        ColumnValue::Text(value.to_string())
    }
}

/// Column qualifier → value, before encoding.
pub type ColumnFamily = BTreeMap<String, ColumnValue>;

/// Column qualifier → encoded bytes.
pub type FormattedFamily = BTreeMap<String, Vec<u8>>;
