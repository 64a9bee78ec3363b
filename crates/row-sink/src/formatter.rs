//! Column family formatting.
//!
//! Every stored cell is raw bytes. Text values are written as their UTF-8
//! bytes; anything else is written as its JSON serialization.

use relay_types::{ColumnFamily, ColumnValue, FormattedFamily};

/// Encode a single column value.
pub fn format_value(value: &ColumnValue) -> Vec<u8> {
    match value {
        ColumnValue::Text(text) => text.as_bytes().to_vec(),
        // Display for serde_json::Value is its compact serialization
        ColumnValue::Json(json) => json.to_string().into_bytes(),
    }
}

/// Encode every column of a family.
pub fn format_family(family: &ColumnFamily) -> FormattedFamily {
    family
        .iter()
        .map(|(qualifier, value)| (qualifier.clone(), format_value(value)))
        .collect()
}
