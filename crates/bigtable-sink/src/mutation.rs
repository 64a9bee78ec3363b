//! `mutateRow` request body.
//!
//! Bytes fields are base64 encoded and 64-bit integers are JSON strings, as
//! the REST mapping of the Bigtable protos requires.

use base64::Engine;
use relay_types::FormattedFamily;
use serde::Serialize;

/// `timestampMicros` value asking the server to assign the cell timestamp.
const SERVER_ASSIGNED_TIMESTAMP: &str = "-1";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MutateRowRequest {
    pub row_key: String,
    pub mutations: Vec<Mutation>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Mutation {
    pub set_cell: SetCell,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SetCell {
    pub family_name: String,
    pub column_qualifier: String,
    pub timestamp_micros: String,
    pub value: String,
}

fn encode(bytes: &[u8]) -> String {
    base64::engine::general_purpose::STANDARD.encode(bytes)
}

impl MutateRowRequest {
    /// Build the request for one row from its already formatted families.
    pub fn new(row_key: &str, families: &[(&str, &FormattedFamily)]) -> Self {
        let mutations = families
            .iter()
            .flat_map(|(family_name, columns)| {
                columns.iter().map(move |(qualifier, value)| Mutation {
                    set_cell: SetCell {
                        family_name: family_name.to_string(),
                        column_qualifier: encode(qualifier.as_bytes()),
                        timestamp_micros: SERVER_ASSIGNED_TIMESTAMP.to_string(),
                        value: encode(value),
                    },
                })
            })
            .collect();

        Self {
            row_key: encode(row_key.as_bytes()),
            mutations,
        }
    }
}
