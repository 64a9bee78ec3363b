//! Shared types for pubsub-relay.
//!
//! This crate holds the data model that every other crate in the workspace
//! speaks: the inbound Pub/Sub [`Envelope`], the classified [`Payload`], and
//! the column types that make up a stored row.
//!
//! # Architecture
//!
//! ```text
//! Envelope (base64 body) → Payload (JSON or text) → ColumnFamily → bytes per column
//! ```
//!
//! # Modules
//!
//! - [`envelope`] - Inbound message wrapper and its sentinel defaults
//! - [`payload`] - Decoded payload classification
//! - [`column`] - Tagged column values and the row's column families

pub mod column;
pub mod envelope;
pub mod payload;

pub use column::{
    ColumnFamily, ColumnValue, FormattedFamily, DATA_FAMILY, DEFAULT_EVENT_TYPE, DEFAULT_SOURCE,
    META_FAMILY, STATUS_PENDING,
};
pub use envelope::{Attributes, Envelope, UNKNOWN};
pub use payload::Payload;
