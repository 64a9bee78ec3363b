//! Pub/Sub message processing for pubsub-relay.
//!
//! This crate provides:
//! - Base64/JSON decoding of message bodies with text fallback
//! - The `MessageProcessor` that stores each event as a row and relays it
//!   to a downstream topic
//!
//! # Pipeline
//!
//! ```text
//! Envelope → decode_base64_data → parse_data → RowSink::insert_event → RelayPublisher::publish_message
//! ```
//!
//! Decode problems and non-object payloads are logged and absorbed, store
//! failures are absorbed by the sink, and only publish failures reach the
//! caller so the transport can redeliver the message.

/// Base64 and JSON decoding of message bodies
pub mod codec;

/// Store-then-relay orchestration for one message
pub mod processor;

pub use codec::{decode, decode_base64_data, parse_data, CodecError};
pub use processor::{MessageProcessor, ProcessOutcome, RelayReceipt};
