//! Topic publishing for pubsub-relay.
//!
//! This crate provides:
//! - The `RelayPublisher` trait the message processor publishes through
//! - `PubsubPublisher`, publishing through the Cloud Pub/Sub REST API
//! - `MemoryPublisher`, keeping messages in memory for dry runs and tests
//!
//! Unlike row sinks, publishers report failures to the caller: a message
//! that could not be relayed must surface so the transport redelivers it.

pub mod error;
mod memory;
mod rest;
mod traits;

pub use error::{PublishError, Result};
pub use memory::{MemoryPublisher, PublishedMessage};
pub use rest::{topic_path, PubsubPublisher};
pub use traits::RelayPublisher;
