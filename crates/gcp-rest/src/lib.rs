//! Authenticated JSON-over-HTTP client for Google Cloud REST APIs.
//!
//! Both the Bigtable sink and the Pub/Sub publisher talk to Google through
//! the public REST surfaces (`bigtable.googleapis.com`,
//! `pubsub.googleapis.com`). This crate holds what they share: the HTTP
//! client, the endpoint (overridable for emulators and tests) and the way a
//! bearer token is obtained.

mod client;
mod credentials;
mod error;

pub use client::RestClient;
pub use credentials::{Credentials, CLOUD_PLATFORM_SCOPE};
pub use error::{RestError, Result};
pub use reqwest::StatusCode;
