//! Row store sink abstraction.
//!
//! This crate defines the `RowSink` trait that the message processor writes
//! through, the formatter that turns tagged column values into bytes, and an
//! in-memory sink used for dry runs and tests.
//!
//! Concrete stores (see `bigtable-sink`) implement `RowSink` and call
//! [`format_family`] so every store sees the same bytes for the same row.

mod formatter;
mod memory;
mod traits;

pub use formatter::{format_family, format_value};
pub use memory::{MemoryRowSink, StoredRow};
pub use traits::RowSink;
