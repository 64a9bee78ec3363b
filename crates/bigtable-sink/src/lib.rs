//! Cloud Bigtable row sink.
//!
//! Writes each event as one row through the Bigtable Data API `mutateRow`
//! REST method. Every column becomes a `setCell` mutation in the `meta` or
//! `data` family, with the server choosing the cell timestamp.

mod mutation;
mod sink_impl;

pub use mutation::{MutateRowRequest, Mutation, SetCell};
pub use sink_impl::{BigtableSink, BigtableTable};
