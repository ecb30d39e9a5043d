//! Stream engine for Rivulet
//!
//! Composes the storage layer into the full emulation:
//! - `registry`: stream lifecycle and the live stream table
//! - `iterator`: opaque, single-use, time-limited shard cursors
//! - `service`: the `StreamService` facade exposing the external
//!   contract
//!
//! Construct one [`StreamService`] and share it by reference across
//! request handlers; all synchronization is internal and scoped per
//! stream or per shard, with the sequence counter on its own atomic.

#![warn(missing_docs)]
#![warn(clippy::all)]

mod iterator;
mod registry;
pub mod service;

pub use service::{
    DescribeStreamOutput, GetRecordsOutput, ListShardsOutput, ListStreamsOutput, PutRecordsEntry,
    PutRecordsOutput, PutRecordsResult, StreamService,
};
