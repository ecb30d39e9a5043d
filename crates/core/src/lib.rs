//! Core types for Rivulet
//!
//! This crate defines the foundational types used throughout the
//! system:
//! - StreamUid / ShardId / SequenceNumber: identities
//! - HashKeyRange: the keyspace slice a shard owns
//! - Record / Shard / StreamDescription: data model
//! - ShardIteratorType: cursor starting positions
//! - Error: error type hierarchy
//! - StreamLimits: injected operational tunables

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod limits;
pub mod types;

pub use error::{Error, Result};
pub use limits::StreamLimits;
pub use types::{
    HashKeyRange, Record, SequenceNumber, Shard, ShardId, ShardIteratorType, StreamDescription,
    StreamStatus, StreamUid,
};
