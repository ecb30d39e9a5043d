//! Storage layer for Rivulet
//!
//! Three small, pure-ish pieces the engine composes:
//! - `partition`: divides the 128-bit keyspace into shard ranges
//! - `router`: maps partition keys / explicit hash keys to shards
//! - `log`: per-shard append logs plus the global sequence generator

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod log;
pub mod partition;
pub mod router;

pub use log::{SequenceGenerator, ShardLog};
pub use partition::hash_key_ranges;
pub use router::{hash_partition_key, parse_explicit_hash_key, route};
