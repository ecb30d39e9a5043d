//! Rivulet: an in-memory emulation of a partitioned, append-only
//! data stream
//!
//! Producers append records tagged with a partition key; a stream is
//! split into a fixed number of shards, each owning a contiguous slice
//! of the 128-bit hash keyspace; consumers read shards sequentially
//! through opaque, single-use, time-limited iterators.
//!
//! # Quick start
//!
//! ```
//! use rivulet::{ShardIteratorType, StreamService};
//!
//! let svc = StreamService::new();
//! svc.create_stream("orders", Some(3))?;
//!
//! let (shard_id, _seq) = svc.put_record("orders", b"hello".to_vec(), "user-1", None)?;
//!
//! let token = svc.get_shard_iterator(
//!     "orders",
//!     &shard_id.to_string(),
//!     ShardIteratorType::TrimHorizon,
//! )?;
//! let page = svc.get_records(&token, None)?;
//! assert_eq!(page.records[0].data, b"hello");
//! # Ok::<(), rivulet::Error>(())
//! ```
//!
//! # What this is not
//!
//! No durability, no replication, no re-sharding, no consumer-group
//! coordination, no exactly-once delivery. The guarantee is
//! at-least-once, ordered-per-shard delivery over one process's
//! memory.

pub use rivulet_core::{
    Error, HashKeyRange, Record, Result, SequenceNumber, Shard, ShardId, ShardIteratorType,
    StreamDescription, StreamLimits, StreamStatus, StreamUid,
};
pub use rivulet_engine::{
    DescribeStreamOutput, GetRecordsOutput, ListShardsOutput, ListStreamsOutput, PutRecordsEntry,
    PutRecordsOutput, PutRecordsResult, StreamService,
};
