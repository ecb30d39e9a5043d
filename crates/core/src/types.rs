//! Core types for Rivulet streams
//!
//! This module defines the foundational types:
//! - StreamUid: unique identity of one incarnation of a stream
//! - ShardId: ordered shard identity within a stream
//! - SequenceNumber: globally monotonic record identifier
//! - HashKeyRange: the slice of the 128-bit keyspace a shard owns
//! - Record: an immutable appended record
//! - StreamStatus / ShardIteratorType: lifecycle and cursor kinds

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Unique identifier for one incarnation of a stream
///
/// A StreamUid is minted when a stream is created and dies with it.
/// Iterators carry the uid so a token issued against a deleted stream
/// can never resolve against a re-created stream of the same name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StreamUid(Uuid);

impl StreamUid {
    /// Mint a new random StreamUid using UUID v4
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for StreamUid {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for StreamUid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Ordered shard identity within a stream
///
/// Shards are identified by their creation index: shard 0 owns the
/// lowest hash-key range, shard N-1 the highest. The display form is
/// the conventional `shardId-000000000000` rendering.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
pub struct ShardId(pub u32);

impl ShardId {
    /// Shard index within the owning stream
    pub fn index(&self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for ShardId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "shardId-{:012}", self.0)
    }
}

impl FromStr for ShardId {
    type Err = ();

    /// Accepts both the `shardId-000000000002` rendering and a bare
    /// decimal index.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s.strip_prefix("shardId-").unwrap_or(s);
        digits.parse::<u32>().map(ShardId).map_err(|_| ())
    }
}

/// Globally monotonic record identifier
///
/// Assigned from a single process-wide counter at append time.
/// Renders as a fixed-width zero-padded decimal so that lexicographic
/// string order equals numeric order. Serialized as the padded string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct SequenceNumber(pub u64);

impl SequenceNumber {
    /// Raw counter value
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for SequenceNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // 20 digits fits the full u64 range
        write!(f, "{:020}", self.0)
    }
}

impl From<SequenceNumber> for String {
    fn from(seq: SequenceNumber) -> Self {
        seq.to_string()
    }
}

impl TryFrom<String> for SequenceNumber {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl FromStr for SequenceNumber {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<u64>()
            .map(SequenceNumber)
            .map_err(|_| format!("invalid sequence number: {s:?}"))
    }
}

/// The inclusive slice `[start, end]` of the 128-bit hash keyspace
/// owned by one shard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HashKeyRange {
    /// Lowest hash key owned by the shard (inclusive)
    pub start: u128,
    /// Highest hash key owned by the shard (inclusive)
    pub end: u128,
}

impl HashKeyRange {
    /// Whether the range contains the given hash key (inclusive at
    /// both ends)
    pub fn contains(&self, hash_key: u128) -> bool {
        self.start <= hash_key && hash_key <= self.end
    }
}

/// Stream lifecycle status
///
/// Creation collapses synchronously into `Active` in this emulation,
/// but the field is still exposed so callers observe a valid status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum StreamStatus {
    /// Stream is being provisioned
    Creating,
    /// Stream accepts reads and writes
    Active,
    /// Stream is being torn down
    Deleting,
    /// Stream configuration is changing
    Updating,
}

impl fmt::Display for StreamStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            StreamStatus::Creating => "CREATING",
            StreamStatus::Active => "ACTIVE",
            StreamStatus::Deleting => "DELETING",
            StreamStatus::Updating => "UPDATING",
        };
        f.write_str(s)
    }
}

/// An immutable record appended to one shard's log
///
/// Records never move shards and are never rewritten.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    /// Opaque payload bytes, exactly as supplied by the producer
    pub data: Vec<u8>,
    /// Producer-supplied partition key
    pub partition_key: String,
    /// Globally monotonic sequence number assigned at append time
    pub sequence_number: SequenceNumber,
    /// Arrival timestamp assigned at append time
    pub arrival_timestamp: DateTime<Utc>,
}

/// Descriptor for one shard, as returned by describe/list operations
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Shard {
    /// Shard identity
    pub shard_id: ShardId,
    /// The hash-key slice the shard owns
    pub hash_key_range: HashKeyRange,
    /// First sequence number issued on the shard, if any record has
    /// been appended
    pub starting_sequence_number: Option<SequenceNumber>,
}

/// Stream metadata, as returned by describe/list operations
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamDescription {
    /// Stream name
    pub name: String,
    /// Unique id of this incarnation of the stream
    pub uid: StreamUid,
    /// Lifecycle status
    pub status: StreamStatus,
    /// Number of shards in the stream
    pub shard_count: u32,
    /// Retention window in hours
    pub retention_period_hours: u32,
    /// Creation timestamp
    pub creation_timestamp: DateTime<Utc>,
}

/// Where a new shard iterator starts reading
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShardIteratorType {
    /// Oldest available record
    TrimHorizon,
    /// Just past the newest record; only future appends are returned
    Latest,
    /// The record with exactly this sequence number
    AtSequenceNumber(SequenceNumber),
    /// The record just after this sequence number
    AfterSequenceNumber(SequenceNumber),
    /// The first record whose arrival time is at or after this instant
    AtTimestamp(DateTime<Utc>),
}
