//! Stream registry
//!
//! Owns stream lifecycle (create/describe/list/delete) and the live
//! stream table. The table is a `DashMap` keyed by stream name, so
//! operations on independent streams never contend; each entry holds
//! its shard logs, which carry their own per-shard locks.

use chrono::{DateTime, Utc};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use parking_lot::RwLock;
use rivulet_core::{
    Error, HashKeyRange, Result, Shard, ShardId, StreamDescription, StreamLimits, StreamStatus,
    StreamUid,
};
use rivulet_storage::{hash_key_ranges, ShardLog};
use std::sync::Arc;
use tracing::info;

/// One live stream: identity, status, shard ranges, and shard logs
///
/// Ranges and shard count are fixed at creation (no re-sharding);
/// only the status field mutates.
pub(crate) struct StreamEntry {
    pub(crate) name: String,
    pub(crate) uid: StreamUid,
    status: RwLock<StreamStatus>,
    pub(crate) ranges: Vec<HashKeyRange>,
    pub(crate) shards: Vec<ShardLog>,
    retention_period_hours: u32,
    creation_timestamp: DateTime<Utc>,
}

impl StreamEntry {
    fn new(name: String, ranges: Vec<HashKeyRange>, retention_period_hours: u32) -> Self {
        let shards = ranges.iter().map(|_| ShardLog::new()).collect();
        StreamEntry {
            name,
            uid: StreamUid::new(),
            status: RwLock::new(StreamStatus::Active),
            ranges,
            shards,
            retention_period_hours,
            creation_timestamp: Utc::now(),
        }
    }

    pub(crate) fn status(&self) -> StreamStatus {
        *self.status.read()
    }

    fn set_status(&self, status: StreamStatus) {
        *self.status.write() = status;
    }

    /// Resolve a shard id to its log, or fail `ResourceNotFound`
    pub(crate) fn shard(&self, shard_id: ShardId) -> Result<&ShardLog> {
        self.shards
            .get(shard_id.index())
            .ok_or_else(|| Error::shard_not_found(format!("{}/{}", self.name, shard_id)))
    }

    /// Stream metadata snapshot
    pub(crate) fn description(&self) -> StreamDescription {
        StreamDescription {
            name: self.name.clone(),
            uid: self.uid,
            status: self.status(),
            shard_count: self.shards.len() as u32,
            retention_period_hours: self.retention_period_hours,
            creation_timestamp: self.creation_timestamp,
        }
    }

    /// Descriptor for one shard; the starting sequence number is read
    /// from the log on demand
    pub(crate) fn shard_descriptor(&self, index: usize) -> Shard {
        Shard {
            shard_id: ShardId(index as u32),
            hash_key_range: self.ranges[index],
            starting_sequence_number: self.shards[index].first_sequence_number(),
        }
    }

    /// All shard descriptors, sorted by shard id
    pub(crate) fn shard_descriptors(&self) -> Vec<Shard> {
        (0..self.shards.len())
            .map(|i| self.shard_descriptor(i))
            .collect()
    }

}

/// Owns the stream table and stream lifecycle
pub(crate) struct StreamRegistry {
    streams: DashMap<String, Arc<StreamEntry>>,
}

impl StreamRegistry {
    pub(crate) fn new() -> Self {
        StreamRegistry {
            streams: DashMap::new(),
        }
    }

    /// Create a stream with the given shard count
    ///
    /// Fails `ResourceInUse` when the name is taken and
    /// `InvalidArgument` on a zero or over-limit shard count. The
    /// stream is active synchronously; there is no provisioning
    /// delay in this emulation.
    pub(crate) fn create(
        &self,
        name: &str,
        shard_count: u32,
        limits: &StreamLimits,
    ) -> Result<Arc<StreamEntry>> {
        if name.is_empty() {
            return Err(Error::InvalidArgument(
                "stream name must not be empty".to_string(),
            ));
        }
        if shard_count > limits.max_shards_per_stream {
            return Err(Error::InvalidArgument(format!(
                "shard count {} exceeds the limit of {}",
                shard_count, limits.max_shards_per_stream
            )));
        }
        let ranges = hash_key_ranges(shard_count)?;

        match self.streams.entry(name.to_string()) {
            Entry::Occupied(_) => Err(Error::ResourceInUse(name.to_string())),
            Entry::Vacant(slot) => {
                let entry = Arc::new(StreamEntry::new(
                    name.to_string(),
                    ranges,
                    limits.default_retention_hours,
                ));
                slot.insert(Arc::clone(&entry));
                info!(stream = %name, shards = shard_count, "stream created");
                Ok(entry)
            }
        }
    }

    /// Remove a stream, returning its entry so the caller can
    /// invalidate outstanding iterators
    pub(crate) fn remove(&self, name: &str) -> Result<Arc<StreamEntry>> {
        let (_, entry) = self
            .streams
            .remove(name)
            .ok_or_else(|| Error::stream_not_found(name))?;
        entry.set_status(StreamStatus::Deleting);
        info!(stream = %name, "stream deleted");
        Ok(entry)
    }

    /// Look up a live stream by name
    pub(crate) fn get(&self, name: &str) -> Result<Arc<StreamEntry>> {
        self.streams
            .get(name)
            .map(|e| Arc::clone(e.value()))
            .ok_or_else(|| Error::stream_not_found(name))
    }

    /// Stream names sorted lexicographically, paginated by exclusive
    /// start name
    ///
    /// Returns at most `limit` names starting just after
    /// `exclusive_start`, plus whether more remain.
    pub(crate) fn list_names(
        &self,
        exclusive_start: Option<&str>,
        limit: usize,
    ) -> (Vec<String>, bool) {
        let mut names: Vec<String> = self.streams.iter().map(|e| e.key().clone()).collect();
        names.sort();
        if let Some(start) = exclusive_start {
            names.retain(|n| n.as_str() > start);
        }
        let has_more = names.len() > limit;
        names.truncate(limit);
        (names, has_more)
    }
}
