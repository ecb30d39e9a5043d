//! StreamService: the request/response boundary
//!
//! One method per operation of the external contract. The transport
//! collaborator that frames HTTP/JSON around these calls is out of
//! scope; this surface takes and returns plain values, and iterator
//! tokens cross it as stable, round-trippable strings.

use crate::iterator::IteratorManager;
use crate::registry::{StreamEntry, StreamRegistry};
use chrono::Utc;
use rivulet_core::{
    Error, Record, Result, SequenceNumber, Shard, ShardId, ShardIteratorType, StreamDescription,
    StreamLimits,
};
use rivulet_storage::{hash_partition_key, parse_explicit_hash_key, route, SequenceGenerator};
use std::sync::Arc;
use tracing::debug;

/// One entry of a `put_records` batch
#[derive(Debug, Clone)]
pub struct PutRecordsEntry {
    /// Opaque payload bytes
    pub data: Vec<u8>,
    /// Partition key routing this entry
    pub partition_key: String,
    /// Optional hash-key override, a decimal in `[0, 2^128 - 1]`
    pub explicit_hash_key: Option<String>,
}

/// Independent outcome of one `put_records` entry
///
/// A failed entry never aborts or rolls back its neighbours.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PutRecordsResult {
    /// The entry was appended
    Success {
        /// Shard that received the record
        shard_id: ShardId,
        /// Sequence number assigned to the record
        sequence_number: SequenceNumber,
    },
    /// The entry was rejected
    Failure {
        /// Stable error code (see `Error::code`)
        error_code: String,
        /// Human-readable reason
        error_message: String,
    },
}

impl PutRecordsResult {
    /// Whether this entry failed
    pub fn is_failure(&self) -> bool {
        matches!(self, PutRecordsResult::Failure { .. })
    }
}

/// Result of a `put_records` call
#[derive(Debug, Clone)]
pub struct PutRecordsOutput {
    /// Per-entry outcomes, in input order
    pub results: Vec<PutRecordsResult>,
    /// Number of failed entries
    pub failed_record_count: usize,
}

/// Result of a `describe_stream` call
#[derive(Debug, Clone)]
pub struct DescribeStreamOutput {
    /// Stream metadata
    pub stream: StreamDescription,
    /// Shard page, sorted by shard id
    pub shards: Vec<Shard>,
    /// Whether shards beyond this page remain
    pub has_more_shards: bool,
}

/// Result of a `list_shards` call
#[derive(Debug, Clone)]
pub struct ListShardsOutput {
    /// Shard page, sorted by shard id
    pub shards: Vec<Shard>,
    /// Pagination token (the last shard id) when more remain
    pub next_token: Option<String>,
}

/// Result of a `list_streams` call
#[derive(Debug, Clone)]
pub struct ListStreamsOutput {
    /// Stream names, sorted lexicographically
    pub stream_names: Vec<String>,
    /// Whether names beyond this page remain
    pub has_more_streams: bool,
}

/// Result of a `get_records` call
#[derive(Debug, Clone)]
pub struct GetRecordsOutput {
    /// Records read from the shard, in append order
    pub records: Vec<Record>,
    /// Fresh continuation token at the post-read position
    pub next_shard_iterator: String,
    /// How far the returned page lags the shard tip, in milliseconds;
    /// zero when caught up
    pub millis_behind_latest: u64,
}

/// In-memory emulation of a partitioned, append-only data stream
///
/// Owns the stream registry, the iterator table, and the global
/// sequence counter. Construct one instance and share it by
/// reference; there are no process-level singletons.
///
/// # Example
///
/// ```
/// use rivulet_engine::StreamService;
/// use rivulet_core::ShardIteratorType;
///
/// let svc = StreamService::new();
/// svc.create_stream("orders", Some(2)).unwrap();
/// let (shard_id, seq) = svc
///     .put_record("orders", b"hello".to_vec(), "user-1", None)
///     .unwrap();
/// let token = svc
///     .get_shard_iterator("orders", &shard_id.to_string(), ShardIteratorType::TrimHorizon)
///     .unwrap();
/// let page = svc.get_records(&token, None).unwrap();
/// assert_eq!(page.records[0].sequence_number, seq);
/// ```
pub struct StreamService {
    registry: StreamRegistry,
    iterators: IteratorManager,
    sequencer: SequenceGenerator,
    limits: StreamLimits,
}

impl Default for StreamService {
    fn default() -> Self {
        Self::new()
    }
}

impl StreamService {
    /// Create a service with default limits
    pub fn new() -> Self {
        Self::with_limits(StreamLimits::default())
    }

    /// Create a service with custom limits
    pub fn with_limits(limits: StreamLimits) -> Self {
        StreamService {
            registry: StreamRegistry::new(),
            iterators: IteratorManager::new(limits.iterator_ttl),
            sequencer: SequenceGenerator::new(),
            limits,
        }
    }

    // ========== Stream lifecycle ==========

    /// Create a stream; the shard count defaults from the limits
    ///
    /// # Errors
    ///
    /// `ResourceInUse` if the name is taken, `InvalidArgument` on a
    /// bad name or shard count.
    pub fn create_stream(&self, name: &str, shard_count: Option<u32>) -> Result<()> {
        let count = shard_count.unwrap_or(self.limits.default_shard_count);
        self.registry.create(name, count, &self.limits)?;
        Ok(())
    }

    /// Delete a stream, its shard logs, and its outstanding iterators
    ///
    /// Stale tokens subsequently fail `InvalidArgument`, not
    /// `ExpiredIterator`: they reference a resource that no longer
    /// exists.
    ///
    /// # Errors
    ///
    /// `ResourceNotFound` if the stream is absent.
    pub fn delete_stream(&self, name: &str) -> Result<()> {
        let entry = self.registry.remove(name)?;
        self.iterators.invalidate_stream(entry.uid);
        Ok(())
    }

    /// Describe a stream: metadata plus a page of shards
    ///
    /// Shards are sorted by shard id; the page starts just after
    /// `exclusive_start_shard_id` and holds at most `limit` entries.
    pub fn describe_stream(
        &self,
        name: &str,
        limit: Option<usize>,
        exclusive_start_shard_id: Option<&str>,
    ) -> Result<DescribeStreamOutput> {
        let entry = self.registry.get(name)?;
        let limit = limit.unwrap_or(self.limits.default_page_limit);
        let (shards, has_more) =
            Self::shard_page(&entry, limit, exclusive_start_shard_id)?;
        Ok(DescribeStreamOutput {
            stream: entry.description(),
            shards,
            has_more_shards: has_more,
        })
    }

    /// List a stream's shards with a continuation token
    pub fn list_shards(&self, name: &str, max_results: Option<usize>) -> Result<ListShardsOutput> {
        let entry = self.registry.get(name)?;
        let limit = max_results.unwrap_or(self.limits.default_page_limit);
        let (shards, has_more) = Self::shard_page(&entry, limit, None)?;
        let next_token = if has_more {
            shards.last().map(|s| s.shard_id.to_string())
        } else {
            None
        };
        Ok(ListShardsOutput { shards, next_token })
    }

    /// List stream names, sorted, with exclusive-start pagination
    pub fn list_streams(
        &self,
        exclusive_start_name: Option<&str>,
        limit: Option<usize>,
    ) -> Result<ListStreamsOutput> {
        let limit = limit.unwrap_or(self.limits.default_page_limit);
        let (stream_names, has_more_streams) =
            self.registry.list_names(exclusive_start_name, limit);
        Ok(ListStreamsOutput {
            stream_names,
            has_more_streams,
        })
    }

    // ========== Producers ==========

    /// Append one record, routed by partition key (or the explicit
    /// hash key when present)
    ///
    /// Returns the owning shard and the assigned sequence number.
    ///
    /// # Errors
    ///
    /// `ResourceNotFound` if the stream is absent; `InvalidArgument`
    /// on an empty partition key, oversized payload, or unparseable
    /// explicit hash key.
    pub fn put_record(
        &self,
        stream: &str,
        data: Vec<u8>,
        partition_key: &str,
        explicit_hash_key: Option<&str>,
    ) -> Result<(ShardId, SequenceNumber)> {
        let entry = self.registry.get(stream)?;
        self.append_routed(&entry, data, partition_key, explicit_hash_key)
    }

    /// Append a batch of records with independent per-entry outcomes
    ///
    /// The call fails wholesale only when the stream is absent.
    /// Otherwise every entry succeeds or fails on its own and the
    /// failed count is the sum of per-entry failures.
    pub fn put_records(
        &self,
        stream: &str,
        entries: Vec<PutRecordsEntry>,
    ) -> Result<PutRecordsOutput> {
        if entries.is_empty() {
            return Err(Error::InvalidArgument(
                "put_records requires at least one entry".to_string(),
            ));
        }
        let stream_entry = self.registry.get(stream)?;

        let mut results = Vec::with_capacity(entries.len());
        let mut failed_record_count = 0;
        for entry in entries {
            let outcome = self.append_routed(
                &stream_entry,
                entry.data,
                &entry.partition_key,
                entry.explicit_hash_key.as_deref(),
            );
            results.push(match outcome {
                Ok((shard_id, sequence_number)) => PutRecordsResult::Success {
                    shard_id,
                    sequence_number,
                },
                Err(err) => {
                    failed_record_count += 1;
                    PutRecordsResult::Failure {
                        error_code: err.code().to_string(),
                        error_message: err.to_string(),
                    }
                }
            });
        }
        debug!(
            stream = %stream,
            total = results.len(),
            failed = failed_record_count,
            "put_records batch applied"
        );
        Ok(PutRecordsOutput {
            results,
            failed_record_count,
        })
    }

    // ========== Consumers ==========

    /// Issue an opaque iterator token for a shard
    ///
    /// # Errors
    ///
    /// `ResourceNotFound` for a missing stream or shard;
    /// `InvalidArgument` for a malformed shard id or a starting
    /// sequence number absent from the shard.
    pub fn get_shard_iterator(
        &self,
        stream: &str,
        shard_id: &str,
        iterator_type: ShardIteratorType,
    ) -> Result<String> {
        let entry = self.registry.get(stream)?;
        let shard_id: ShardId = shard_id
            .parse()
            .map_err(|_| Error::InvalidArgument(format!("malformed shard id: {shard_id:?}")))?;
        let log = entry.shard(shard_id)?;

        let position = match iterator_type {
            ShardIteratorType::TrimHorizon => 0,
            ShardIteratorType::Latest => log.len(),
            ShardIteratorType::AtSequenceNumber(seq) => log.position_of(seq).ok_or_else(|| {
                Error::InvalidArgument(format!(
                    "sequence number {seq} not found on shard {shard_id}"
                ))
            })?,
            ShardIteratorType::AfterSequenceNumber(seq) => {
                log.position_of(seq).ok_or_else(|| {
                    Error::InvalidArgument(format!(
                        "sequence number {seq} not found on shard {shard_id}"
                    ))
                })? + 1
            }
            ShardIteratorType::AtTimestamp(at) => log.position_at_timestamp(at),
        };

        Ok(self
            .iterators
            .issue(entry.name.clone(), entry.uid, shard_id, position))
    }

    /// Resolve an iterator token: read a page and mint the successor
    ///
    /// The consumed token becomes invalid immediately, whether or not
    /// it had expired. An empty page with a fresh token is the
    /// caught-up case; polling is the expected consumer pattern and
    /// this call never blocks.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` for an unknown/consumed token, a token over a
    /// deleted stream, or a zero limit; `ExpiredIterator` for a token
    /// past its TTL.
    pub fn get_records(&self, token: &str, limit: Option<usize>) -> Result<GetRecordsOutput> {
        let max = match limit {
            Some(0) => {
                return Err(Error::InvalidArgument(
                    "limit must be at least 1".to_string(),
                ))
            }
            Some(n) => n.min(self.limits.max_records_per_read),
            None => self.limits.max_records_per_read,
        };

        // Resolve before sweeping: an expired token must be classified
        // as ExpiredIterator by `take`, not silently swept into the
        // unknown-token case.
        let state = self.iterators.take(token)?;
        self.iterators.sweep_expired();
        let entry = self
            .registry
            .get(&state.stream_name)
            .ok()
            .filter(|e| e.uid == state.stream_uid)
            .ok_or_else(|| {
                Error::InvalidArgument("shard iterator references a deleted stream".to_string())
            })?;
        let log = entry.shard(state.shard_id)?;

        let (records, next_position) = log.read_range(state.position, max);
        let millis_behind_latest = if next_position >= log.len() {
            0
        } else {
            records
                .last()
                .map(|r| {
                    (Utc::now() - r.arrival_timestamp)
                        .num_milliseconds()
                        .max(0) as u64
                })
                .unwrap_or(0)
        };

        let next_shard_iterator = self.iterators.issue(
            state.stream_name,
            state.stream_uid,
            state.shard_id,
            next_position,
        );

        Ok(GetRecordsOutput {
            records,
            next_shard_iterator,
            millis_behind_latest,
        })
    }

    // ========== Internals ==========

    /// Route and append one record to its owning shard
    fn append_routed(
        &self,
        entry: &Arc<StreamEntry>,
        data: Vec<u8>,
        partition_key: &str,
        explicit_hash_key: Option<&str>,
    ) -> Result<(ShardId, SequenceNumber)> {
        if partition_key.is_empty() {
            return Err(Error::InvalidArgument(
                "partition key must not be empty".to_string(),
            ));
        }
        if data.len() > self.limits.max_record_data_bytes {
            return Err(Error::InvalidArgument(format!(
                "record payload of {} bytes exceeds the limit of {}",
                data.len(),
                self.limits.max_record_data_bytes
            )));
        }

        let hash_key = match explicit_hash_key {
            Some(ehk) => parse_explicit_hash_key(ehk)?,
            None => hash_partition_key(partition_key),
        };
        let index = route(hash_key, &entry.ranges)?;
        let record = entry.shards[index].append(data, partition_key.to_string(), &self.sequencer);
        Ok((ShardId(index as u32), record.sequence_number))
    }

    /// A sorted page of shard descriptors after an exclusive start id
    fn shard_page(
        entry: &Arc<StreamEntry>,
        limit: usize,
        exclusive_start_shard_id: Option<&str>,
    ) -> Result<(Vec<Shard>, bool)> {
        let mut shards = entry.shard_descriptors();
        if let Some(start) = exclusive_start_shard_id {
            let start: ShardId = start.parse().map_err(|_| {
                Error::InvalidArgument(format!("malformed exclusive start shard id: {start:?}"))
            })?;
            shards.retain(|s| s.shard_id > start);
        }
        let has_more = shards.len() > limit;
        shards.truncate(limit);
        Ok((shards, has_more))
    }
}
