//! Per-shard append log and global sequence generator
//!
//! Each shard owns one `ShardLog`: an ordered, append-only list of
//! records behind its own lock, so appends to one shard never block
//! another. Sequence numbers come from a single `SequenceGenerator`
//! per storage instance, an atomic counter independent of any lock.
//! Numbers observed within a shard are strictly increasing but not
//! necessarily contiguous when shards interleave writes. Callers must
//! not assume per-shard contiguity.

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use rivulet_core::{Record, SequenceNumber};
use std::sync::atomic::{AtomicU64, Ordering};

/// Process-wide monotonic sequence counter
///
/// One per storage instance, shared by every shard of every stream.
/// Strictly increasing, never reused; survives shard deletion.
#[derive(Debug)]
pub struct SequenceGenerator {
    next: AtomicU64,
}

impl Default for SequenceGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl SequenceGenerator {
    /// Create a generator starting at sequence 1
    pub fn new() -> Self {
        SequenceGenerator {
            next: AtomicU64::new(1),
        }
    }

    /// Atomically claim the next sequence number
    pub fn next(&self) -> SequenceNumber {
        SequenceNumber(self.next.fetch_add(1, Ordering::SeqCst))
    }
}

/// Ordered record storage for one shard
///
/// Appends are O(1) amortized; reads clone the requested window.
/// The lock is scoped to this shard alone.
#[derive(Debug, Default)]
pub struct ShardLog {
    records: RwLock<Vec<Record>>,
}

impl ShardLog {
    /// Create an empty shard log
    pub fn new() -> Self {
        ShardLog {
            records: RwLock::new(Vec::new()),
        }
    }

    /// Append a record, claiming the next global sequence number
    ///
    /// The number is claimed while holding this shard's write lock so
    /// that append order and sequence order can never diverge within
    /// a shard. The arrival timestamp is assigned here. Returns the
    /// stored record.
    pub fn append(
        &self,
        data: Vec<u8>,
        partition_key: String,
        sequencer: &SequenceGenerator,
    ) -> Record {
        let mut records = self.records.write();
        let record = Record {
            data,
            partition_key,
            sequence_number: sequencer.next(),
            arrival_timestamp: Utc::now(),
        };
        records.push(record.clone());
        record
    }

    /// Read the half-open window `[from, from + max)` of the log,
    /// clamped to the log length
    ///
    /// Returns the records plus the index just past the returned
    /// slice.
    pub fn read_range(&self, from: usize, max: usize) -> (Vec<Record>, usize) {
        let records = self.records.read();
        let start = from.min(records.len());
        let end = start.saturating_add(max).min(records.len());
        (records[start..end].to_vec(), end)
    }

    /// Number of records in the log
    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    /// Whether the log has no records
    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }

    /// First sequence number issued on this shard, if any
    pub fn first_sequence_number(&self) -> Option<SequenceNumber> {
        self.records.read().first().map(|r| r.sequence_number)
    }

    /// Index of the record with exactly this sequence number
    ///
    /// Records are stored in ascending sequence order, so this is a
    /// binary search.
    pub fn position_of(&self, sequence_number: SequenceNumber) -> Option<usize> {
        self.records
            .read()
            .binary_search_by_key(&sequence_number, |r| r.sequence_number)
            .ok()
    }

    /// Index of the first record whose arrival time is at or after
    /// the given instant
    ///
    /// Returns the log length when every record is older, which reads
    /// as "only future appends".
    pub fn position_at_timestamp(&self, at: DateTime<Utc>) -> usize {
        let records = self.records.read();
        records.partition_point(|r| r.arrival_timestamp < at)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn append_n(log: &ShardLog, gen: &SequenceGenerator, n: usize) {
        for i in 0..n {
            log.append(format!("payload-{i}").into_bytes(), format!("pk-{i}"), gen);
        }
    }

    #[test]
    fn test_sequence_generator_is_strictly_increasing() {
        let gen = SequenceGenerator::new();
        let a = gen.next();
        let b = gen.next();
        let c = gen.next();
        assert!(a < b && b < c);
    }

    #[test]
    fn test_append_preserves_order() {
        let gen = SequenceGenerator::new();
        let log = ShardLog::new();
        append_n(&log, &gen, 5);

        let (records, next) = log.read_range(0, 10);
        assert_eq!(records.len(), 5);
        assert_eq!(next, 5);
        for pair in records.windows(2) {
            assert!(pair[0].sequence_number < pair[1].sequence_number);
        }
        assert_eq!(records[0].data, b"payload-0");
        assert_eq!(records[0].partition_key, "pk-0");
    }

    #[test]
    fn test_read_range_clamps_to_length() {
        let gen = SequenceGenerator::new();
        let log = ShardLog::new();
        append_n(&log, &gen, 3);

        let (records, next) = log.read_range(1, 100);
        assert_eq!(records.len(), 2);
        assert_eq!(next, 3);

        // From past the end: empty window at the tail
        let (records, next) = log.read_range(50, 10);
        assert!(records.is_empty());
        assert_eq!(next, 3);
    }

    #[test]
    fn test_read_range_window() {
        let gen = SequenceGenerator::new();
        let log = ShardLog::new();
        append_n(&log, &gen, 10);

        let (records, next) = log.read_range(2, 3);
        assert_eq!(records.len(), 3);
        assert_eq!(next, 5);
        assert_eq!(records[0].partition_key, "pk-2");
        assert_eq!(records[2].partition_key, "pk-4");
    }

    #[test]
    fn test_interleaved_shards_are_not_contiguous() {
        let gen = SequenceGenerator::new();
        let a = ShardLog::new();
        let b = ShardLog::new();

        a.append(vec![1], "k".into(), &gen);
        b.append(vec![2], "k".into(), &gen);
        a.append(vec![3], "k".into(), &gen);

        let (records, _) = a.read_range(0, 10);
        assert_eq!(records.len(), 2);
        // Strictly increasing within the shard, with a gap where the
        // other shard claimed a number
        assert!(records[0].sequence_number < records[1].sequence_number);
        assert_eq!(
            records[1].sequence_number.value() - records[0].sequence_number.value(),
            2
        );
    }

    #[test]
    fn test_position_of_sequence_number() {
        let gen = SequenceGenerator::new();
        let log = ShardLog::new();
        append_n(&log, &gen, 4);

        let (records, _) = log.read_range(0, 10);
        let target = records[2].sequence_number;
        assert_eq!(log.position_of(target), Some(2));
        assert_eq!(log.position_of(SequenceNumber(999_999)), None);
    }

    #[test]
    fn test_position_at_timestamp() {
        let gen = SequenceGenerator::new();
        let log = ShardLog::new();
        append_n(&log, &gen, 3);

        let (records, _) = log.read_range(0, 10);
        // At or before the first arrival: everything
        assert_eq!(log.position_at_timestamp(records[0].arrival_timestamp), 0);
        // After the last arrival: only future appends
        let after = records[2].arrival_timestamp + chrono::Duration::seconds(1);
        assert_eq!(log.position_at_timestamp(after), 3);
    }

    #[test]
    fn test_first_sequence_number() {
        let gen = SequenceGenerator::new();
        let log = ShardLog::new();
        assert_eq!(log.first_sequence_number(), None);
        assert!(log.is_empty());

        let stored = log.append(vec![0], "k".into(), &gen);
        assert_eq!(log.first_sequence_number(), Some(stored.sequence_number));
        assert_eq!(log.len(), 1);
    }
}
