//! Operational limits for streams and iterators
//!
//! This module defines the tunables enforced by the engine. Violations
//! result in `InvalidArgument` errors. Limits are injected at service
//! construction time; there is no global configuration.

use std::time::Duration;

/// Operational limits for a stream service instance
#[derive(Debug, Clone)]
pub struct StreamLimits {
    /// Shard count used when `CreateStream` omits one (default: 4)
    pub default_shard_count: u32,

    /// Maximum shards a single stream may be created with
    /// (default: 10,000)
    pub max_shards_per_stream: u32,

    /// Time-to-live of an issued shard iterator (default: 5 minutes)
    pub iterator_ttl: Duration,

    /// Maximum records returned by a single `GetRecords` call; also
    /// the default when no limit is given (default: 10,000)
    pub max_records_per_read: usize,

    /// Maximum payload size of a single record in bytes
    /// (default: 1 MiB)
    pub max_record_data_bytes: usize,

    /// Retention window recorded on new streams, in hours
    /// (default: 24)
    pub default_retention_hours: u32,

    /// Default page size for describe/list pagination (default: 100)
    pub default_page_limit: usize,
}

impl Default for StreamLimits {
    fn default() -> Self {
        StreamLimits {
            default_shard_count: 4,
            max_shards_per_stream: 10_000,
            iterator_ttl: Duration::from_secs(5 * 60),
            max_records_per_read: 10_000,
            max_record_data_bytes: 1024 * 1024, // 1 MiB
            default_retention_hours: 24,
            default_page_limit: 100,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_limits() {
        let limits = StreamLimits::default();
        assert_eq!(limits.default_shard_count, 4);
        assert_eq!(limits.iterator_ttl, Duration::from_secs(300));
        assert_eq!(limits.max_records_per_read, 10_000);
        assert_eq!(limits.default_retention_hours, 24);
    }
}
