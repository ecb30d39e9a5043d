//! Hash router
//!
//! Maps a partition key (or an explicit caller-supplied hash key,
//! which takes precedence) to the owning shard of a stream. The
//! partition key is digested with xxh3-128, a fast non-cryptographic
//! hash; the requirement here is uniform distribution over the
//! 128-bit keyspace, not collision resistance.

use rivulet_core::{Error, HashKeyRange, Result};
use xxhash_rust::xxh3::xxh3_128;

/// Digest a partition key into a 128-bit hash key
pub fn hash_partition_key(partition_key: &str) -> u128 {
    xxh3_128(partition_key.as_bytes())
}

/// Parse a caller-supplied explicit hash key
///
/// Every decimal that fits in `u128` is inside the keyspace, so an
/// out-of-range key is one that fails to parse (empty, non-numeric,
/// or at least 2^128).
///
/// # Errors
///
/// Returns `InvalidArgument` when the string is not a valid decimal
/// `u128`.
pub fn parse_explicit_hash_key(explicit_hash_key: &str) -> Result<u128> {
    explicit_hash_key.parse::<u128>().map_err(|_| {
        Error::InvalidArgument(format!(
            "explicit hash key {explicit_hash_key:?} is not a decimal in [0, 2^128 - 1]"
        ))
    })
}

/// Select the shard whose range contains the hash key
///
/// Exactly one shard matches for any key against ranges produced by
/// the partitioner. A miss can only happen against corrupt or custom
/// ranges and is reported rather than silently dropping data.
///
/// # Errors
///
/// Returns `InvalidArgument` when no range contains the key.
pub fn route(hash_key: u128, ranges: &[HashKeyRange]) -> Result<usize> {
    ranges
        .iter()
        .position(|r| r.contains(hash_key))
        .ok_or_else(|| {
            Error::InvalidArgument(format!(
                "hash key {hash_key} is outside every shard's hash key range"
            ))
        })
}
