//! Keyspace partitioner
//!
//! Deterministically divides the 128-bit hash keyspace
//! `[0, 2^128 - 1]` into N contiguous, non-overlapping ranges whose
//! union is exactly the full keyspace. Computed once at stream
//! creation; ranges never change afterwards (no re-sharding).

use rivulet_core::{Error, HashKeyRange, Result};

/// Width of each shard's slice: `floor(2^128 / n)`.
///
/// `2^128` itself overflows `u128`, so it is computed from
/// `u128::MAX = 2^128 - 1`: the quotient differs from
/// `u128::MAX / n` only when `n` divides `2^128` exactly, i.e. when
/// the remainder of the `u128::MAX` division is `n - 1`. For `n = 1`
/// the true width `2^128` is unrepresentable; the single shard covers
/// the whole keyspace and the width is never multiplied, so
/// `u128::MAX` stands in without affecting any boundary.
fn shard_width(n: u128) -> u128 {
    if n == 1 {
        return u128::MAX;
    }
    let q = u128::MAX / n;
    if u128::MAX % n == n - 1 {
        q + 1
    } else {
        q
    }
}

/// Compute the hash-key ranges for a stream with `shard_count` shards
///
/// Shard `i < n-1` gets `[i*width, (i+1)*width - 1]`; the final shard
/// ends at exactly `u128::MAX`, absorbing the integer-division
/// remainder so the union has no gap.
///
/// # Errors
///
/// Returns `InvalidArgument` when `shard_count` is zero.
pub fn hash_key_ranges(shard_count: u32) -> Result<Vec<HashKeyRange>> {
    if shard_count == 0 {
        return Err(Error::InvalidArgument(
            "shard count must be at least 1".to_string(),
        ));
    }

    let n = shard_count as u128;
    let width = shard_width(n);

    let mut ranges = Vec::with_capacity(shard_count as usize);
    for i in 0..n {
        let start = i * width;
        let end = if i == n - 1 {
            u128::MAX
        } else {
            (i + 1) * width - 1
        };
        ranges.push(HashKeyRange { start, end });
    }
    Ok(ranges)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_zero_shards_rejected() {
        assert!(matches!(
            hash_key_ranges(0),
            Err(Error::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_single_shard_owns_whole_keyspace() {
        let ranges = hash_key_ranges(1).unwrap();
        assert_eq!(ranges.len(), 1);
        assert_eq!(ranges[0].start, 0);
        assert_eq!(ranges[0].end, u128::MAX);
    }

    #[test]
    fn test_power_of_two_split_is_exact() {
        let ranges = hash_key_ranges(2).unwrap();
        assert_eq!(ranges[0].start, 0);
        assert_eq!(ranges[0].end, (1u128 << 127) - 1);
        assert_eq!(ranges[1].start, 1u128 << 127);
        assert_eq!(ranges[1].end, u128::MAX);
    }

    #[test]
    fn test_three_shards_no_gap_from_rounding() {
        let ranges = hash_key_ranges(3).unwrap();
        assert_eq!(ranges.len(), 3);
        assert_eq!(ranges[0].start, 0);
        // Last shard absorbs the remainder exactly
        assert_eq!(ranges[2].end, u128::MAX);
        for pair in ranges.windows(2) {
            assert_eq!(pair[1].start, pair[0].end + 1);
        }
    }

    #[test]
    fn test_boundaries_increase_with_shard_index() {
        let ranges = hash_key_ranges(7).unwrap();
        for pair in ranges.windows(2) {
            assert!(pair[0].start < pair[1].start);
            assert!(pair[0].end < pair[1].end);
        }
    }

    proptest! {
        /// Ranges are sorted, contiguous, start at 0, end at
        /// 2^128 - 1, and are pairwise disjoint for any shard count.
        #[test]
        fn prop_ranges_cover_keyspace(n in 1u32..=4096) {
            let ranges = hash_key_ranges(n).unwrap();
            prop_assert_eq!(ranges.len(), n as usize);
            prop_assert_eq!(ranges[0].start, 0);
            prop_assert_eq!(ranges[ranges.len() - 1].end, u128::MAX);
            for pair in ranges.windows(2) {
                prop_assert!(pair[0].end < pair[1].start);
                prop_assert_eq!(pair[1].start, pair[0].end + 1);
            }
            for r in &ranges {
                prop_assert!(r.start <= r.end);
            }
        }
    }
}
