//! Iterator manager
//!
//! Issues, resolves, and expires the opaque cursors consumers use to
//! read a shard. A token is a random id into an internal table, so
//! the position is never parseable from the token itself. It is also
//! single-use: resolving it consumes it and a replacement is minted at
//! the post-read position. Tokens carry the stream uid so cursors over
//! a deleted (or deleted-and-recreated) stream can never resolve.

use dashmap::DashMap;
use rivulet_core::{Error, Result, ShardId, StreamUid};
use std::time::{Duration, Instant};
use tracing::debug;
use uuid::Uuid;

/// Everything a token resolves to
#[derive(Debug, Clone)]
pub(crate) struct IteratorState {
    pub(crate) stream_name: String,
    pub(crate) stream_uid: StreamUid,
    pub(crate) shard_id: ShardId,
    pub(crate) position: usize,
    expires_at: Instant,
}

impl IteratorState {
    fn is_expired(&self, now: Instant) -> bool {
        now >= self.expires_at
    }
}

/// Issues and resolves shard iterator tokens with a fixed TTL
pub(crate) struct IteratorManager {
    tokens: DashMap<String, IteratorState>,
    ttl: Duration,
}

impl IteratorManager {
    pub(crate) fn new(ttl: Duration) -> Self {
        IteratorManager {
            tokens: DashMap::new(),
            ttl,
        }
    }

    /// Mint a token for the given position
    pub(crate) fn issue(
        &self,
        stream_name: String,
        stream_uid: StreamUid,
        shard_id: ShardId,
        position: usize,
    ) -> String {
        let token = Uuid::new_v4().simple().to_string();
        self.tokens.insert(
            token.clone(),
            IteratorState {
                stream_name,
                stream_uid,
                shard_id,
                position,
                expires_at: Instant::now() + self.ttl,
            },
        );
        token
    }

    /// Consume a token, returning its state
    ///
    /// The token is removed whether it was live or expired: a token is
    /// single-use, and an expired one is dead either way.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` for an unknown (or already consumed) token,
    /// `ExpiredIterator` for one past its TTL.
    pub(crate) fn take(&self, token: &str) -> Result<IteratorState> {
        let (_, state) = self
            .tokens
            .remove(token)
            .ok_or_else(|| Error::InvalidArgument("unknown shard iterator".to_string()))?;
        if state.is_expired(Instant::now()) {
            return Err(Error::ExpiredIterator);
        }
        Ok(state)
    }

    /// Drop every token issued against the given stream incarnation
    pub(crate) fn invalidate_stream(&self, stream_uid: StreamUid) {
        self.tokens.retain(|_, state| state.stream_uid != stream_uid);
    }

    /// Drop tokens past their TTL
    ///
    /// Consumers that stop polling leave tokens behind; this keeps the
    /// table from growing without bound.
    pub(crate) fn sweep_expired(&self) {
        let now = Instant::now();
        let before = self.tokens.len();
        self.tokens.retain(|_, state| !state.is_expired(now));
        let swept = before - self.tokens.len();
        if swept > 0 {
            debug!(swept, "expired shard iterators dropped");
        }
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.tokens.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manager(ttl: Duration) -> (IteratorManager, StreamUid) {
        (IteratorManager::new(ttl), StreamUid::new())
    }

    #[test]
    fn test_issue_and_take_round_trip() {
        let (mgr, uid) = manager(Duration::from_secs(300));
        let token = mgr.issue("orders".to_string(), uid, ShardId(1), 7);

        let state = mgr.take(&token).unwrap();
        assert_eq!(state.stream_name, "orders");
        assert_eq!(state.stream_uid, uid);
        assert_eq!(state.shard_id, ShardId(1));
        assert_eq!(state.position, 7);
    }

    #[test]
    fn test_token_is_single_use() {
        let (mgr, uid) = manager(Duration::from_secs(300));
        let token = mgr.issue("orders".to_string(), uid, ShardId(0), 0);

        mgr.take(&token).unwrap();
        assert!(matches!(
            mgr.take(&token),
            Err(Error::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_unknown_token_is_invalid_argument() {
        let (mgr, _) = manager(Duration::from_secs(300));
        assert!(matches!(
            mgr.take("no-such-token"),
            Err(Error::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_expired_token_fails_expired_iterator() {
        let (mgr, uid) = manager(Duration::ZERO);
        let token = mgr.issue("orders".to_string(), uid, ShardId(0), 0);
        std::thread::sleep(Duration::from_millis(2));
        assert!(matches!(mgr.take(&token), Err(Error::ExpiredIterator)));
        // Consumed by the failed resolution
        assert!(matches!(
            mgr.take(&token),
            Err(Error::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_invalidate_stream_drops_only_that_stream() {
        let (mgr, uid_a) = manager(Duration::from_secs(300));
        let uid_b = StreamUid::new();
        let token_a = mgr.issue("a".to_string(), uid_a, ShardId(0), 0);
        let token_b = mgr.issue("b".to_string(), uid_b, ShardId(0), 0);

        mgr.invalidate_stream(uid_a);
        assert!(matches!(
            mgr.take(&token_a),
            Err(Error::InvalidArgument(_))
        ));
        assert!(mgr.take(&token_b).is_ok());
    }

    #[test]
    fn test_sweep_drops_expired_only() {
        let (mgr, uid) = manager(Duration::ZERO);
        mgr.issue("a".to_string(), uid, ShardId(0), 0);
        mgr.issue("a".to_string(), uid, ShardId(0), 1);

        let live = IteratorManager::new(Duration::from_secs(300));
        let token = live.issue("b".to_string(), uid, ShardId(0), 0);

        std::thread::sleep(Duration::from_millis(2));
        mgr.sweep_expired();
        live.sweep_expired();

        assert_eq!(mgr.len(), 0);
        assert_eq!(live.len(), 1);
        assert!(live.take(&token).is_ok());
    }

    #[test]
    fn test_tokens_are_opaque_and_distinct() {
        let (mgr, uid) = manager(Duration::from_secs(300));
        let t1 = mgr.issue("a".to_string(), uid, ShardId(0), 42);
        let t2 = mgr.issue("a".to_string(), uid, ShardId(0), 42);
        assert_ne!(t1, t2);
        // Token text is a bare id, nothing positional to parse
        assert_eq!(t1.len(), 32);
        assert!(t1.chars().all(|c| c.is_ascii_hexdigit()));
    }
}
