//! Server-side Lua scripts — the only writers of shard state.
//!
//! Each operation must be a single atomic script, not a client-side
//! read-then-write: add must undo a stale tombstone in the same step it
//! inserts, and fetch must delete what it returns so a due task reaches
//! exactly one poller.

/// Tombstone TTL. Set when a shard's tombstone set gains its first
/// member; comfortably outlives the minute the shard spans.
pub const TOMBSTONE_TTL_SECS: u64 = 120;

/// KEYS: sorted set, tombstone set. ARGV: score, encoded task, task key.
///
/// Clears any tombstone left by an earlier cancellation of the same key,
/// then inserts the payload at its execution score.
pub const ADD_WITH_UNDELETE: &str = r#"
local zsetKey = KEYS[1]
local deleteSetKey = KEYS[2]
local score = ARGV[1]
local task = ARGV[2]
local taskKey = ARGV[3]
redis.call('srem', deleteSetKey, taskKey)
return redis.call('zadd', zsetKey, score, task)
"#;

/// KEYS: tombstone set. ARGV: task key.
///
/// Records a cancellation; the first member arms the 120 s expiry so
/// abandoned shards clean themselves up. Returns the new cardinality.
pub const MARK_DELETED: &str = r#"
local deleteSetKey = KEYS[1]
local taskKey = ARGV[1]
redis.call('sadd', deleteSetKey, taskKey)
local scnt = redis.call('scard', deleteSetKey)
if (tonumber(scnt) == 1)
then
    redis.call('expire', deleteSetKey, 120)
end
return scnt
"#;

/// KEYS: sorted set, tombstone set. ARGV: score window low, high.
///
/// Destructive fetch: returns the tombstone members followed by every
/// payload in the score window, and deletes that window from the sorted
/// set in the same atomic step — at-most-once hand-off across pollers.
pub const FETCH_AND_REAP: &str = r#"
local zsetKey = KEYS[1]
local deleteSetKey = KEYS[2]
local score1 = ARGV[1]
local score2 = ARGV[2]
local deleteSet = redis.call('smembers', deleteSetKey)
local targets = redis.call('zrange', zsetKey, score1, score2, 'byscore')
redis.call('zremrangebyscore', zsetKey, score1, score2)
local reply = {}
reply[1] = deleteSet
for i, v in ipairs(targets) do
    reply[#reply+1] = v
end
return reply
"#;

#[cfg(test)]
mod tests {
    use super::*;

    // The delete must live inside the same script as the range read, and
    // over the same window — that pairing is the exactly-once guarantee.
    #[test]
    fn fetch_reads_and_deletes_the_same_window() {
        assert!(FETCH_AND_REAP.contains("zrange"));
        assert!(FETCH_AND_REAP.contains("zremrangebyscore"));
        assert!(FETCH_AND_REAP.contains("'byscore'"));
    }

    #[test]
    fn mark_deleted_arms_ttl_once() {
        assert!(MARK_DELETED.contains(&format!("expire', deleteSetKey, {TOMBSTONE_TTL_SECS}")));
        assert!(MARK_DELETED.contains("== 1"));
    }
}
