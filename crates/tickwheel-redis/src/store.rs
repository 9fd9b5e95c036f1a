use chrono::{DateTime, Local};
use redis::aio::ConnectionManager;
use redis::Script;
use tracing::debug;

use tickwheel_core::time::minute_label;

use crate::error::{Error, Result};
use crate::script;

/// Sorted-set key of the minute-shard holding tasks due in `t`'s minute.
///
/// The `{…}` hash tag keeps a shard's sorted set and tombstone set on the
/// same cluster slot, which the scripts require (they touch both keys).
pub fn task_slice_key(t: DateTime<Local>) -> String {
    format!("xiaoxu_timewheel_task_{{{}}}", minute_label(t))
}

/// Tombstone-set key paired with [`task_slice_key`] for the same minute.
pub fn delete_set_key(t: DateTime<Local>) -> String {
    format!("xiaoxu_timewheel_delset_{{{}}}", minute_label(t))
}

/// Async Redis access for the wheel: a multiplexed, auto-reconnecting
/// connection plus the three prepared scripts.
///
/// Cheap to clone; clones share the underlying connection.
#[derive(Clone)]
pub struct Store {
    conn: ConnectionManager,
    add: Script,
    mark: Script,
    fetch: Script,
}

impl Store {
    /// Connect to `url` (e.g. `redis://127.0.0.1:6379`).
    pub async fn connect(url: &str) -> Result<Self> {
        let client = redis::Client::open(url)?;
        let conn = client.get_connection_manager().await?;
        Ok(Self::new(conn))
    }

    /// Wrap an existing connection.
    pub fn new(conn: ConnectionManager) -> Self {
        Self {
            conn,
            add: Script::new(script::ADD_WITH_UNDELETE),
            mark: Script::new(script::MARK_DELETED),
            fetch: Script::new(script::FETCH_AND_REAP),
        }
    }

    /// Insert `payload` at `score`, clearing any stale tombstone for
    /// `task_key` in the same atomic step.
    pub async fn add_with_undelete(
        &self,
        zset_key: &str,
        delete_set_key: &str,
        score: i64,
        payload: &str,
        task_key: &str,
    ) -> Result<i64> {
        let mut conn = self.conn.clone();
        let added: i64 = self
            .add
            .key(zset_key)
            .key(delete_set_key)
            .arg(score)
            .arg(payload)
            .arg(task_key)
            .invoke_async(&mut conn)
            .await?;
        debug!(zset_key, task_key, score, "task persisted");
        Ok(added)
    }

    /// Tombstone `task_key` in the shard's delete set. Always succeeds,
    /// whether or not a matching task exists. Returns the set cardinality.
    pub async fn mark_deleted(&self, delete_set_key: &str, task_key: &str) -> Result<i64> {
        let mut conn = self.conn.clone();
        let cardinality: i64 = self
            .mark
            .key(delete_set_key)
            .arg(task_key)
            .invoke_async(&mut conn)
            .await?;
        debug!(delete_set_key, task_key, cardinality, "task tombstoned");
        Ok(cardinality)
    }

    /// Atomically read-and-delete every payload scored in `[low, high]`,
    /// returning `(tombstoned keys, encoded payloads)`. A payload is
    /// observed by at most one caller, ever.
    pub async fn fetch_and_reap(
        &self,
        zset_key: &str,
        delete_set_key: &str,
        low: i64,
        high: i64,
    ) -> Result<(Vec<String>, Vec<String>)> {
        let mut conn = self.conn.clone();
        let reply: redis::Value = self
            .fetch
            .key(zset_key)
            .key(delete_set_key)
            .arg(low)
            .arg(high)
            .invoke_async(&mut conn)
            .await?;

        let redis::Value::Array(items) = reply else {
            return Err(Error::MalformedReply);
        };
        let mut items = items.into_iter();
        let Some(first) = items.next() else {
            return Err(Error::MalformedReply);
        };

        let tombstones: Vec<String> = redis::from_redis_value(&first)?;
        let payloads = items
            .map(|v| redis::from_redis_value::<String>(&v))
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok((tombstones, payloads))
    }
}
