use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use chrono::{DateTime, Local};
use futures_util::future::join_all;
use tokio::sync::watch;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, error, info, warn};

use tickwheel_core::time::truncate_to_second;
use tickwheel_http::CallbackClient;

use crate::error::Result;
use crate::store::{delete_set_key, task_slice_key, Store};
use crate::task::CallbackTask;

/// Poll cadence of every node. Matches the one-second score granularity
/// of the fetch window.
pub const POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Deadline shared by one tick's fetch and all of its dispatches.
pub const BATCH_DEADLINE: Duration = Duration::from_secs(30);

/// Handle to a distributed timer wheel node.
///
/// Holds no task state of its own — every durable bit lives in Redis, so
/// any number of handles on any number of nodes may add, cancel and poll
/// concurrently against the same store.
pub struct RedisTimeWheel {
    store: Store,
    stop_tx: watch::Sender<bool>,
    stopped: AtomicBool,
}

impl RedisTimeWheel {
    /// Start a node: spawns the poll loop immediately.
    /// Must be called within a tokio runtime.
    pub fn new(store: Store, client: CallbackClient) -> Self {
        let (stop_tx, stop_rx) = watch::channel(false);
        tokio::spawn(run(store.clone(), client, stop_rx));
        info!("redis time wheel started");

        Self {
            store,
            stop_tx,
            stopped: AtomicBool::new(false),
        }
    }

    /// Persist `task` under `key`, due at `execute_at`.
    ///
    /// Validation runs first; a rejected task was never written. The key
    /// is stamped into the payload so the poller can match it against
    /// tombstones, and any stale tombstone for the key is cleared in the
    /// same atomic step as the insert.
    pub async fn add_task(
        &self,
        key: &str,
        mut task: CallbackTask,
        execute_at: DateTime<Local>,
    ) -> Result<()> {
        task.validate()?;
        task.key = key.to_string();
        let payload = serde_json::to_string(&task)?;

        self.store
            .add_with_undelete(
                &task_slice_key(execute_at),
                &delete_set_key(execute_at),
                execute_at.timestamp(),
                &payload,
                key,
            )
            .await?;
        Ok(())
    }

    /// Cancel the task under `key` scheduled for `execute_at`.
    ///
    /// `execute_at` must be the same instant passed to
    /// [`add_task`](Self::add_task): the tombstone lands in the shard
    /// derived from it, and a tombstone in the wrong minute-shard
    /// suppresses nothing. Succeeds whether or not a matching task exists.
    pub async fn remove_task(&self, key: &str, execute_at: DateTime<Local>) -> Result<()> {
        self.store
            .mark_deleted(&delete_set_key(execute_at), key)
            .await?;
        Ok(())
    }

    /// Stop this node's poller. Idempotent; tasks already in Redis stay
    /// there for other nodes to fire.
    pub fn stop(&self) {
        if self.stopped.swap(true, Ordering::SeqCst) {
            return;
        }
        let _ = self.stop_tx.send(true);
        info!("redis time wheel stopped");
    }
}

impl Drop for RedisTimeWheel {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Poll loop: each tick hands the batch to its own task so a slow batch
/// cannot delay the next tick.
async fn run(store: Store, client: CallbackClient, mut stop_rx: watch::Receiver<bool>) {
    let mut ticker = interval_at(Instant::now() + POLL_INTERVAL, POLL_INTERVAL);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let store = store.clone();
                let client = client.clone();
                tokio::spawn(execute_due(store, client));
            }
            _ = stop_rx.changed() => {
                if *stop_rx.borrow() {
                    return;
                }
            }
        }
    }
}

/// One tick's work: fetch the due window, dispatch every survivor.
/// Failures end here — logged, never retried, never surfaced.
async fn execute_due(store: Store, client: CallbackClient) {
    let batch = tokio::time::timeout(BATCH_DEADLINE, async {
        let tasks = match fetch_due(&store).await {
            Ok(tasks) => tasks,
            Err(e) => {
                error!(error = %e, "due-task fetch failed; tick skipped");
                return;
            }
        };
        if tasks.is_empty() {
            return;
        }
        debug!(count = tasks.len(), "dispatching due tasks");

        // One task per dispatch: a panic or error in one callback can
        // never take down its siblings.
        let handles: Vec<_> = tasks
            .into_iter()
            .map(|task| {
                let client = client.clone();
                tokio::spawn(async move {
                    if let Err(e) = client
                        .json_do(
                            &task.method,
                            &task.callback_url,
                            task.header.as_ref(),
                            task.req.as_ref(),
                        )
                        .await
                    {
                        warn!(key = %task.key, error = %e, "callback dispatch failed");
                    }
                })
            })
            .collect();
        for result in join_all(handles).await {
            if result.is_err() {
                warn!("callback dispatch panicked");
            }
        }
    })
    .await;

    if batch.is_err() {
        warn!("poll tick exceeded its 30s deadline");
    }
}

/// Fetch-and-reap the current second's window from the current
/// minute-shard, then decode and tombstone-filter the result.
async fn fetch_due(store: &Store) -> Result<Vec<CallbackTask>> {
    let now = Local::now();
    let low = truncate_to_second(now).timestamp();
    let high = low + 1;

    let (tombstones, payloads) = store
        .fetch_and_reap(&task_slice_key(now), &delete_set_key(now), low, high)
        .await?;
    Ok(filter_due(tombstones, payloads))
}

/// Decode fetched payloads and drop the cancelled ones. Undecodable
/// entries are skipped, not fatal — one bad payload cannot starve the
/// rest of the batch.
fn filter_due(tombstones: Vec<String>, payloads: Vec<String>) -> Vec<CallbackTask> {
    let tombstones: HashSet<String> = tombstones.into_iter().collect();

    payloads
        .into_iter()
        .filter_map(|raw| match serde_json::from_str::<CallbackTask>(&raw) {
            Ok(task) if tombstones.contains(&task.key) => {
                debug!(key = %task.key, "cancelled task suppressed");
                None
            }
            Ok(task) => Some(task),
            Err(e) => {
                warn!(error = %e, "undecodable task payload skipped");
                None
            }
        })
        .collect()
}
