use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use chrono::{DateTime, Local};
use tokio::sync::{mpsc, watch};
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, info};

use crate::bucket::BucketStore;

/// A scheduled action — a one-shot closure run on its own spawned task.
pub type TaskFn = Box<dyn FnOnce() + Send + 'static>;

struct AddCmd {
    key: String,
    action: TaskFn,
    execute_at: DateTime<Local>,
}

/// Handle to an in-process timer wheel.
///
/// `new` spawns the wheel's actor task immediately; the handle only holds
/// the command channels. `add_task`/`remove_task` hand off to the actor
/// and resolve once it has accepted the command — after [`stop`](Self::stop)
/// the actor is gone and commands are silently discarded.
pub struct TimeWheel {
    add_tx: mpsc::Sender<AddCmd>,
    remove_tx: mpsc::Sender<String>,
    stop_tx: watch::Sender<bool>,
    stopped: AtomicBool,
}

impl TimeWheel {
    /// Start a wheel with `slot_count` slots ticking every `tick`.
    ///
    /// Zero slots defaults to 10; a zero interval defaults to 1 second.
    /// Must be called within a tokio runtime.
    pub fn new(slot_count: usize, tick: Duration) -> Self {
        let slot_count = if slot_count == 0 { 10 } else { slot_count };
        let tick = if tick.is_zero() {
            Duration::from_secs(1)
        } else {
            tick
        };

        let (add_tx, add_rx) = mpsc::channel(1);
        let (remove_tx, remove_rx) = mpsc::channel(1);
        let (stop_tx, stop_rx) = watch::channel(false);

        tokio::spawn(run(
            BucketStore::new(slot_count),
            tick,
            add_rx,
            remove_rx,
            stop_rx,
        ));
        info!(slots = slot_count, tick_ms = tick.as_millis() as u64, "time wheel started");

        Self {
            add_tx,
            remove_tx,
            stop_tx,
            stopped: AtomicBool::new(false),
        }
    }

    /// Schedule `action` to run at `execute_at`. An existing task under the
    /// same key is replaced. Times at or before now fire on the next tick.
    pub async fn add_task(
        &self,
        key: impl Into<String>,
        action: impl FnOnce() + Send + 'static,
        execute_at: DateTime<Local>,
    ) {
        let cmd = AddCmd {
            key: key.into(),
            action: Box::new(action),
            execute_at,
        };
        let _ = self.add_tx.send(cmd).await;
    }

    /// Cancel the task under `key`. Unknown keys are a no-op.
    pub async fn remove_task(&self, key: impl Into<String>) {
        let _ = self.remove_tx.send(key.into()).await;
    }

    /// Shut the wheel down. Idempotent: only the first call signals the
    /// actor, later calls return immediately.
    pub fn stop(&self) {
        if self.stopped.swap(true, Ordering::SeqCst) {
            return;
        }
        let _ = self.stop_tx.send(true);
        info!("time wheel stopped");
    }
}

impl Drop for TimeWheel {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Actor loop: sole owner of slot, index and cursor state.
async fn run(
    mut store: BucketStore<TaskFn>,
    tick: Duration,
    mut add_rx: mpsc::Receiver<AddCmd>,
    mut remove_rx: mpsc::Receiver<String>,
    mut stop_rx: watch::Receiver<bool>,
) {
    let mut ticker = interval_at(Instant::now() + tick, tick);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                for entry in store.tick() {
                    debug!(key = %entry.key, "task due");
                    let action = entry.payload;
                    // Fire-and-forget: a panicking action takes down only
                    // its own task, never the wheel or its siblings.
                    tokio::spawn(async move { action() });
                }
            }
            Some(cmd) = add_rx.recv() => {
                let delay = cmd
                    .execute_at
                    .signed_duration_since(Local::now())
                    .to_std()
                    .unwrap_or(Duration::ZERO);
                debug!(key = %cmd.key, delay_ms = delay.as_millis() as u64, "task added");
                store.insert(cmd.key, cmd.action, delay, tick);
            }
            Some(key) = remove_rx.recv() => {
                debug!(key = %key, "task removed");
                store.remove(&key);
            }
            _ = stop_rx.changed() => {
                if *stop_rx.borrow() {
                    return;
                }
            }
        }
    }
}
