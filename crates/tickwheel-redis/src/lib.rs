//! `tickwheel-redis` — distributed timer wheel over a shared Redis.
//!
//! # Overview
//!
//! Tasks live in Redis, sharded by the calendar minute of their execution
//! time: one sorted set per minute (score = unix seconds of the execution
//! instant) plus a companion tombstone set of cancelled task keys. Any
//! node may enqueue or cancel; each node runs a once-per-second poller
//! that atomically fetches-and-deletes the tasks due in the current
//! second and dispatches them as outbound HTTP callbacks.
//!
//! Coordination happens entirely through three server-side Lua scripts
//! (see [`script`]) — no locks, no leader. The destructive fetch is what
//! makes concurrent pollers safe: a due task is handed to exactly one of
//! them.
//!
//! Delivery is at-most-once per fetch: a failed callback is logged and
//! dropped, never retried.

pub mod error;
pub mod script;
pub mod store;
pub mod task;
pub mod wheel;

pub use error::{Error, Result};
pub use store::Store;
pub use task::CallbackTask;
pub use wheel::RedisTimeWheel;
