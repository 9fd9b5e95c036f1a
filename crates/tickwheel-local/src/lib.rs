//! `tickwheel-local` — in-process timer wheel for delayed one-shot tasks.
//!
//! # Overview
//!
//! A fixed ring of slots is swept by a cursor that advances once per tick.
//! Registering a task places it `floor(delay / tick)` slots ahead of the
//! cursor, with a cycle counter recording how many full revolutions must
//! still pass before it is actually due. Each tick drains the current slot:
//! entries with a positive cycle count are decremented and kept, the rest
//! are detached and their closures spawned fire-and-forget.
//!
//! All wheel state is owned by a single background task; [`TimeWheel`]
//! hands add/remove commands to it over capacity-1 channels, so the wheel
//! is a strict single-writer state machine with no locks.
//!
//! State is purely in-memory and lost on drop — the Redis-backed variant
//! in `tickwheel-redis` is the durable, multi-node counterpart.

mod bucket;
mod wheel;

pub use wheel::{TaskFn, TimeWheel};
