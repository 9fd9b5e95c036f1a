//! `tickwheel-core` — shared time helpers and configuration.
//!
//! Both wheel variants shard and window work by wall-clock time:
//! the Redis wheel derives its per-minute store keys from
//! [`time::minute_label`], and its per-tick fetch window from
//! [`time::truncate_to_second`]. The local wheel only consumes the
//! configured slot count and tick interval from [`config`].

pub mod config;
pub mod time;

pub use config::TickwheelConfig;
