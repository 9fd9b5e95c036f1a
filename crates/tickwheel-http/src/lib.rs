//! `tickwheel-http` — thin JSON-speaking HTTP client.
//!
//! Carries no scheduling logic; the Redis wheel uses it to invoke task
//! callbacks, and it is usable standalone for plain JSON request/response
//! exchanges. Only GET and POST are supported, the request body (when
//! present) is JSON, and any non-2xx status is an error.

mod client;
mod error;

pub use client::CallbackClient;
pub use error::{HttpError, Result};
