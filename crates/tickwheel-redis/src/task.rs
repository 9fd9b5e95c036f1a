use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Error, Result};

/// A persisted callback task.
///
/// This struct *is* the wire format: its JSON encoding is the sorted-set
/// member stored in Redis, with the scheduling key embedded so the poller
/// can match fetched payloads against the tombstone set. `req` and
/// `header` are forwarded verbatim to the callback and encode as `null`
/// when absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallbackTask {
    /// Scheduling key — stamped by `add_task`, unique per wheel.
    #[serde(default)]
    pub key: String,
    /// Target of the outbound callback.
    pub callback_url: String,
    /// `"GET"` or `"POST"`; kept as a string on the wire, validated on add.
    pub method: String,
    /// Opaque request body, never interpreted by the scheduler.
    #[serde(default)]
    pub req: Option<Value>,
    /// Extra headers for the callback request.
    #[serde(default)]
    pub header: Option<HashMap<String, String>>,
}

impl CallbackTask {
    /// Reject tasks the dispatcher could never execute. Runs before
    /// anything is persisted, so a rejected task was never scheduled.
    pub fn validate(&self) -> Result<()> {
        if self.method != "GET" && self.method != "POST" {
            return Err(Error::InvalidMethod {
                method: self.method.clone(),
            });
        }
        if !self.callback_url.starts_with("http://") && !self.callback_url.starts_with("https://") {
            return Err(Error::InvalidUrl {
                url: self.callback_url.clone(),
            });
        }
        Ok(())
    }
}
