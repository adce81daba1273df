//! Notification envelope published after a raw event is stored.

use chrono::{SecondsFormat, Utc};
use kopilot_core::types::DbId;
use serde::{Deserialize, Serialize};

/// Lightweight bus message pointing at a stored raw event.
///
/// Consumers use `event_id` to load the full payload from the
/// `raw_events` table. Not persisted by the gateway.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    /// ID of the `raw_events` row this notification refers to.
    pub event_id: DbId,

    /// When the notification was built, RFC 3339 in UTC.
    pub timestamp: String,

    /// Optional echo of the original payload.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub update: Option<serde_json::Value>,
}

impl Notification {
    /// Create a notification stamped with the current time.
    pub fn new(event_id: DbId) -> Self {
        Self {
            event_id,
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true),
            update: None,
        }
    }

    /// Echo the original payload in the `update` field.
    pub fn with_update(mut self, update: serde_json::Value) -> Self {
        self.update = Some(update);
        self
    }
}
