//! Third-party platforms that deliver webhooks to the gateway.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Origin of an inbound webhook.
///
/// The lowercase name is what lands in the `raw_events.source` column and
/// forms the prefix of the bus subject.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventSource {
    /// Chat-bot platform, authenticated by a shared secret header.
    Telegram,
    /// Video-conferencing platform, authenticated by HMAC signature.
    Zoom,
}

impl EventSource {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Telegram => "telegram",
            Self::Zoom => "zoom",
        }
    }

    /// Bus subject that notifications for this source are published on.
    pub fn subject(self) -> &'static str {
        match self {
            Self::Telegram => "telegram.update",
            Self::Zoom => "zoom.event",
        }
    }
}

impl fmt::Display for EventSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for EventSource {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "telegram" => Ok(Self::Telegram),
            "zoom" => Ok(Self::Zoom),
            other => Err(format!("unknown event source: {other}")),
        }
    }
}
