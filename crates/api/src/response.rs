//! Shared response bodies for webhook handlers.

use kopilot_core::types::DbId;
use serde::Serialize;

/// `{ "status": "ok", "event_id": N }`, returned once a webhook is stored.
#[derive(Debug, Serialize)]
pub struct AcceptedResponse {
    pub status: &'static str,
    pub event_id: DbId,
}

impl AcceptedResponse {
    pub fn ok(event_id: DbId) -> Self {
        Self {
            status: "ok",
            event_id,
        }
    }
}
