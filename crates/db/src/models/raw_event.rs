//! Raw event entity model.

use kopilot_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the append-only `raw_events` table.
///
/// `payload` is the webhook body exactly as received.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct RawEvent {
    pub id: DbId,
    pub source: String,
    pub payload: String,
    pub received_at: Timestamp,
}
