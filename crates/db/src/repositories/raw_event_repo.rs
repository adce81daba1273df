//! Repository for the `raw_events` table.

use kopilot_core::types::DbId;
use kopilot_core::EventSource;
use sqlx::PgPool;

use crate::models::raw_event::RawEvent;

/// Column list for `raw_events` queries.
const COLUMNS: &str = "id, source, payload, received_at";

/// Provides append and read operations for raw webhook events.
///
/// Rows are never updated or deleted by the gateway.
pub struct RawEventRepo;

impl RawEventRepo {
    /// Insert a new raw event row, returning the generated ID.
    pub async fn insert(
        pool: &PgPool,
        source: EventSource,
        payload: &str,
    ) -> Result<DbId, sqlx::Error> {
        sqlx::query_scalar("INSERT INTO raw_events (source, payload) VALUES ($1, $2) RETURNING id")
            .bind(source.as_str())
            .bind(payload)
            .fetch_one(pool)
            .await
    }

    /// Find a raw event by its ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<RawEvent>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM raw_events WHERE id = $1");
        sqlx::query_as::<_, RawEvent>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List recent events newest-first, optionally restricted to one source.
    pub async fn list_recent(
        pool: &PgPool,
        source: Option<EventSource>,
        limit: i64,
    ) -> Result<Vec<RawEvent>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM raw_events \
             WHERE ($1::TEXT IS NULL OR source = $1) \
             ORDER BY id DESC LIMIT $2"
        );
        sqlx::query_as::<_, RawEvent>(&query)
            .bind(source.map(EventSource::as_str))
            .bind(limit)
            .fetch_all(pool)
            .await
    }
}
