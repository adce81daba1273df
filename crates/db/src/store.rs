//! The durability boundary of the ingestion pipeline.
//!
//! A webhook counts as accepted once [`RawEventStore::insert`] returns an ID.
//! Handlers hold an `Arc<dyn RawEventStore>` so the Postgres implementation
//! can be swapped for an in-memory one in tests.

use async_trait::async_trait;
use kopilot_core::types::DbId;
use kopilot_core::EventSource;

use crate::repositories::RawEventRepo;
use crate::DbPool;

/// Persistence failure. Always a server-side fault.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[source] sqlx::Error),

    /// No connection could be obtained from the pool.
    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed => {
                Self::Unavailable(err.to_string())
            }
            other => Self::Database(other),
        }
    }
}

/// Append-only store of raw webhook payloads.
#[async_trait]
pub trait RawEventStore: Send + Sync {
    /// Persist a payload verbatim and return its generated ID.
    async fn insert(&self, source: EventSource, payload: &str) -> Result<DbId, StoreError>;

    /// Confirm the backing store is reachable.
    async fn health_check(&self) -> Result<(), StoreError>;
}

/// [`RawEventStore`] backed by the `raw_events` Postgres table.
#[derive(Clone)]
pub struct PgRawEventStore {
    pool: DbPool,
}

impl PgRawEventStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RawEventStore for PgRawEventStore {
    async fn insert(&self, source: EventSource, payload: &str) -> Result<DbId, StoreError> {
        let id = RawEventRepo::insert(&self.pool, source, payload).await?;
        tracing::debug!(event_id = id, %source, "Raw event stored");
        Ok(id)
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        crate::health_check(&self.pool).await?;
        Ok(())
    }
}
