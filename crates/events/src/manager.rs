//! Process-wide owner of the event bus connection.
//!
//! [`BusConnectionManager`] holds at most one live connection. It connects
//! on first use, reconnects when the held connection reports itself down,
//! and is shared via `Arc<BusConnectionManager>` across handlers.
//!
//! Connection lifecycle:
//!
//! ```text
//! Disconnected --ensure_connected--> Connecting --ok--> Connected
//!      ^                                 |                  |
//!      +------ error (then backoff) -----+    drop / close -+
//! ```
//!
//! Publishing is best-effort: a failed publish is logged here and returned
//! as a [`PublishOutcome`] the caller has to acknowledge explicitly.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use futures::StreamExt;
use serde::Serialize;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::Instant;

use crate::error::BusError;
use crate::loopback::{LoopbackTransport, LOOPBACK_SCHEME};
use crate::nats::NatsTransport;
use crate::transport::{BusConnection, BusMessage, BusTransport};

// ---------------------------------------------------------------------------
// PublishOutcome
// ---------------------------------------------------------------------------

/// Result of a best-effort publish.
///
/// The failure has already been logged by the time the caller sees it.
/// Callers that do not care must say so with
/// [`ignore_failure`](PublishOutcome::ignore_failure).
#[must_use = "acknowledge a best-effort publish with `.ignore_failure()` or inspect it"]
#[derive(Debug)]
pub struct PublishOutcome {
    result: Result<(), BusError>,
}

impl PublishOutcome {
    pub fn is_published(&self) -> bool {
        self.result.is_ok()
    }

    /// Discard the outcome. A lost notification is an accepted loss.
    pub fn ignore_failure(self) {}

    pub fn into_result(self) -> Result<(), BusError> {
        self.result
    }
}

// ---------------------------------------------------------------------------
// SubscriptionHandle
// ---------------------------------------------------------------------------

/// Handle to a running subscription task.
///
/// Dropping the handle leaves the subscription running; call
/// [`unsubscribe`](SubscriptionHandle::unsubscribe) to stop it.
#[derive(Debug)]
pub struct SubscriptionHandle {
    subject: String,
    task: JoinHandle<()>,
}

impl SubscriptionHandle {
    pub fn subject(&self) -> &str {
        &self.subject
    }

    pub fn unsubscribe(self) {
        self.task.abort();
        tracing::info!(subject = %self.subject, "Unsubscribed");
    }
}

// ---------------------------------------------------------------------------
// BusConnectionManager
// ---------------------------------------------------------------------------

/// Upper bound on a single connect attempt.
const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Quiet period after a failed connect during which no new attempt is made.
const DEFAULT_RETRY_BACKOFF: Duration = Duration::from_secs(5);

/// Upper bound on handing one message to a live connection.
const DEFAULT_PUBLISH_TIMEOUT: Duration = Duration::from_secs(2);

/// Connection slot guarded by the manager's mutex.
#[derive(Default)]
struct ConnectionSlot {
    connection: Option<Arc<dyn BusConnection>>,
    /// When the most recent connect attempt failed.
    last_failure: Option<Instant>,
}

/// Owns the single shared connection to the event bus.
///
/// Callers waiting on a connect attempt wait at most `connect_timeout`.
/// After a failure, callers fail fast with [`BusError::Backoff`] until
/// `retry_backoff` has passed.
pub struct BusConnectionManager {
    transport: Arc<dyn BusTransport>,
    /// The held connection and the time of the last failed connect.
    slot: Mutex<ConnectionSlot>,
    connect_timeout: Duration,
    retry_backoff: Duration,
    publish_timeout: Duration,
}

impl BusConnectionManager {
    pub fn new(transport: impl BusTransport + 'static) -> Self {
        Self {
            transport: Arc::new(transport),
            slot: Mutex::new(ConnectionSlot::default()),
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            retry_backoff: DEFAULT_RETRY_BACKOFF,
            publish_timeout: DEFAULT_PUBLISH_TIMEOUT,
        }
    }

    /// Pick a transport from the bus URL: `memory://` selects the in-process
    /// loopback bus, anything else is handed to NATS.
    pub fn for_url(url: &str, connect_timeout: Duration) -> Self {
        let manager = if url.starts_with(LOOPBACK_SCHEME) {
            tracing::info!("Using in-process loopback event bus");
            Self::new(LoopbackTransport::default())
        } else {
            Self::new(NatsTransport::new(url, connect_timeout))
        };
        manager.with_connect_timeout(connect_timeout)
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    pub fn with_retry_backoff(mut self, backoff: Duration) -> Self {
        self.retry_backoff = backoff;
        self
    }

    pub fn with_publish_timeout(mut self, timeout: Duration) -> Self {
        self.publish_timeout = timeout;
        self
    }

    /// Return the live connection, establishing a new one if none is held or
    /// the held one reports itself disconnected.
    ///
    /// Within the backoff window after a failed attempt this returns
    /// [`BusError::Backoff`] without touching the transport.
    pub async fn ensure_connected(&self) -> Result<Arc<dyn BusConnection>, BusError> {
        let mut slot = self.slot.lock().await;

        if let Some(conn) = slot.connection.as_ref() {
            if conn.is_connected() {
                return Ok(Arc::clone(conn));
            }
            tracing::warn!("Event bus connection dropped, reconnecting");
            slot.connection = None;
        }

        if let Some(failed_at) = slot.last_failure {
            let since = failed_at.elapsed();
            if since < self.retry_backoff {
                return Err(BusError::Backoff {
                    retry_in: self.retry_backoff - since,
                });
            }
        }

        tracing::debug!("Connecting to event bus");
        let attempt = tokio::time::timeout(self.connect_timeout, self.transport.connect()).await;
        let result = match attempt {
            Ok(result) => result,
            Err(_) => Err(BusError::Connect(format!(
                "timed out after {:?}",
                self.connect_timeout
            ))),
        };

        match result {
            Ok(conn) => {
                tracing::info!("Event bus connected");
                slot.connection = Some(Arc::clone(&conn));
                slot.last_failure = None;
                Ok(conn)
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to connect to event bus");
                slot.last_failure = Some(Instant::now());
                Err(e)
            }
        }
    }

    /// Serialize `data` as JSON and publish it on `subject`.
    ///
    /// Never fails the caller: encoding, connection and send errors are
    /// logged and returned inside the [`PublishOutcome`].
    pub async fn publish<T: Serialize + ?Sized>(&self, subject: &str, data: &T) -> PublishOutcome {
        let result = self.try_publish(subject, data).await;
        match &result {
            Ok(()) => {}
            Err(e @ BusError::Backoff { .. }) => {
                tracing::debug!(subject, error = %e, "Skipped publish while event bus is down");
            }
            Err(e) => tracing::error!(subject, error = %e, "Failed to publish to event bus"),
        }
        PublishOutcome { result }
    }

    async fn try_publish<T: Serialize + ?Sized>(
        &self,
        subject: &str,
        data: &T,
    ) -> Result<(), BusError> {
        let payload = serde_json::to_vec(data)?;
        let conn = self.ensure_connected().await?;
        let len = payload.len();
        tokio::time::timeout(self.publish_timeout, conn.publish(subject, payload))
            .await
            .map_err(|_| BusError::Publish {
                subject: subject.to_string(),
                reason: format!("timed out after {:?}", self.publish_timeout),
            })??;
        tracing::debug!(subject, bytes = len, "Published to event bus");
        Ok(())
    }

    /// Invoke `handler` for every future message on `subject`.
    ///
    /// Connects first if needed. The handler runs on a dedicated task, one
    /// message at a time, until the subscription ends or is aborted.
    pub async fn subscribe<F, Fut>(
        &self,
        subject: &str,
        handler: F,
    ) -> Result<SubscriptionHandle, BusError>
    where
        F: Fn(BusMessage) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let conn = self.ensure_connected().await?;
        let mut messages = conn.subscribe(subject).await?;

        let task_subject = subject.to_string();
        let task = tokio::spawn(async move {
            while let Some(message) = messages.next().await {
                handler(message).await;
            }
            tracing::debug!(subject = %task_subject, "Subscription stream ended");
        });

        tracing::info!(subject, "Subscribed to event bus subject");
        Ok(SubscriptionHandle {
            subject: subject.to_string(),
            task,
        })
    }

    /// Release the held connection. A no-op when nothing is held.
    pub async fn close(&self) {
        let Some(conn) = self.slot.lock().await.connection.take() else {
            return;
        };

        if let Err(e) = conn.close().await {
            tracing::warn!(error = %e, "Error while closing event bus connection");
        }
        tracing::info!("Event bus connection closed");
    }

    /// Whether a connection is held and reports itself connected.
    pub async fn is_connected(&self) -> bool {
        self.slot
            .lock()
            .await
            .connection
            .as_ref()
            .is_some_and(|conn| conn.is_connected())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
