use std::time::Duration;

/// Event bus failures.
///
/// These never reach an HTTP caller: [`BusConnectionManager::publish`]
/// logs them and hands them back inside a
/// [`PublishOutcome`](crate::PublishOutcome).
///
/// [`BusConnectionManager::publish`]: crate::BusConnectionManager::publish
#[derive(Debug, thiserror::Error)]
pub enum BusError {
    /// The transport could not be reached.
    #[error("Failed to connect to event bus: {0}")]
    Connect(String),

    /// A recent connect attempt failed; no new attempt is made yet.
    #[error("Event bus unavailable, next connect attempt in {retry_in:?}")]
    Backoff { retry_in: Duration },

    /// The connection was closed before the operation ran.
    #[error("Event bus connection is closed")]
    NotConnected,

    #[error("Failed to publish to {subject}: {reason}")]
    Publish { subject: String, reason: String },

    #[error("Failed to subscribe to {subject}: {reason}")]
    Subscribe { subject: String, reason: String },

    #[error("Failed to close event bus connection: {0}")]
    Close(String),

    /// The message could not be serialized to JSON.
    #[error("Failed to encode message: {0}")]
    Encode(#[from] serde_json::Error),
}
