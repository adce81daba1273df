//! Transport abstraction underneath [`BusConnectionManager`](crate::BusConnectionManager).

use std::sync::Arc;

use async_trait::async_trait;
use futures::stream::BoxStream;

use crate::error::BusError;

/// A message delivered to a subscriber.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BusMessage {
    pub subject: String,
    pub payload: Vec<u8>,
}

/// Stream of messages for one subscription. Ends when the subscription or
/// connection is torn down.
pub type BusSubscription = BoxStream<'static, BusMessage>;

/// Establishes physical connections to a bus.
#[async_trait]
pub trait BusTransport: Send + Sync {
    async fn connect(&self) -> Result<Arc<dyn BusConnection>, BusError>;
}

/// One live connection to a bus.
#[async_trait]
pub trait BusConnection: Send + Sync {
    /// Whether the connection currently considers itself usable.
    fn is_connected(&self) -> bool;

    async fn publish(&self, subject: &str, payload: Vec<u8>) -> Result<(), BusError>;

    async fn subscribe(&self, subject: &str) -> Result<BusSubscription, BusError>;

    /// Flush and release the connection.
    async fn close(&self) -> Result<(), BusError>;
}
