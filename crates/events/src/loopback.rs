//! In-process bus backed by a `tokio::sync::broadcast` channel.
//!
//! [`LoopbackTransport`] stands in for NATS when the configured bus URL is
//! `memory://`: local development without a server, and tests. Every
//! connection made from one transport shares the same channel, so a
//! subscriber sees messages published through any of them. Subject matching
//! is exact; wildcards are not supported.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use futures::StreamExt;
use tokio::sync::broadcast;

use crate::error::BusError;
use crate::transport::{BusConnection, BusMessage, BusSubscription, BusTransport};

/// Default buffer capacity for the broadcast channel.
const DEFAULT_CAPACITY: usize = 1024;

/// URL scheme that selects the loopback transport.
pub const LOOPBACK_SCHEME: &str = "memory://";

/// In-process fan-out transport.
///
/// Cloning shares the underlying channel.
#[derive(Clone)]
pub struct LoopbackTransport {
    sender: broadcast::Sender<BusMessage>,
}

impl LoopbackTransport {
    /// Create a transport with a specific channel capacity.
    ///
    /// When the buffer is full, the oldest un-consumed messages are dropped
    /// and slow subscribers skip ahead.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }
}

impl Default for LoopbackTransport {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

#[async_trait]
impl BusTransport for LoopbackTransport {
    async fn connect(&self) -> Result<Arc<dyn BusConnection>, BusError> {
        Ok(Arc::new(LoopbackConnection {
            sender: self.sender.clone(),
            open: AtomicBool::new(true),
        }))
    }
}

struct LoopbackConnection {
    sender: broadcast::Sender<BusMessage>,
    open: AtomicBool,
}

#[async_trait]
impl BusConnection for LoopbackConnection {
    fn is_connected(&self) -> bool {
        self.open.load(Ordering::Acquire)
    }

    async fn publish(&self, subject: &str, payload: Vec<u8>) -> Result<(), BusError> {
        if !self.is_connected() {
            return Err(BusError::NotConnected);
        }
        // A SendError only means there are zero subscribers.
        let _ = self.sender.send(BusMessage {
            subject: subject.to_string(),
            payload,
        });
        Ok(())
    }

    async fn subscribe(&self, subject: &str) -> Result<BusSubscription, BusError> {
        if !self.is_connected() {
            return Err(BusError::NotConnected);
        }

        let subject = subject.to_string();
        let receiver = self.sender.subscribe();

        let stream = futures::stream::unfold(receiver, move |mut receiver| {
            let subject = subject.clone();
            async move {
                loop {
                    match receiver.recv().await {
                        Ok(message) if message.subject == subject => {
                            return Some((message, receiver))
                        }
                        Ok(_) => continue,
                        Err(broadcast::error::RecvError::Lagged(skipped)) => {
                            tracing::warn!(%subject, skipped, "Loopback subscriber lagged");
                        }
                        Err(broadcast::error::RecvError::Closed) => return None,
                    }
                }
            }
        });

        Ok(stream.boxed())
    }

    async fn close(&self) -> Result<(), BusError> {
        self.open.store(false, Ordering::Release);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
