//! NATS transport built on `async-nats`.

use std::sync::Arc;
use std::time::Duration;

use async_nats::connection::State;
use async_trait::async_trait;
use futures::StreamExt;

use crate::error::BusError;
use crate::transport::{BusConnection, BusMessage, BusSubscription, BusTransport};

/// Client name reported to the NATS server.
const CLIENT_NAME: &str = "kopilot-ingest";

/// Connects to a NATS server (or cluster seed list) by URL.
#[derive(Debug, Clone)]
pub struct NatsTransport {
    url: String,
    connect_timeout: Duration,
}

impl NatsTransport {
    pub fn new(url: impl Into<String>, connect_timeout: Duration) -> Self {
        Self {
            url: url.into(),
            connect_timeout,
        }
    }
}

#[async_trait]
impl BusTransport for NatsTransport {
    async fn connect(&self) -> Result<Arc<dyn BusConnection>, BusError> {
        let client = async_nats::ConnectOptions::new()
            .name(CLIENT_NAME)
            .connection_timeout(self.connect_timeout)
            .connect(self.url.as_str())
            .await
            .map_err(|e| BusError::Connect(e.to_string()))?;

        tracing::info!(url = %self.url, "Connected to NATS server");
        Ok(Arc::new(NatsConnection { client }))
    }
}

/// A live `async-nats` client. The socket closes when the last clone of
/// the client is dropped.
struct NatsConnection {
    client: async_nats::Client,
}

#[async_trait]
impl BusConnection for NatsConnection {
    fn is_connected(&self) -> bool {
        matches!(self.client.connection_state(), State::Connected)
    }

    async fn publish(&self, subject: &str, payload: Vec<u8>) -> Result<(), BusError> {
        self.client
            .publish(subject.to_string(), payload.into())
            .await
            .map_err(|e| BusError::Publish {
                subject: subject.to_string(),
                reason: e.to_string(),
            })
    }

    async fn subscribe(&self, subject: &str) -> Result<BusSubscription, BusError> {
        let subscriber = self
            .client
            .subscribe(subject.to_string())
            .await
            .map_err(|e| BusError::Subscribe {
                subject: subject.to_string(),
                reason: e.to_string(),
            })?;

        Ok(subscriber
            .map(|message| BusMessage {
                subject: message.subject.to_string(),
                payload: message.payload.to_vec(),
            })
            .boxed())
    }

    /// Drain every subscription and pending publish, then let the client
    /// shut the socket down.
    async fn close(&self) -> Result<(), BusError> {
        self.client
            .drain()
            .await
            .map_err(|e| BusError::Close(e.to_string()))
    }
}
