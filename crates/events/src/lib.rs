//! Kopilot event bus client.
//!
//! This crate owns the gateway's single connection to the internal event
//! bus and the notification envelope published on it:
//!
//! - [`BusConnectionManager`]: lazily connects, publishes best-effort,
//!   subscribes, and closes. Shared via `Arc` across request handlers.
//! - [`BusTransport`] / [`BusConnection`]: the seam between the manager and
//!   a concrete bus.
//! - [`NatsTransport`]: production transport on `async-nats`.
//! - [`LoopbackTransport`]: in-process transport backed by
//!   `tokio::sync::broadcast`, selected with a `memory://` URL.
//! - [`Notification`]: the lightweight message referencing a stored event.

pub mod error;
pub mod loopback;
pub mod manager;
pub mod nats;
pub mod notification;
pub mod transport;

pub use error::BusError;
pub use loopback::LoopbackTransport;
pub use manager::{BusConnectionManager, PublishOutcome, SubscriptionHandle};
pub use nats::NatsTransport;
pub use notification::Notification;
pub use transport::{BusConnection, BusMessage, BusSubscription, BusTransport};
