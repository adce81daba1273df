#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Method, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use tokio::sync::mpsc;
use tower::ServiceExt;

use kopilot_api::config::{ServerConfig, WebhookSecrets};
use kopilot_api::router::build_app_router;
use kopilot_api::state::AppState;
use kopilot_core::types::DbId;
use kopilot_core::EventSource;
use kopilot_db::{RawEventStore, StoreError};
use kopilot_events::{
    BusConnection, BusConnectionManager, BusError, BusMessage, BusTransport, LoopbackTransport,
};

pub const TELEGRAM_SECRET: &str = "tg-secret";
pub const ZOOM_SECRET: &str = "s3cret";

// ---------------------------------------------------------------------------
// Test doubles
// ---------------------------------------------------------------------------

/// In-memory raw event store with switchable failure, latency and panics.
#[derive(Default)]
pub struct MemoryStore {
    rows: Mutex<Vec<(EventSource, String)>>,
    fail: AtomicBool,
    panic: AtomicBool,
    delay_ms: AtomicU64,
}

impl MemoryStore {
    pub fn set_failing(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    pub fn set_panicking(&self, panic: bool) {
        self.panic.store(panic, Ordering::SeqCst);
    }

    pub fn set_delay(&self, delay: Duration) {
        self.delay_ms.store(delay.as_millis() as u64, Ordering::SeqCst);
    }

    pub fn rows(&self) -> Vec<(EventSource, String)> {
        self.rows.lock().unwrap().clone()
    }
}

#[async_trait]
impl RawEventStore for MemoryStore {
    async fn insert(&self, source: EventSource, payload: &str) -> Result<DbId, StoreError> {
        let delay = self.delay_ms.load(Ordering::SeqCst);
        if delay > 0 {
            tokio::time::sleep(Duration::from_millis(delay)).await;
        }
        if self.panic.load(Ordering::SeqCst) {
            panic!("store exploded");
        }
        if self.fail.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("connection refused".into()));
        }
        let mut rows = self.rows.lock().unwrap();
        rows.push((source, payload.to_string()));
        Ok(rows.len() as DbId)
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("connection refused".into()));
        }
        Ok(())
    }
}

/// Transport whose every connect attempt fails.
pub struct UnreachableTransport;

#[async_trait]
impl BusTransport for UnreachableTransport {
    async fn connect(&self) -> Result<Arc<dyn BusConnection>, BusError> {
        Err(BusError::Connect("connection refused".into()))
    }
}

/// Transport that takes `delay` to fail each connect attempt, like a
/// blackholed bus host.
pub struct SlowFailingTransport {
    pub delay: Duration,
}

#[async_trait]
impl BusTransport for SlowFailingTransport {
    async fn connect(&self) -> Result<Arc<dyn BusConnection>, BusError> {
        tokio::time::sleep(self.delay).await;
        Err(BusError::Connect("connection timed out".into()))
    }
}

// ---------------------------------------------------------------------------
// App construction
// ---------------------------------------------------------------------------

/// Build a test `ServerConfig` with fixed secrets and the loopback bus.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        request_timeout_secs: 30,
        shutdown_timeout_secs: 30,
        nats_url: "memory://".to_string(),
        nats_connect_timeout_secs: 1,
        nats_retry_backoff_secs: 5,
        nats_publish_timeout_secs: 2,
        secrets: WebhookSecrets {
            telegram: TELEGRAM_SECRET.to_string(),
            zoom: ZOOM_SECRET.to_string(),
        },
    }
}

/// A router wired to an in-memory store, plus handles to inspect it.
pub struct TestApp {
    pub router: Router,
    pub store: Arc<MemoryStore>,
    pub bus: Arc<BusConnectionManager>,
}

impl TestApp {
    /// Subscribe to `subject` on the app's bus, forwarding every message
    /// into the returned channel.
    pub async fn capture(&self, subject: &str) -> mpsc::UnboundedReceiver<BusMessage> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.bus
            .subscribe(subject, move |message| {
                let tx = tx.clone();
                async move {
                    let _ = tx.send(message);
                }
            })
            .await
            .unwrap();
        rx
    }
}

/// Build the app through [`build_app_router`] so tests run the production
/// middleware stack.
pub fn build_test_app() -> TestApp {
    build_test_app_with_bus(BusConnectionManager::new(LoopbackTransport::default()))
}

pub fn build_test_app_with_bus(bus: BusConnectionManager) -> TestApp {
    build_test_app_with(test_config(), bus)
}

pub fn build_test_app_with(config: ServerConfig, bus: BusConnectionManager) -> TestApp {
    let store = Arc::new(MemoryStore::default());
    let bus = Arc::new(bus);
    let state = AppState::new(config, store.clone(), Arc::clone(&bus));

    TestApp {
        router: build_app_router(state),
        store,
        bus,
    }
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

pub async fn get(app: &TestApp, uri: &str) -> Response<Body> {
    let request = Request::builder()
        .method(Method::GET)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    app.router.clone().oneshot(request).await.unwrap()
}

/// POST a raw body with the given headers.
pub async fn post(
    app: &TestApp,
    uri: &str,
    headers: &[(&str, &str)],
    body: impl Into<Body>,
) -> Response<Body> {
    let mut builder = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header("content-type", "application/json");
    for (name, value) in headers {
        builder = builder.header(*name, *value);
    }
    let request = builder.body(body.into()).unwrap();
    app.router.clone().oneshot(request).await.unwrap()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// Wait briefly for the next bus message.
pub async fn next_message(rx: &mut mpsc::UnboundedReceiver<BusMessage>) -> Option<BusMessage> {
    tokio::time::timeout(Duration::from_secs(2), rx.recv())
        .await
        .ok()
        .flatten()
}
