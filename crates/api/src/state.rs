use std::sync::Arc;

use kopilot_core::{SecretTokenVerifier, ZoomSignatureVerifier};
use kopilot_db::RawEventStore;
use kopilot_events::BusConnectionManager;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc`).
#[derive(Clone)]
pub struct AppState {
    /// Durable raw event log.
    pub store: Arc<dyn RawEventStore>,
    /// The process's single event bus connection.
    pub bus: Arc<BusConnectionManager>,
    pub config: Arc<ServerConfig>,
    pub telegram: Arc<SecretTokenVerifier>,
    pub zoom: Arc<ZoomSignatureVerifier>,
}

impl AppState {
    /// Build state, deriving the per-source verifiers from the configured secrets.
    pub fn new(
        config: ServerConfig,
        store: Arc<dyn RawEventStore>,
        bus: Arc<BusConnectionManager>,
    ) -> Self {
        let telegram = Arc::new(SecretTokenVerifier::new(config.secrets.telegram.clone()));
        let zoom = Arc::new(ZoomSignatureVerifier::new(config.secrets.zoom.clone()));

        Self {
            store,
            bus,
            config: Arc::new(config),
            telegram,
            zoom,
        }
    }
}
