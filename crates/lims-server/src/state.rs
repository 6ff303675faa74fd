//! Shared application state for the LIMS server.
//!
//! [`AppState`] holds the [`BroadcastHub`] of open connections and the
//! [`Dispatcher`] that owns the one [`EntityStore`] (behind a read-write
//! lock). Axum injects it into the WebSocket handler via the
//! `State` extractor.

use std::sync::Arc;

use lims_core::auth::{CredentialVerifier, StaticCredentials};
use lims_core::store::EntityStore;
use tokio::sync::RwLock;

use crate::dispatch::Dispatcher;
use crate::hub::{BroadcastHub, Notifier};

/// Shared state for the Axum applications.
#[derive(Clone)]
pub struct AppState {
    /// Registry of open connections.
    pub hub: Arc<BroadcastHub>,
    /// Routes inbound frames to handlers.
    pub dispatcher: Dispatcher,
}

impl AppState {
    /// Build state around an existing store, accepting the given
    /// credentials. The hub is the dispatcher's notifier.
    pub fn new(store: EntityStore, credentials: Arc<dyn CredentialVerifier>) -> Self {
        let store = Arc::new(RwLock::new(store));
        let hub = Arc::new(BroadcastHub::new());
        let dispatcher = Dispatcher::new(store, credentials, Arc::clone(&hub) as Arc<dyn Notifier>);
        Self { hub, dispatcher }
    }
}

impl Default for AppState {
    /// Empty store, default demo credentials.
    fn default() -> Self {
        Self::new(EntityStore::new(), Arc::new(StaticCredentials::default()))
    }
}
