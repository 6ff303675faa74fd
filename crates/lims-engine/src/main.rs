//! LIMS server binary.
//!
//! Loads configuration, fills the in-memory store with demo records and
//! serves the `WebSocket` message port and the static asset port until
//! `Ctrl-C`.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `lims-config.yaml` (plus `LIMS_*` overrides)
//! 2. Initialize structured logging (tracing)
//! 3. Create the entity store and seed demo data
//! 4. Create the credential verifier and shared state
//! 5. Bind both listeners; a bind failure is fatal
//! 6. Serve until shutdown

mod error;

use std::sync::Arc;

use lims_core::auth::StaticCredentials;
use lims_core::config::{LimsConfig, LoggingConfig};
use lims_core::seed::seed_demo_data;
use lims_core::store::EntityStore;
use lims_server::{AppState, LimsServer};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use crate::error::EngineError;

/// Application entry point for the LIMS server.
///
/// # Errors
///
/// Returns an error if configuration, seeding, binding or serving fails.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Load configuration.
    let config = LimsConfig::load_default().map_err(EngineError::from)?;

    // 2. Initialize structured logging.
    init_logging(&config.logging)?;
    info!("lims-engine starting");
    info!(
        host = %config.server.host,
        ws_port = config.server.ws_port,
        http_port = config.server.http_port,
        web_root = %config.server.web_root.display(),
        "Configuration loaded"
    );

    // 3. Create and seed the store.
    let mut store = EntityStore::new();
    if config.seed.demo_data {
        seed_demo_data(&mut store).map_err(EngineError::from)?;
    } else {
        info!("Demo data disabled, starting empty");
    }

    // 4. Shared state.
    let credentials = Arc::new(StaticCredentials::new(&config.auth));
    let state = Arc::new(AppState::new(store, credentials));

    // 5. Bind both ports.
    let server = match LimsServer::bind(&config.server, state).await {
        Ok(server) => server,
        Err(e) => {
            error!(error = %e, "Failed to start LIMS server");
            return Err(EngineError::from(e).into());
        }
    };

    // 6. Serve.
    server.run().await.map_err(EngineError::from)?;

    info!("lims-engine shutdown complete");
    Ok(())
}

/// Install the global subscriber.
///
/// `RUST_LOG` wins over the configured level when set.
fn init_logging(logging: &LoggingConfig) -> Result<(), EngineError> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&logging.level).map_err(|e| EngineError::Logging {
            level: logging.level.clone(),
            message: e.to_string(),
        })?,
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);
    if logging.json {
        builder.json().init();
    } else {
        builder.init();
    }
    Ok(())
}
