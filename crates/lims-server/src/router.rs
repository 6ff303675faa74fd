//! Axum router construction.
//!
//! The server listens on two ports, each with its own [`Router`]:
//! - the message port upgrades every request on `/` or `/ws` to a
//!   `WebSocket`;
//! - the HTTP port serves static assets for the browser client.
//!
//! CORS is open so the client may be served from elsewhere during
//! development.

use std::sync::Arc;

use axum::Router;
use axum::routing::get;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::files::{self, StaticAssets};
use crate::state::AppState;
use crate::ws;

/// Build the router for the `WebSocket` message port.
///
/// - `GET /` -- `WebSocket` upgrade
/// - `GET /ws` -- `WebSocket` upgrade
pub fn build_ws_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(ws::ws_connect))
        .route("/ws", get(ws::ws_connect))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Build the router for the static asset port.
///
/// Every path is answered by [`files::serve_asset`].
pub fn build_http_router(assets: Arc<StaticAssets>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .fallback(files::serve_asset)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(assets)
}
