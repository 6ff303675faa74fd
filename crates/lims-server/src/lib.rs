//! Real-time message-dispatch server for the LIMS demo.
//!
//! Clients hold a persistent `WebSocket` connection, send typed action
//! requests and receive typed responses. Mutating actions are broadcast
//! to every open connection so all clients stay synchronized.
//!
//! # Architecture
//!
//! ```text
//! text frame --> protocol::ClientRequest --> Dispatcher --> EntityStore
//!                                                 |
//!                                   Notifier: reply(origin), publish(all)
//!                                                 |
//!                                 BroadcastHub --> per-connection writer
//! ```
//!
//! - [`protocol`] -- frame decoding and the tagged [`ServerMessage`] set
//! - [`dispatch`] -- action routing and handlers
//! - [`hub`] -- open-connection registry and fan-out
//! - [`ws`] -- per-connection reader/writer lifecycle
//! - [`files`] -- static assets for the browser client on a second port
//! - [`server`] -- binding and serving both ports
//!
//! [`ServerMessage`]: protocol::ServerMessage

pub mod dispatch;
pub mod error;
pub mod files;
pub mod hub;
pub mod protocol;
pub mod router;
pub mod server;
pub mod state;
pub mod ws;

// Re-export primary types for convenience.
pub use dispatch::Dispatcher;
pub use hub::{BroadcastHub, Notifier};
pub use protocol::{Action, ClientRequest, ServerMessage};
pub use router::{build_http_router, build_ws_router};
pub use server::{LimsServer, ServerError};
pub use state::AppState;
