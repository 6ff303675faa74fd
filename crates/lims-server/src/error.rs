//! Error types for the LIMS dispatch server.
//!
//! Every per-request failure is contained: [`ProtocolError`] and
//! [`DispatchError`] are logged and the frame is dropped,
//! [`TransportError`] is logged and isolated to one connection. Only
//! startup bind failures ([`ServerError`](crate::server::ServerError))
//! are fatal.
//!
//! [`FileError`] converts into an Axum HTTP response via its
//! [`IntoResponse`](axum::response::IntoResponse) implementation.

use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use lims_core::store::StoreError;
use lims_types::ConnectionId;

/// A request frame that could not be turned into a handler call.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// The frame is not well-formed JSON.
    #[error("malformed frame: {0}")]
    Malformed(#[from] serde_json::Error),

    /// The frame is JSON but not an object.
    #[error("frame is not a JSON object")]
    NotAnObject,

    /// The `action` field is absent or not a string.
    #[error("missing action field")]
    MissingAction,

    /// The `data` field is present but not an object.
    #[error("data of {action} is not an object")]
    InvalidData {
        /// Action name as sent by the client.
        action: String,
    },

    /// A field required by the handler is absent or has the wrong shape.
    #[error("invalid {action} payload: {source}")]
    InvalidPayload {
        /// The action whose payload was rejected.
        action: &'static str,
        /// The underlying deserialization error.
        source: serde_json::Error,
    },
}

/// Failure while handling one decoded request.
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    /// The frame could not be decoded.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// The store refused the operation.
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

/// Failure delivering a frame to one connection.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    /// The connection is not registered (never opened or already closed).
    #[error("connection {0} is not registered")]
    UnknownConnection(ConnectionId),

    /// The connection's writer has shut down.
    #[error("connection {0} is closed")]
    Closed(ConnectionId),
}

/// Errors produced by the static asset server.
#[derive(Debug, thiserror::Error)]
pub enum FileError {
    /// No regular file exists at the requested path.
    #[error("404 - File Not Found: {0}")]
    NotFound(String),

    /// The file exists but could not be read.
    #[error("failed to read {path}: {source}")]
    Io {
        /// The requested URL path.
        path: String,
        /// The underlying I/O error.
        source: std::io::Error,
    },
}

impl IntoResponse for FileError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Io { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        };

        (
            status,
            [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
            self.to_string(),
        )
            .into_response()
    }
}
