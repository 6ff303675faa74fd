//! Static asset server for the browser client.
//!
//! Serves files by URL path from a document root on the HTTP port. `/`
//! maps to the index document. Paths are percent-decoded before lookup.
//! The content type comes from the file extension; anything unrecognized
//! is served as HTML. Missing files,
//! directories and paths that try to leave the root answer `404` with a
//! plain-text body.

use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use axum::extract::State;
use axum::http::{Uri, header};
use axum::response::IntoResponse;
use percent_encoding::percent_decode_str;
use tracing::debug;

use crate::error::FileError;

/// Location of the static assets.
#[derive(Debug, Clone)]
pub struct StaticAssets {
    root: PathBuf,
    index_document: String,
}

impl StaticAssets {
    /// Serve files below `root`, answering `/` with `index_document`.
    pub fn new(root: impl Into<PathBuf>, index_document: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            index_document: index_document.into(),
        }
    }

    /// The document root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Map a URL path to a file below the root.
    ///
    /// Returns `None` when the path contains anything other than plain
    /// segments (`..`, drive prefixes, ...).
    fn resolve(&self, url_path: &str) -> Option<PathBuf> {
        let relative = Path::new(url_path.trim_start_matches('/'));
        relative
            .components()
            .all(|c| matches!(c, Component::Normal(_)))
            .then(|| self.root.join(relative))
    }
}

/// Content type for a request path, by extension.
pub fn content_type_for(path: &str) -> &'static str {
    let extension = Path::new(path)
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);

    match extension.as_deref() {
        Some("css") => "text/css",
        Some("js") => "application/javascript",
        Some("png") => "image/png",
        Some("jpg" | "jpeg") => "image/jpeg",
        _ => "text/html",
    }
}

/// Percent-decode a request path. Sequences that do not decode to UTF-8
/// are kept as sent, so they simply name no file.
fn decode_path(raw: &str) -> String {
    percent_decode_str(raw)
        .decode_utf8()
        .map_or_else(|_| raw.to_owned(), |decoded| decoded.into_owned())
}

/// Serve the file named by the request path.
///
/// # Errors
///
/// Returns [`FileError::NotFound`] for missing or unsafe paths and
/// [`FileError::Io`] when an existing file cannot be read.
pub async fn serve_asset(
    State(assets): State<Arc<StaticAssets>>,
    uri: Uri,
) -> Result<impl IntoResponse, FileError> {
    let path = decode_path(uri.path());
    let path = match path.as_str() {
        "/" => format!("/{}", assets.index_document),
        _ => path,
    };

    let file = assets
        .resolve(&path)
        .ok_or_else(|| FileError::NotFound(path.clone()))?;

    let is_file = tokio::fs::metadata(&file)
        .await
        .is_ok_and(|meta| meta.is_file());
    if !is_file {
        debug!(path = %path, "Static asset not found");
        return Err(FileError::NotFound(path));
    }

    let bytes = tokio::fs::read(&file).await.map_err(|source| FileError::Io {
        path: path.clone(),
        source,
    })?;

    debug!(path = %path, len = bytes.len(), "Serving static asset");
    Ok(([(header::CONTENT_TYPE, content_type_for(&path))], bytes))
}
