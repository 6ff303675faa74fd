//! Error types for the LIMS server binary.

/// Top-level error for the LIMS server binary.
///
/// Each variant wraps a specific subsystem error, providing a single
/// error type that `main` can propagate with `?`.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Configuration loading failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: lims_core::config::ConfigError,
    },

    /// Loading the demo records failed.
    #[error("seed error: {source}")]
    Seed {
        /// The underlying store error.
        #[from]
        source: lims_core::store::StoreError,
    },

    /// A listener could not be bound or stopped serving.
    #[error("server error: {source}")]
    Server {
        /// The underlying server error.
        #[from]
        source: lims_server::ServerError,
    },

    /// The log filter could not be built from the configured level.
    #[error("invalid log level {level:?}: {message}")]
    Logging {
        /// The configured level string.
        level: String,
        /// Description of the parse failure.
        message: String,
    },
}
