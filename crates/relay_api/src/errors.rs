//! Server startup errors.

use std::path::PathBuf;

use config_manager::ConfigurationError;

#[cfg(test)]
#[path = "errors_tests.rs"]
mod tests;

/// Errors raised while starting the HTTP server.
///
/// Errors inside request handling are never surfaced here; handlers log them
/// and answer `200 OK`.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    /// The listen address could not be bound.
    #[error("Failed to bind {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: std::io::Error,
    },

    /// A certificate or key file could not be read.
    #[error("Failed to read '{path}': {source}")]
    TlsFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The certificate or key file contained no usable PEM entry, or rustls
    /// rejected the pair.
    #[error("Invalid TLS material in '{path}': {reason}")]
    TlsMaterial { path: PathBuf, reason: String },
}
