//! Error types for the IRC connection.

#[cfg(test)]
#[path = "errors_tests.rs"]
mod tests;

/// Errors raised while connecting to or talking with an IRC server.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The TCP connection to the server could not be opened.
    #[error("Failed to connect to IRC server {address}: {source}")]
    Connect {
        address: String,
        #[source]
        source: std::io::Error,
    },

    /// Reading from or writing to an established connection failed.
    #[error("IRC connection I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The session task has stopped and no longer accepts messages.
    #[error("IRC session is closed")]
    Closed,
}
