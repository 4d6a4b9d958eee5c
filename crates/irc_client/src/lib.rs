//! IRC delivery for the relay.
//!
//! [`IrcRelay`] is a cheap, cloneable handle that queues `PRIVMSG` lines for
//! a single session task. The task registers with the server, joins the
//! configured channels, answers keep-alive pings and writes queued lines once
//! the server has welcomed it.

use async_trait::async_trait;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{error, info, instrument};

use config_manager::IrcConfig;
use relay_core::{ChatRelay, SinkError};

pub mod errors;
pub mod message;
pub mod session;

pub use errors::Error;
pub use session::Registration;

#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;

/// Outbound lines buffered while the connection is busy or not yet
/// registered.
pub const OUTBOUND_QUEUE_CAPACITY: usize = 256;

/// The running session task.
pub type SessionHandle = JoinHandle<Result<(), Error>>;

/// Handle used to send messages through an IRC session.
#[derive(Debug, Clone)]
pub struct IrcRelay {
    outbound: mpsc::Sender<String>,
}

impl IrcRelay {
    /// Starts a session over an already established stream.
    ///
    /// The returned task finishes when the server disconnects or every clone
    /// of the relay is dropped.
    pub fn spawn<S>(stream: S, registration: Registration) -> (Self, SessionHandle)
    where
        S: AsyncRead + AsyncWrite + Unpin + Send + 'static,
    {
        let (outbound, receiver) = mpsc::channel(OUTBOUND_QUEUE_CAPACITY);
        let task = tokio::spawn(async move {
            let result = session::run(stream, registration, receiver).await;
            if let Err(e) = &result {
                error!(error = %e, "IRC session ended with an error");
            }
            result
        });
        (Self { outbound }, task)
    }

    /// Opens a plain TCP connection to the configured server and starts a
    /// session on it.
    ///
    /// # Errors
    ///
    /// Returns `Error::Connect` if the server cannot be reached.
    #[instrument(skip(config), fields(server = %config.server, port = config.port))]
    pub async fn connect(config: &IrcConfig) -> Result<(Self, SessionHandle), Error> {
        let address = format!("{}:{}", config.server, config.port);
        let stream = TcpStream::connect(&address)
            .await
            .map_err(|source| Error::Connect {
                address: address.clone(),
                source,
            })?;

        info!(address = %address, nick = %config.nick, "Connected to IRC server");
        Ok(Self::spawn(stream, Registration::from_config(config)))
    }

    /// Queues `text` for `channel`, split into as many `PRIVMSG` lines as
    /// needed. Returns the number of lines queued.
    ///
    /// # Errors
    ///
    /// Returns `Error::Closed` if the session task has stopped.
    pub async fn send_message(&self, channel: &str, text: &str) -> Result<usize, Error> {
        let lines = message::privmsg_lines(channel, text);
        let count = lines.len();
        for line in lines {
            self.outbound.send(line).await.map_err(|_| Error::Closed)?;
        }
        Ok(count)
    }
}

#[async_trait]
impl ChatRelay for IrcRelay {
    async fn send_line(&self, channel: &str, text: &str) -> Result<(), SinkError> {
        self.send_message(channel, text)
            .await
            .map(|_| ())
            .map_err(|_| SinkError::Closed)
    }
}
