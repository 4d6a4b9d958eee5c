//! A minimal IRC server that records what the relay sends.

use anyhow::{anyhow, Result};
use std::net::SocketAddr;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tracing::debug;

/// Accepts a single client, welcomes it after `USER`, answers nothing else,
/// and forwards every received line to the test.
pub struct FakeIrcServer {
    address: SocketAddr,
    lines: mpsc::UnboundedReceiver<String>,
}

impl FakeIrcServer {
    pub async fn start() -> Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let address = listener.local_addr()?;
        let (sender, lines) = mpsc::unbounded_channel();

        tokio::spawn(async move {
            let Ok((stream, _)) = listener.accept().await else {
                return;
            };
            let (reader, mut writer) = stream.into_split();
            let mut reader = BufReader::new(reader).lines();

            while let Ok(Some(line)) = reader.next_line().await {
                debug!(line = %line, "fake IRC <");
                if line.starts_with("USER ") {
                    let welcome = ":fake.irc 001 hookrelay :Welcome to the fake network\r\n";
                    if writer.write_all(welcome.as_bytes()).await.is_err() {
                        break;
                    }
                }
                if sender.send(line).is_err() {
                    break;
                }
            }
        });

        Ok(Self { address, lines })
    }

    pub fn port(&self) -> u16 {
        self.address.port()
    }

    /// Waits for the next line starting with `prefix`, skipping others.
    pub async fn expect_line(&mut self, prefix: &str) -> Result<String> {
        let deadline = tokio::time::Instant::now() + Duration::from_secs(10);
        loop {
            let line = tokio::time::timeout_at(deadline, self.lines.recv())
                .await
                .map_err(|_| anyhow!("timed out waiting for a line starting with '{prefix}'"))?
                .ok_or_else(|| anyhow!("client disconnected before sending '{prefix}'"))?;
            if line.starts_with(prefix) {
                return Ok(line);
            }
        }
    }
}
