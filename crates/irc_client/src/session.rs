//! The task that owns the IRC connection.
//!
//! Outbound lines wait in the queue until the server has welcomed us and the
//! configured channels have been joined.

use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use config_manager::IrcConfig;

use crate::errors::Error;
use crate::message::Message;

#[cfg(test)]
#[path = "session_tests.rs"]
mod tests;

/// Welcome numeric sent once registration completes.
const RPL_WELCOME: &str = "001";

/// Nickname already in use.
const ERR_NICKNAMEINUSE: &str = "433";

/// Identity and channels announced when the connection opens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    pub password: Option<String>,
    pub nick: String,
    pub username: String,
    pub realname: String,
    pub channels: Vec<String>,
}

impl Registration {
    pub fn from_config(config: &IrcConfig) -> Self {
        Self {
            password: config.password.clone(),
            nick: config.nick.clone(),
            username: config.username().to_string(),
            realname: config.realname().to_string(),
            channels: config.channels.clone(),
        }
    }

    /// Lines sent before anything else.
    pub fn handshake(&self) -> Vec<String> {
        let mut lines = Vec::with_capacity(3);
        if let Some(password) = &self.password {
            lines.push(format!("PASS {password}"));
        }
        lines.push(format!("NICK {}", self.nick));
        lines.push(format!("USER {} 0 * :{}", self.username, self.realname));
        lines
    }

    fn join_lines(&self) -> Vec<String> {
        self.channels
            .iter()
            .map(|channel| format!("JOIN {channel}"))
            .collect()
    }
}

/// Connection state tracked by the session loop.
#[derive(Debug)]
struct State {
    registration: Registration,
    nick: String,
    welcomed: bool,
}

impl State {
    /// Returns the replies for one server line.
    fn respond(&mut self, line: &str) -> Vec<String> {
        let Some(message) = Message::parse(line) else {
            return Vec::new();
        };

        match message.command {
            "PING" => {
                let token = message.params.first().copied().unwrap_or_default();
                vec![format!("PONG :{token}")]
            }
            RPL_WELCOME => {
                self.welcomed = true;
                info!(nick = %self.nick, "Registered with IRC server");
                self.registration.join_lines()
            }
            ERR_NICKNAMEINUSE if !self.welcomed => {
                self.nick.push('_');
                warn!(nick = %self.nick, "Nickname in use, retrying");
                vec![format!("NICK {}", self.nick)]
            }
            "ERROR" => {
                warn!(
                    reason = message.params.last().copied().unwrap_or_default(),
                    "IRC server error"
                );
                Vec::new()
            }
            _ => Vec::new(),
        }
    }
}

/// Runs the session until the server disconnects or every sender of
/// `outbound` is dropped.
///
/// Returns `Ok(())` on an orderly close from either side.
pub async fn run<S>(
    stream: S,
    registration: Registration,
    mut outbound: mpsc::Receiver<String>,
) -> Result<(), Error>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let (reader, mut writer) = tokio::io::split(stream);
    let mut reader = BufReader::new(reader);
    let mut buffer = Vec::with_capacity(512);

    for line in registration.handshake() {
        write_line(&mut writer, &line).await?;
    }

    let mut state = State {
        nick: registration.nick.clone(),
        registration,
        welcomed: false,
    };

    loop {
        tokio::select! {
            read = reader.read_until(b'\n', &mut buffer) => {
                if read? == 0 {
                    info!("IRC server closed the connection");
                    return Ok(());
                }
                let line = decode_line(&buffer);
                buffer.clear();
                debug!(line = %line, "IRC <");
                for reply in state.respond(&line) {
                    write_line(&mut writer, &reply).await?;
                }
            }
            outgoing = outbound.recv(), if state.welcomed => {
                match outgoing {
                    Some(line) => write_line(&mut writer, &line).await?,
                    None => {
                        info!("IRC relay dropped, leaving server");
                        write_line(&mut writer, "QUIT :Shutting down").await?;
                        return Ok(());
                    }
                }
            }
        }
    }
}

/// Decodes one received line, replacing bytes that are not UTF-8.
fn decode_line(raw: &[u8]) -> String {
    String::from_utf8_lossy(raw)
        .trim_end_matches(['\r', '\n'])
        .to_string()
}

async fn write_line<W>(writer: &mut W, line: &str) -> Result<(), Error>
where
    W: AsyncWrite + Unpin,
{
    if !line.starts_with("PASS ") {
        debug!(line = %line, "IRC >");
    }
    writer.write_all(line.as_bytes()).await?;
    writer.write_all(b"\r\n").await?;
    writer.flush().await?;
    Ok(())
}
