//! Assembling a running relay from its configuration.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use std::time::Duration;
use tracing::{error, info, warn};

use config_manager::{RelayConfig, TemplatesConfig};
use irc_client::{IrcRelay, SessionHandle};
use relay_core::Dispatcher;
use social_client::TwitterClient;
use template_engine::MessageTemplates;

use crate::server::{RelayServer, RunningServer};
use crate::{routes, AppState};

/// How long [`Relay::stop`] waits for the IRC session to say goodbye.
pub const IRC_QUIT_TIMEOUT: Duration = Duration::from_secs(5);

/// Loads the built-in templates plus any configured overrides.
pub fn load_templates(
    config: &TemplatesConfig,
) -> Result<MessageTemplates, template_engine::Error> {
    match &config.path {
        Some(path) => MessageTemplates::with_overrides(path),
        None => MessageTemplates::with_defaults(),
    }
}

/// A relay with its IRC session connected and its HTTP server accepting
/// webhooks.
#[derive(Debug)]
pub struct Relay {
    server: RunningServer,
    irc_session: SessionHandle,
}

impl Relay {
    /// Loads templates, connects to IRC, creates the Twitter client when one
    /// is configured and enabled, and starts the HTTP server.
    ///
    /// # Errors
    ///
    /// Fails if any of those steps fails; nothing is left running.
    pub async fn start(config: &RelayConfig) -> anyhow::Result<Self> {
        let templates =
            load_templates(&config.templates).context("Failed to load message templates")?;

        let (irc, irc_session) = IrcRelay::connect(&config.irc)
            .await
            .context("Failed to connect to IRC")?;

        let mut dispatcher = Dispatcher::new(Arc::new(templates), Arc::new(irc))
            .with_policy(config.http.render_failure);
        if let Some(twitter) = config.twitter.as_ref().filter(|t| t.enabled) {
            match TwitterClient::from_config(twitter) {
                Ok(client) => {
                    info!("Posting push events to Twitter");
                    dispatcher = dispatcher.with_feed(Arc::new(client));
                }
                Err(e) => {
                    irc_session.abort();
                    return Err(e).context("Invalid Twitter settings");
                }
            }
        }

        let state = AppState::from_config(Arc::new(dispatcher), &config.http.listeners);
        let server = match RelayServer::start(&config.http, routes::create_router(state)).await {
            Ok(server) => server,
            Err(e) => {
                irc_session.abort();
                return Err(e).context("Failed to start HTTP server");
            }
        };

        Ok(Self {
            server,
            irc_session,
        })
    }

    /// The address the HTTP server is bound to.
    pub fn local_addr(&self) -> SocketAddr {
        self.server.local_addr()
    }

    /// Runs until `signal` completes, the HTTP server exits, or the IRC
    /// session ends, then shuts everything down.
    pub async fn run_until<F>(mut self, signal: F) -> anyhow::Result<()>
    where
        F: Future<Output = ()>,
    {
        tokio::select! {
            _ = signal => {}
            result = self.server.wait() => {
                self.irc_session.abort();
                return result;
            }
            _ = &mut self.irc_session => {
                error!("IRC session ended, shutting down");
            }
        }

        self.stop().await
    }

    /// Stops the HTTP server and disconnects from IRC.
    ///
    /// Once the server has dropped its handles to the IRC relay the session
    /// sends `QUIT` and ends on its own; it is aborted if that takes longer
    /// than [`IRC_QUIT_TIMEOUT`].
    pub async fn stop(mut self) -> anyhow::Result<()> {
        let result = self.server.stop().await;
        if tokio::time::timeout(IRC_QUIT_TIMEOUT, &mut self.irc_session)
            .await
            .is_err()
        {
            warn!("IRC session did not close in time, aborting");
            self.irc_session.abort();
        }
        result
    }
}
