//! HookRelay HTTP API
//!
//! Receives webhooks from GitHub, Grafana and generic senders and hands them
//! to the relay dispatcher.
//!
//! # Architecture
//!
//! This crate is the HTTP layer only:
//! - request extraction and authentication
//! - routing, with a route mounted per enabled listener
//! - serving over plain HTTP or TLS with a start/stop lifecycle
//!
//! Every webhook route answers `200 OK` with an empty body, whether or not
//! the event was delivered. Rejections are visible in the logs only.

use std::sync::Arc;

use secrecy::SecretString;

use config_manager::{ListenerConfig, ListenersConfig};
use relay_core::{ChannelRouter, Dispatcher, GitHubWebhookParser};

pub mod app;
pub mod errors;
pub mod handlers;
pub mod routes;
pub mod server;
pub mod tls;

pub use app::Relay;
pub use errors::ServerError;
pub use server::{RelayServer, RunningServer};

#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;

#[cfg(test)]
mod test_support;

/// Request timeout applied to every route.
pub const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Largest GitHub delivery accepted. GitHub caps payloads at 25 MB.
pub const GITHUB_MAX_BODY_BYTES: usize = 25 * 1024 * 1024;

/// Per-listener state for bearer-authenticated listeners.
#[derive(Debug)]
pub struct ListenerState {
    pub secret: Option<SecretString>,
    pub router: ChannelRouter,
}

impl ListenerState {
    pub fn from_config(config: &ListenerConfig) -> Self {
        Self {
            secret: config.secret.clone().map(SecretString::from),
            router: ChannelRouter::from_listener(config),
        }
    }
}

/// State of the GitHub listener.
#[derive(Debug)]
pub struct GitHubListenerState {
    pub parser: GitHubWebhookParser,
    pub router: ChannelRouter,
}

impl GitHubListenerState {
    pub fn from_config(config: &ListenerConfig) -> Self {
        Self {
            parser: GitHubWebhookParser::new(config.secret.clone().map(SecretString::from)),
            router: ChannelRouter::from_listener(config),
        }
    }
}

/// Application state shared across handlers.
///
/// A listener that is `None` has no route.
#[derive(Clone, Debug)]
pub struct AppState {
    pub dispatcher: Arc<Dispatcher>,
    pub generic: Option<Arc<ListenerState>>,
    pub grafana: Option<Arc<ListenerState>>,
    pub github: Option<Arc<GitHubListenerState>>,
}

impl AppState {
    /// Creates state with no listeners.
    pub fn new(dispatcher: Arc<Dispatcher>) -> Self {
        Self {
            dispatcher,
            generic: None,
            grafana: None,
            github: None,
        }
    }

    /// Creates state for every listener that is present and enabled.
    pub fn from_config(dispatcher: Arc<Dispatcher>, listeners: &ListenersConfig) -> Self {
        Self {
            dispatcher,
            generic: listeners
                .generic()
                .map(|l| Arc::new(ListenerState::from_config(l))),
            grafana: listeners
                .grafana()
                .map(|l| Arc::new(ListenerState::from_config(l))),
            github: listeners
                .github()
                .map(|l| Arc::new(GitHubListenerState::from_config(l))),
        }
    }
}
