//! Configuration management for HookRelay
//!
//! This crate loads the relay's TOML configuration file: the HTTP listen
//! address and TLS settings, the per-listener secrets and channel routing,
//! and the settings for the IRC and Twitter sinks.

pub mod errors;
pub mod listener;
pub mod relay_config;

pub use errors::{ConfigurationError, ConfigurationResult};
pub use listener::ListenerConfig;
pub use relay_config::{
    HttpConfig, IrcConfig, ListenersConfig, RelayConfig, RenderFailurePolicy, TemplatesConfig,
    TwitterConfig, DEFAULT_CONFIG_FILENAME, DEFAULT_IRC_PORT, DEFAULT_LISTEN_ADDRESS,
    DEFAULT_TWITTER_API_BASE,
};
