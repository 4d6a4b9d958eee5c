//! Top-level relay configuration.
//!
//! The configuration is stored in TOML format and loaded once at startup. It
//! is never reloaded; handlers receive the values they need when they are
//! constructed.

use serde::{Deserialize, Serialize};
use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::errors::{ConfigurationError, ConfigurationResult};
use crate::listener::ListenerConfig;

#[cfg(test)]
#[path = "relay_config_tests.rs"]
mod tests;

/// Default configuration file name
pub const DEFAULT_CONFIG_FILENAME: &str = "hookrelay.toml";

/// Default HTTP listen address
pub const DEFAULT_LISTEN_ADDRESS: &str = "0.0.0.0:8080";

/// Default IRC port
pub const DEFAULT_IRC_PORT: u16 = 6667;

/// Default Twitter API base URL
pub const DEFAULT_TWITTER_API_BASE: &str = "https://api.twitter.com";

/// Main configuration structure for the relay.
///
/// # Example TOML Configuration
///
/// ```toml
/// [http]
/// listen = "0.0.0.0:8080"
///
/// [http.listeners.github]
/// secret = "webhook-secret"
///
/// [http.listeners.github.repositories]
/// widget = "#builds"
///
/// [irc]
/// server = "irc.libera.chat"
/// nick = "hookrelay"
/// channels = ["#builds"]
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RelayConfig {
    #[serde(default)]
    pub http: HttpConfig,

    pub irc: IrcConfig,

    /// Social feed settings. Without this table push events reach chat only.
    #[serde(default)]
    pub twitter: Option<TwitterConfig>,

    #[serde(default)]
    pub templates: TemplatesConfig,
}

/// HTTP server settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HttpConfig {
    /// Socket address to listen on.
    #[serde(default = "default_listen")]
    pub listen: String,

    /// Serve HTTPS using `tls_cert` and `tls_key`.
    #[serde(default)]
    pub tls: bool,

    /// PEM encoded certificate chain.
    #[serde(default)]
    pub tls_cert: Option<PathBuf>,

    /// PEM encoded private key.
    #[serde(default)]
    pub tls_key: Option<PathBuf>,

    /// What to do when one destination's template fails to render.
    #[serde(default)]
    pub render_failure: RenderFailurePolicy,

    #[serde(default)]
    pub listeners: ListenersConfig,
}

fn default_listen() -> String {
    DEFAULT_LISTEN_ADDRESS.to_string()
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            listen: default_listen(),
            tls: false,
            tls_cert: None,
            tls_key: None,
            render_failure: RenderFailurePolicy::default(),
            listeners: ListenersConfig::default(),
        }
    }
}

impl HttpConfig {
    /// Returns `listen` in `host:port` form, ready to be bound.
    ///
    /// Accepts socket addresses, `hostname:port`, and `:port`, which listens
    /// on every IPv4 interface. Hostnames are resolved when the server binds.
    pub fn listen_address(&self) -> ConfigurationResult<String> {
        let listen = self.listen.trim();
        if listen.parse::<SocketAddr>().is_ok() {
            return Ok(listen.to_string());
        }

        let invalid = |reason: &str| {
            ConfigurationError::invalid("http.listen", format!("'{}': {}", self.listen, reason))
        };
        let (host, port) = listen
            .rsplit_once(':')
            .ok_or_else(|| invalid("expected host:port or :port"))?;
        port.parse::<u16>()
            .map_err(|_| invalid("port must be a number between 0 and 65535"))?;

        if host.is_empty() {
            return Ok(format!("0.0.0.0:{port}"));
        }
        if host.contains(char::is_whitespace) || host.contains(':') {
            return Err(invalid("invalid host name"));
        }
        Ok(format!("{host}:{port}"))
    }
}

/// Behaviour when rendering fails for one destination of an event.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RenderFailurePolicy {
    /// Any render failure cancels delivery to every destination.
    #[default]
    Abort,

    /// Only the destination whose template failed is skipped.
    Isolate,
}

/// The set of webhook listeners. Absent tables are not mounted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ListenersConfig {
    /// `POST /send`
    #[serde(default)]
    pub generic: Option<ListenerConfig>,

    /// `POST /grafana`
    #[serde(default)]
    pub grafana: Option<ListenerConfig>,

    /// `POST /github`
    #[serde(default)]
    pub github: Option<ListenerConfig>,
}

impl ListenersConfig {
    fn active(listener: &Option<ListenerConfig>) -> Option<&ListenerConfig> {
        listener.as_ref().filter(|l| l.enabled)
    }

    /// The generic listener, if configured and enabled.
    pub fn generic(&self) -> Option<&ListenerConfig> {
        Self::active(&self.generic)
    }

    /// The Grafana listener, if configured and enabled.
    pub fn grafana(&self) -> Option<&ListenerConfig> {
        Self::active(&self.grafana)
    }

    /// The GitHub listener, if configured and enabled.
    pub fn github(&self) -> Option<&ListenerConfig> {
        Self::active(&self.github)
    }
}

/// IRC connection settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct IrcConfig {
    pub server: String,

    #[serde(default = "default_irc_port")]
    pub port: u16,

    pub nick: String,

    /// Username sent with `USER`. Defaults to the nick.
    #[serde(default)]
    pub username: Option<String>,

    /// Real name sent with `USER`. Defaults to the nick.
    #[serde(default)]
    pub realname: Option<String>,

    /// Server password sent with `PASS`.
    #[serde(default)]
    pub password: Option<String>,

    /// Channels joined after registration.
    #[serde(default)]
    pub channels: Vec<String>,
}

fn default_irc_port() -> u16 {
    DEFAULT_IRC_PORT
}

impl IrcConfig {
    /// Creates a configuration with default port and no channels.
    pub fn new(server: impl Into<String>, nick: impl Into<String>) -> Self {
        Self {
            server: server.into(),
            port: DEFAULT_IRC_PORT,
            nick: nick.into(),
            username: None,
            realname: None,
            password: None,
            channels: Vec::new(),
        }
    }

    pub fn username(&self) -> &str {
        self.username.as_deref().unwrap_or(&self.nick)
    }

    pub fn realname(&self) -> &str {
        self.realname.as_deref().unwrap_or(&self.nick)
    }
}

/// Twitter API settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TwitterConfig {
    /// Set to `false` to keep the table but stop posting.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// OAuth 2.0 user access token with `tweet.write` scope.
    pub bearer_token: String,

    #[serde(default = "default_twitter_api_base")]
    pub api_base: String,
}

fn default_true() -> bool {
    true
}

fn default_twitter_api_base() -> String {
    DEFAULT_TWITTER_API_BASE.to_string()
}

/// Message template settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TemplatesConfig {
    /// TOML file whose entries override the built-in templates.
    #[serde(default)]
    pub path: Option<PathBuf>,
}

impl RelayConfig {
    /// Loads configuration from a TOML file at the specified path.
    ///
    /// Relative paths inside the file (`tls_cert`, `tls_key`, `templates.path`)
    /// are resolved against the directory containing the configuration file.
    ///
    /// # Errors
    ///
    /// This function will return an error if:
    /// - The specified file does not exist
    /// - The file cannot be read
    /// - The file contains invalid TOML or unknown keys
    /// - Validation fails (see [`RelayConfig::validate`])
    pub fn load(path: &Path) -> ConfigurationResult<Self> {
        debug!("Loading configuration from {:?}", path);

        if !path.exists() {
            return Err(ConfigurationError::FileNotFound {
                path: path.display().to_string(),
            });
        }

        let content =
            fs::read_to_string(path).map_err(|e| ConfigurationError::FileAccessError {
                path: path.display().to_string(),
                reason: e.to_string(),
            })?;

        let mut config = Self::from_toml_str(&content)?;
        if let Some(base) = path.parent() {
            config.resolve_paths(base);
        }

        info!(
            path = ?path,
            listen = %config.http.listen,
            tls = config.http.tls,
            "Loaded relay configuration"
        );
        Ok(config)
    }

    /// Parses and validates configuration from TOML text.
    pub fn from_toml_str(content: &str) -> ConfigurationResult<Self> {
        let mut config: RelayConfig =
            toml::from_str(content).map_err(|e| ConfigurationError::ParseError {
                reason: e.to_string(),
            })?;

        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration and normalises listener routing tables.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `http.listen` is not of the form `host:port` or `:port`
    /// - `http.tls` is set without both `tls_cert` and `tls_key`
    /// - a listener has a blank secret or channel, or duplicate repositories
    /// - `irc.server` or `irc.nick` is blank
    /// - `twitter.bearer_token` is blank
    pub fn validate(&mut self) -> ConfigurationResult<()> {
        self.http.listen_address()?;

        if self.http.tls {
            if self.http.tls_cert.is_none() {
                return Err(ConfigurationError::RequiredConfigMissing {
                    key: "http.tls_cert".to_string(),
                });
            }
            if self.http.tls_key.is_none() {
                return Err(ConfigurationError::RequiredConfigMissing {
                    key: "http.tls_key".to_string(),
                });
            }
        }

        let listeners = &mut self.http.listeners;
        for (name, listener) in [
            ("generic", &mut listeners.generic),
            ("grafana", &mut listeners.grafana),
            ("github", &mut listeners.github),
        ] {
            if let Some(listener) = listener {
                listener.normalize(name)?;
            }
        }

        if self.irc.server.trim().is_empty() {
            return Err(ConfigurationError::invalid(
                "irc.server",
                "server must not be blank",
            ));
        }
        if self.irc.nick.trim().is_empty() {
            return Err(ConfigurationError::invalid(
                "irc.nick",
                "nick must not be blank",
            ));
        }

        if let Some(twitter) = &self.twitter {
            if twitter.bearer_token.trim().is_empty() {
                return Err(ConfigurationError::invalid(
                    "twitter.bearer_token",
                    "token must not be blank",
                ));
            }
        }

        Ok(())
    }

    fn resolve_paths(&mut self, base: &Path) {
        let resolve = |path: &mut Option<PathBuf>| {
            if let Some(p) = path {
                if p.is_relative() {
                    *p = base.join(&*p);
                }
            }
        };

        resolve(&mut self.http.tls_cert);
        resolve(&mut self.http.tls_key);
        resolve(&mut self.templates.path);
    }
}
