//! Per-listener webhook configuration.
//!
//! Each HTTP listener (`generic`, `grafana`, `github`) has its own table under
//! `[http.listeners]`. A listener is mounted only when its table is present
//! and `enabled` is not set to `false`.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

use crate::errors::{ConfigurationError, ConfigurationResult};

#[cfg(test)]
#[path = "listener_tests.rs"]
mod tests;

/// Configuration for a single webhook listener.
///
/// # TOML Format
///
/// ```toml
/// [http.listeners.github]
/// secret = "webhook-secret"
/// default_channel = "#all-repos"
///
/// [http.listeners.github.repositories]
/// widget = "#builds"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ListenerConfig {
    /// Whether the listener is mounted. Defaults to `true` when the table exists.
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Shared secret used to authenticate inbound requests.
    #[serde(default)]
    pub secret: Option<String>,

    /// Channel that receives every event from this listener.
    ///
    /// Takes precedence over the per-repository mapping.
    #[serde(default)]
    pub default_channel: Option<String>,

    /// Repository name to channel mapping. Keys are lower-cased on load.
    #[serde(default)]
    pub repositories: BTreeMap<String, String>,
}

fn default_enabled() -> bool {
    true
}

impl ListenerConfig {
    /// Creates an enabled listener with no secret and no routing.
    pub fn enabled() -> Self {
        Self {
            enabled: true,
            ..Default::default()
        }
    }

    /// Sets the default channel.
    pub fn with_default_channel(mut self, channel: impl Into<String>) -> Self {
        self.default_channel = Some(channel.into());
        self
    }

    /// Adds a repository mapping. The repository name is lower-cased.
    pub fn with_repository(mut self, repository: &str, channel: impl Into<String>) -> Self {
        self.repositories
            .insert(repository.to_lowercase(), channel.into());
        self
    }

    /// Sets the shared secret.
    pub fn with_secret(mut self, secret: impl Into<String>) -> Self {
        self.secret = Some(secret.into());
        self
    }

    /// Lower-cases repository keys and drops blank channel names.
    ///
    /// `name` is the listener name used in logs and error messages.
    ///
    /// # Errors
    ///
    /// Returns `ConfigurationError::InvalidConfiguration` when the secret is
    /// blank or two repository keys differ only by case.
    pub fn normalize(&mut self, name: &str) -> ConfigurationResult<()> {
        let prefix = format!("http.listeners.{name}");

        if let Some(secret) = &self.secret {
            if secret.trim().is_empty() {
                return Err(ConfigurationError::invalid(
                    format!("{prefix}.secret"),
                    "secret must not be blank; remove the key to disable verification",
                ));
            }
        }

        if self
            .default_channel
            .as_deref()
            .is_some_and(|channel| channel.trim().is_empty())
        {
            debug!(listener = name, "Ignoring blank default channel");
            self.default_channel = None;
        }

        let mut normalized = BTreeMap::new();
        for (repository, channel) in std::mem::take(&mut self.repositories) {
            if channel.trim().is_empty() {
                debug!(listener = name, repository = %repository, "Ignoring blank channel mapping");
                continue;
            }

            let key = repository.to_lowercase();
            if normalized.insert(key.clone(), channel).is_some() {
                return Err(ConfigurationError::invalid(
                    format!("{prefix}.repositories.{repository}"),
                    format!("repository '{key}' is mapped more than once"),
                ));
            }
        }
        self.repositories = normalized;

        Ok(())
    }
}
