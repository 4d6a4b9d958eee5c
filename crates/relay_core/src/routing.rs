//! Destination channel selection.

use std::collections::BTreeMap;

use config_manager::ListenerConfig;

#[cfg(test)]
#[path = "routing_tests.rs"]
mod tests;

/// Picks the single channel an event is delivered to.
///
/// The listener's default channel wins over the per-repository mapping.
/// Empty channel names are treated as absent, so a resolved channel is never
/// the empty string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChannelRouter {
    default_channel: Option<String>,
    repositories: BTreeMap<String, String>,
}

impl ChannelRouter {
    pub fn new(default_channel: Option<String>, repositories: BTreeMap<String, String>) -> Self {
        Self {
            default_channel: default_channel.filter(|c| !c.trim().is_empty()),
            repositories: repositories
                .into_iter()
                .filter(|(_, channel)| !channel.trim().is_empty())
                .map(|(repository, channel)| (repository.to_lowercase(), channel))
                .collect(),
        }
    }

    pub fn from_listener(listener: &ListenerConfig) -> Self {
        Self::new(
            listener.default_channel.clone(),
            listener.repositories.clone(),
        )
    }

    /// Resolves the channel for an event from `repository`.
    ///
    /// Repository names are matched case-insensitively. Returns `None` when
    /// neither a default channel nor a mapping applies.
    pub fn resolve(&self, repository: Option<&str>) -> Option<&str> {
        if let Some(channel) = &self.default_channel {
            return Some(channel);
        }

        let repository = repository?.to_lowercase();
        self.repositories.get(&repository).map(String::as_str)
    }
}
