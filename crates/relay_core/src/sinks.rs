//! Delivery destinations.
//!
//! Implementations live in their own crates (`irc_client`, `social_client`);
//! dispatch only sees these traits.

use async_trait::async_trait;
use std::fmt;

use crate::errors::SinkError;

/// Identifier of a status posted to a social feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StatusId(pub u64);

impl fmt::Display for StatusId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A chat network that accepts one line at a time.
#[async_trait]
pub trait ChatRelay: Send + Sync {
    /// Sends a single line of text to `channel`.
    async fn send_line(&self, channel: &str, text: &str) -> Result<(), SinkError>;
}

/// A microblogging feed that supports replies.
#[async_trait]
pub trait SocialFeed: Send + Sync {
    /// Posts `text`, optionally as a reply to an earlier status, and returns
    /// the new status's identifier.
    async fn post_status(
        &self,
        text: &str,
        in_reply_to: Option<StatusId>,
    ) -> Result<StatusId, SinkError>;
}
