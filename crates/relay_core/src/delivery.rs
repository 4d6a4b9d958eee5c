//! Sending rendered lines to the sinks.
//!
//! Failures are logged and counted, never retried, and never stop the rest of
//! the batch.

use tracing::{debug, error};

use crate::sinks::{ChatRelay, SocialFeed, StatusId};

#[cfg(test)]
#[path = "delivery_tests.rs"]
mod tests;

/// Outcome of sending a batch of chat lines.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChatDelivery {
    pub sent: usize,
    pub failed: usize,
}

/// Outcome of posting a thread to a social feed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeedDelivery {
    /// Identifiers of the statuses that were posted, in order.
    pub posted: Vec<StatusId>,
    pub failed: usize,
}

/// Sends each line to `channel` in order, one call per line.
pub async fn send_chat(chat: &dyn ChatRelay, channel: &str, lines: &[String]) -> ChatDelivery {
    let mut delivery = ChatDelivery::default();

    for line in lines {
        match chat.send_line(channel, line).await {
            Ok(()) => delivery.sent += 1,
            Err(e) => {
                error!(channel = %channel, error = %e, "Failed to send chat line");
                delivery.failed += 1;
            }
        }
    }

    debug!(
        channel = %channel,
        sent = delivery.sent,
        failed = delivery.failed,
        "Chat delivery finished"
    );
    delivery
}

/// Posts the lines as a reply chain.
///
/// The first status has no parent; every later status replies to the most
/// recent status that was posted successfully. Blank lines are skipped.
pub async fn post_thread(feed: &dyn SocialFeed, lines: &[String]) -> FeedDelivery {
    let mut delivery = FeedDelivery::default();
    let mut parent: Option<StatusId> = None;

    for line in lines.iter().filter(|l| !l.trim().is_empty()) {
        match feed.post_status(line, parent).await {
            Ok(id) => {
                debug!(status_id = %id, in_reply_to = ?parent, "Posted status");
                parent = Some(id);
                delivery.posted.push(id);
            }
            Err(e) => {
                error!(in_reply_to = ?parent, error = %e, "Failed to post status");
                delivery.failed += 1;
            }
        }
    }

    delivery
}
