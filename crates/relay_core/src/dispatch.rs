//! Turning an interesting event into delivered messages.
//!
//! Every event goes through the same steps: render all of its templates,
//! resolve the destination channel, then deliver. Nothing is sent unless a
//! channel resolves.

use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, error, info};

use config_manager::RenderFailurePolicy;

use crate::delivery::{post_thread, send_chat, ChatDelivery, FeedDelivery};
use crate::event::Interest;
use crate::renderer::MessageRenderer;
use crate::routing::ChannelRouter;
use crate::sinks::{ChatRelay, SocialFeed};
use crate::webhook::GitHubWebhook;

#[cfg(test)]
#[path = "dispatch_tests.rs"]
mod tests;

/// What happened to an event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// The event is not one the relay announces.
    Ignored,

    /// A template failed to render and nothing was delivered.
    RenderFailed { template: String },

    /// No channel is configured for the event's repository.
    Unrouted { repository: Option<String> },

    /// Messages were handed to the sinks.
    Delivered(DeliveryReport),
}

/// Per-destination results for a delivered event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryReport {
    pub channel: String,
    /// `None` when the chat template failed under the isolate policy.
    pub chat: Option<ChatDelivery>,
    /// `None` when the event has no feed template, no feed is configured,
    /// or the feed template failed under the isolate policy.
    pub feed: Option<FeedDelivery>,
}

struct Rendered {
    chat: Option<Vec<String>>,
    feed: Option<Vec<String>>,
}

/// Renders and delivers events to the configured sinks.
pub struct Dispatcher {
    renderer: Arc<dyn MessageRenderer>,
    chat: Arc<dyn ChatRelay>,
    feed: Option<Arc<dyn SocialFeed>>,
    policy: RenderFailurePolicy,
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("has_feed", &self.feed.is_some())
            .field("policy", &self.policy)
            .finish()
    }
}

impl Dispatcher {
    pub fn new(renderer: Arc<dyn MessageRenderer>, chat: Arc<dyn ChatRelay>) -> Self {
        Self {
            renderer,
            chat,
            feed: None,
            policy: RenderFailurePolicy::default(),
        }
    }

    /// Enables posting to a social feed for events that have a feed template.
    pub fn with_feed(mut self, feed: Arc<dyn SocialFeed>) -> Self {
        self.feed = Some(feed);
        self
    }

    pub fn with_policy(mut self, policy: RenderFailurePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Dispatches a verified GitHub delivery.
    pub async fn dispatch_github(
        &self,
        webhook: &GitHubWebhook,
        router: &ChannelRouter,
    ) -> DispatchOutcome {
        let kind = webhook.event.kind();
        match webhook.event.interest() {
            Some(interest) => self.dispatch(&interest, &webhook.context, router).await,
            None => {
                debug!(event = %kind, "Event not relayed");
                DispatchOutcome::Ignored
            }
        }
    }

    /// Renders the interest's templates against `context` and delivers the
    /// result to the channel `router` selects.
    pub async fn dispatch(
        &self,
        interest: &Interest,
        context: &Value,
        router: &ChannelRouter,
    ) -> DispatchOutcome {
        let rendered = match self.render(interest, context) {
            Ok(rendered) => rendered,
            Err(template) => return DispatchOutcome::RenderFailed { template },
        };

        let Some(channel) = router.resolve(interest.repository.as_deref()) else {
            info!(
                repository = interest.repository.as_deref().unwrap_or("<none>"),
                "No channel configured, dropping event"
            );
            return DispatchOutcome::Unrouted {
                repository: interest.repository.clone(),
            };
        };

        let chat = match &rendered.chat {
            Some(lines) => Some(send_chat(self.chat.as_ref(), channel, lines).await),
            None => None,
        };

        let feed = match (&self.feed, &rendered.feed) {
            (Some(feed), Some(lines)) => Some(post_thread(feed.as_ref(), lines).await),
            _ => None,
        };

        DispatchOutcome::Delivered(DeliveryReport {
            channel: channel.to_string(),
            chat,
            feed,
        })
    }

    /// Renders every template of the interest.
    ///
    /// Returns the name of the failing template when the failure policy
    /// cancels the event.
    fn render(&self, interest: &Interest, context: &Value) -> Result<Rendered, String> {
        let chat = self.render_one(interest.chat_template, context);
        let feed = interest
            .feed_template
            .map(|template| (template, self.render_one(template, context)));

        let failed_template = match (&chat, &feed) {
            (None, _) => Some(interest.chat_template),
            (_, Some((template, None))) => Some(*template),
            _ => None,
        };

        if let Some(template) = failed_template {
            let feed_left = self.feed.is_some() && matches!(feed, Some((_, Some(_))));
            let anything_left = chat.is_some() || feed_left;
            if self.policy == RenderFailurePolicy::Abort || !anything_left {
                return Err(template.to_string());
            }
        }

        Ok(Rendered {
            chat,
            feed: feed.and_then(|(_, lines)| lines),
        })
    }

    fn render_one(&self, template: &str, context: &Value) -> Option<Vec<String>> {
        match self.renderer.render(template, context) {
            Ok(lines) => Some(lines),
            Err(e) => {
                error!(template = %template, error = %e, "Failed to render template");
                None
            }
        }
    }
}
