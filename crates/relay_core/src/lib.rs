//! Core relay logic: webhook verification and decoding, interest rules,
//! channel routing, rendering and delivery.
//!
//! The HTTP layer (`relay_api`) hands each request to this crate. Concrete
//! delivery sinks live in `irc_client` and `social_client` and are plugged in
//! through the [`ChatRelay`] and [`SocialFeed`] traits.

pub mod delivery;
pub mod dispatch;
mod errors;
pub mod event;
pub mod renderer;
pub mod routing;
pub mod signature;
pub mod sinks;
pub mod webhook;

/// Recording doubles for the renderer and sink traits, shared with the tests
/// of dependent crates through the `test-support` feature.
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use delivery::{ChatDelivery, FeedDelivery};
pub use dispatch::{DeliveryReport, DispatchOutcome, Dispatcher};
pub use errors::{RenderError, SinkError, WebhookError};
pub use event::{GenericMessage, GitHubEvent, GitHubEventKind, GrafanaAlert, Interest};
pub use renderer::MessageRenderer;
pub use routing::ChannelRouter;
pub use sinks::{ChatRelay, SocialFeed, StatusId};
pub use webhook::{GitHubWebhook, GitHubWebhookParser, WebhookHeaders};
