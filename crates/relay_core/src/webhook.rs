//! Inbound webhook verification and decoding.
//!
//! Verification always happens before the body is decoded, so an unsigned
//! or wrongly signed delivery never reaches the JSON parser.

use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

use crate::errors::WebhookError;
use crate::event::{
    GitHubEvent, GitHubEventKind, IssueCommentPayload, IssuesPayload, PingPayload,
    PullRequestPayload, PushPayload, ReleasePayload,
};
use crate::signature::{verify_bearer, verify_signature};

#[cfg(test)]
#[path = "webhook_tests.rs"]
mod tests;

/// Header carrying the GitHub event type.
pub const GITHUB_EVENT_HEADER: &str = "x-github-event";

/// Header carrying the GitHub delivery GUID.
pub const GITHUB_DELIVERY_HEADER: &str = "x-github-delivery";

/// Header carrying the HMAC-SHA256 signature.
pub const GITHUB_SIGNATURE_HEADER: &str = "x-hub-signature-256";

/// The request headers the GitHub parser looks at.
#[derive(Debug, Clone, Copy, Default)]
pub struct WebhookHeaders<'a> {
    pub event: Option<&'a str>,
    pub signature: Option<&'a str>,
    pub delivery: Option<&'a str>,
}

/// A decoded payload together with the raw JSON it came from.
///
/// `context` is what message templates are rendered against.
#[derive(Debug, Clone, PartialEq)]
pub struct Decoded<T> {
    pub payload: T,
    pub context: Value,
}

/// A verified and decoded GitHub delivery.
#[derive(Debug, Clone, PartialEq)]
pub struct GitHubWebhook {
    pub event: GitHubEvent,
    pub context: Value,
    pub delivery_id: Option<String>,
}

/// Verifies and decodes GitHub webhook deliveries.
///
/// Without a secret, signatures are not checked.
pub struct GitHubWebhookParser {
    secret: Option<SecretString>,
}

impl std::fmt::Debug for GitHubWebhookParser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitHubWebhookParser")
            .field("verifies_signatures", &self.secret.is_some())
            .finish()
    }
}

impl GitHubWebhookParser {
    pub fn new(secret: Option<SecretString>) -> Self {
        Self { secret }
    }

    /// Verifies the delivery and decodes it into a [`GitHubEvent`].
    ///
    /// # Errors
    ///
    /// - `MissingEventHeader` / `UnsupportedEvent` when the event type is
    ///   absent or not one the relay handles
    /// - `MissingSignature` / `InvalidSignature` when a secret is configured
    ///   and the signature is absent or wrong
    /// - `MalformedPayload` when the body does not match the event's shape
    pub fn parse(
        &self,
        headers: WebhookHeaders<'_>,
        body: &[u8],
    ) -> Result<GitHubWebhook, WebhookError> {
        let event_name = headers.event.ok_or(WebhookError::MissingEventHeader)?;
        let kind = GitHubEventKind::from_header(event_name)
            .ok_or_else(|| WebhookError::UnsupportedEvent(event_name.to_string()))?;

        if let Some(secret) = &self.secret {
            let signature = headers.signature.ok_or(WebhookError::MissingSignature)?;
            if !verify_signature(secret.expose_secret(), body, signature) {
                return Err(WebhookError::InvalidSignature);
            }
        }

        let context = parse_json(body)?;
        let event = match kind {
            GitHubEventKind::Ping => GitHubEvent::Ping(from_context::<PingPayload>(&context)?),
            GitHubEventKind::Release => {
                GitHubEvent::Release(from_context::<ReleasePayload>(&context)?)
            }
            GitHubEventKind::Push => GitHubEvent::Push(from_context::<PushPayload>(&context)?),
            GitHubEventKind::Issues => {
                GitHubEvent::Issues(from_context::<IssuesPayload>(&context)?)
            }
            GitHubEventKind::IssueComment => {
                GitHubEvent::IssueComment(from_context::<IssueCommentPayload>(&context)?)
            }
            GitHubEventKind::PullRequest => {
                GitHubEvent::PullRequest(from_context::<PullRequestPayload>(&context)?)
            }
        };

        Ok(GitHubWebhook {
            event,
            context,
            delivery_id: headers.delivery.map(str::to_string),
        })
    }
}

/// Checks an `Authorization: Bearer` header against an optional secret.
///
/// Passes when no secret is configured.
pub fn authorize_bearer(
    secret: Option<&SecretString>,
    authorization: Option<&str>,
) -> Result<(), WebhookError> {
    let Some(secret) = secret else {
        return Ok(());
    };

    match authorization {
        Some(header) if verify_bearer(secret.expose_secret(), header) => Ok(()),
        _ => Err(WebhookError::Unauthorized),
    }
}

/// Decodes a JSON body into `T`, keeping the raw JSON for templates.
pub fn decode<T: DeserializeOwned>(body: &[u8]) -> Result<Decoded<T>, WebhookError> {
    let context = parse_json(body)?;
    let payload = from_context(&context)?;
    Ok(Decoded { payload, context })
}

fn parse_json(body: &[u8]) -> Result<Value, WebhookError> {
    serde_json::from_slice(body).map_err(|e| WebhookError::MalformedPayload(e.to_string()))
}

fn from_context<T: DeserializeOwned>(context: &Value) -> Result<T, WebhookError> {
    <T as Deserialize>::deserialize(context)
        .map_err(|e| WebhookError::MalformedPayload(e.to_string()))
}
