//! Social feed delivery through the Twitter API v2.
//!
//! Posts are created with `POST /2/tweets` using an OAuth 2.0 user access
//! token. Replies reference the parent through
//! `reply.in_reply_to_tweet_id`, which is how the relay threads the commits
//! of a push together.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, instrument};
use url::Url;

use config_manager::TwitterConfig;
use relay_core::{SinkError, SocialFeed, StatusId};

pub mod errors;
pub use errors::Error;

#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;

#[derive(Debug, Serialize)]
struct CreateTweetRequest<'a> {
    text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    reply: Option<ReplySettings>,
}

#[derive(Debug, Serialize)]
struct ReplySettings {
    in_reply_to_tweet_id: String,
}

#[derive(Debug, Deserialize)]
struct CreateTweetResponse {
    data: CreatedTweet,
}

#[derive(Debug, Deserialize)]
struct CreatedTweet {
    id: String,
}

/// A client for posting to Twitter.
pub struct TwitterClient {
    http: reqwest::Client,
    tweets_url: Url,
    bearer_token: SecretString,
}

impl std::fmt::Debug for TwitterClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TwitterClient")
            .field("tweets_url", &self.tweets_url.as_str())
            .finish_non_exhaustive()
    }
}

impl TwitterClient {
    /// Creates a client for the API at `api_base`.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidBaseUrl` if `api_base` cannot be parsed.
    pub fn new(api_base: &str, bearer_token: SecretString) -> Result<Self, Error> {
        let invalid = |reason: String| Error::InvalidBaseUrl {
            url: api_base.to_string(),
            reason,
        };

        let mut base = Url::parse(api_base).map_err(|e| invalid(e.to_string()))?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        let tweets_url = base.join("2/tweets").map_err(|e| invalid(e.to_string()))?;

        Ok(Self {
            http: reqwest::Client::new(),
            tweets_url,
            bearer_token,
        })
    }

    /// Creates a client from the `[twitter]` configuration table.
    pub fn from_config(config: &TwitterConfig) -> Result<Self, Error> {
        Self::new(
            &config.api_base,
            SecretString::from(config.bearer_token.clone()),
        )
    }

    /// Posts a tweet, optionally as a reply, and returns its identifier.
    ///
    /// # Errors
    ///
    /// - `Error::Http` if the request cannot be sent
    /// - `Error::Api` if the API rejects the tweet
    /// - `Error::InvalidResponse` if the returned id is not numeric
    #[instrument(skip(self, text), fields(in_reply_to = ?in_reply_to))]
    pub async fn post_tweet(
        &self,
        text: &str,
        in_reply_to: Option<StatusId>,
    ) -> Result<StatusId, Error> {
        let request = CreateTweetRequest {
            text,
            reply: in_reply_to.map(|id| ReplySettings {
                in_reply_to_tweet_id: id.to_string(),
            }),
        };

        debug!(url = %self.tweets_url, "Posting tweet");
        let response = self
            .http
            .post(self.tweets_url.clone())
            .bearer_auth(self.bearer_token.expose_secret())
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!(status = status.as_u16(), body = %body, "Twitter API rejected tweet");
            return Err(Error::Api {
                status: status.as_u16(),
                body,
            });
        }

        let created: CreateTweetResponse = response.json().await?;
        let id = created
            .data
            .id
            .parse::<u64>()
            .map(StatusId)
            .map_err(|_| {
                Error::InvalidResponse(format!("non-numeric tweet id '{}'", created.data.id))
            })?;

        info!(status_id = %id, "Posted tweet");
        Ok(id)
    }
}

#[async_trait]
impl SocialFeed for TwitterClient {
    async fn post_status(
        &self,
        text: &str,
        in_reply_to: Option<StatusId>,
    ) -> Result<StatusId, SinkError> {
        self.post_tweet(text, in_reply_to)
            .await
            .map_err(|e| match e {
                Error::Api { status, body } => SinkError::Rejected(format!("{status}: {body}")),
                other => SinkError::Transport(other.to_string()),
            })
    }
}
