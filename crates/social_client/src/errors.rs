//! Error types for social feed operations.

#[cfg(test)]
#[path = "errors_tests.rs"]
mod tests;

/// Errors that can occur while posting to the social feed.
///
/// ## Examples
///
/// ```rust,ignore
/// use social_client::Error;
///
/// match client.post_tweet("Deployed v1.2.0", None).await {
///     Ok(id) => println!("Posted {}", id),
///     Err(Error::Api { status: 429, .. }) => eprintln!("Rate limited"),
///     Err(err) => eprintln!("Other error: {}", err),
/// }
/// ```
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The API base URL in the configuration is not a valid URL.
    #[error("Invalid API base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    /// The request could not be sent or the response body could not be read.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The API answered with a non-success status.
    ///
    /// `body` holds the raw response so rate limiting and duplicate-content
    /// rejections can be told apart in the logs.
    #[error("API returned {status}: {body}")]
    Api { status: u16, body: String },

    /// A success response did not contain a usable status identifier.
    #[error("Unexpected API response: {0}")]
    InvalidResponse(String),
}
