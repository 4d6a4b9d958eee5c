//! Typed webhook payloads and the interest rules for each of them.
//!
//! Only the fields needed to decide whether an event is interesting and where
//! it goes are modelled here. Templates render against the full JSON body,
//! which travels alongside the typed payload.

use serde::Deserialize;
use std::fmt;

#[cfg(test)]
#[path = "event_tests.rs"]
mod tests;

/// Names of the message templates used for each event.
pub mod templates {
    pub const GITHUB_RELEASE_CHAT: &str = "github.release.irc";
    pub const GITHUB_PUSH_CHAT: &str = "github.push.irc";
    pub const GITHUB_PUSH_FEED: &str = "github.push.twitter";
    pub const GITHUB_ISSUE_CHAT: &str = "github.issue.irc";
    pub const GITHUB_ISSUE_COMMENT_CHAT: &str = "github.issuecomment.irc";
    pub const GITHUB_PULL_REQUEST_CHAT: &str = "github.pullrequest.irc";
    pub const GENERIC_CHAT: &str = "generic.irc";
    pub const GRAFANA_ALERT_CHAT: &str = "grafana.alert.irc";
}

/// GitHub event types accepted by the relay, as named in `X-GitHub-Event`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GitHubEventKind {
    Ping,
    Release,
    Push,
    Issues,
    IssueComment,
    PullRequest,
}

impl GitHubEventKind {
    /// All accepted kinds.
    pub const ALL: [GitHubEventKind; 6] = [
        GitHubEventKind::Ping,
        GitHubEventKind::Release,
        GitHubEventKind::Push,
        GitHubEventKind::Issues,
        GitHubEventKind::IssueComment,
        GitHubEventKind::PullRequest,
    ];

    /// Parses an `X-GitHub-Event` header value. Returns `None` for event types
    /// the relay does not handle.
    pub fn from_header(value: &str) -> Option<Self> {
        match value.trim() {
            "ping" => Some(Self::Ping),
            "release" => Some(Self::Release),
            "push" => Some(Self::Push),
            "issues" => Some(Self::Issues),
            "issue_comment" => Some(Self::IssueComment),
            "pull_request" => Some(Self::PullRequest),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ping => "ping",
            Self::Release => "release",
            Self::Push => "push",
            Self::Issues => "issues",
            Self::IssueComment => "issue_comment",
            Self::PullRequest => "pull_request",
        }
    }
}

impl fmt::Display for GitHubEventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Repository {
    pub name: String,
    #[serde(default)]
    pub full_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PingPayload {
    #[serde(default)]
    pub zen: Option<String>,
    #[serde(default)]
    pub hook_id: Option<u64>,
    #[serde(default)]
    pub repository: Option<Repository>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ReleasePayload {
    pub action: String,
    pub release: Release,
    pub repository: Repository,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Release {
    pub tag_name: String,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PushPayload {
    #[serde(rename = "ref")]
    pub git_ref: String,
    pub repository: Repository,
    #[serde(default)]
    pub commits: Vec<Commit>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Commit {
    pub id: String,
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct IssuesPayload {
    pub action: String,
    pub issue: Issue,
    pub repository: Repository,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Issue {
    pub number: u64,
    #[serde(default)]
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct IssueCommentPayload {
    pub action: String,
    pub issue: Issue,
    pub repository: Repository,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PullRequestPayload {
    pub action: String,
    pub number: u64,
    pub repository: Repository,
}

/// A decoded GitHub delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GitHubEvent {
    Ping(PingPayload),
    Release(ReleasePayload),
    Push(PushPayload),
    Issues(IssuesPayload),
    IssueComment(IssueCommentPayload),
    PullRequest(PullRequestPayload),
}

/// Issue and pull request actions worth announcing.
pub fn is_interesting_issue_action(action: &str) -> bool {
    matches!(action, "opened" | "closed" | "reopened")
}

/// What to render for an interesting event, and which repository it
/// belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Interest {
    /// Repository used for channel lookup. `None` routes to the listener's
    /// default channel only.
    pub repository: Option<String>,
    pub chat_template: &'static str,
    pub feed_template: Option<&'static str>,
}

impl Interest {
    /// Chat-only interest with no repository.
    pub fn chat(template: &'static str) -> Self {
        Self {
            repository: None,
            chat_template: template,
            feed_template: None,
        }
    }

    fn repository_chat(repository: &Repository, template: &'static str) -> Self {
        Self {
            repository: Some(repository.name.clone()),
            chat_template: template,
            feed_template: None,
        }
    }
}

impl GitHubEvent {
    pub fn kind(&self) -> GitHubEventKind {
        match self {
            Self::Ping(_) => GitHubEventKind::Ping,
            Self::Release(_) => GitHubEventKind::Release,
            Self::Push(_) => GitHubEventKind::Push,
            Self::Issues(_) => GitHubEventKind::Issues,
            Self::IssueComment(_) => GitHubEventKind::IssueComment,
            Self::PullRequest(_) => GitHubEventKind::PullRequest,
        }
    }

    pub fn repository(&self) -> Option<&Repository> {
        match self {
            Self::Ping(p) => p.repository.as_ref(),
            Self::Release(p) => Some(&p.repository),
            Self::Push(p) => Some(&p.repository),
            Self::Issues(p) => Some(&p.repository),
            Self::IssueComment(p) => Some(&p.repository),
            Self::PullRequest(p) => Some(&p.repository),
        }
    }

    /// Decides whether the event should be relayed.
    ///
    /// | Event | Relayed when |
    /// |---|---|
    /// | release | action is `published` |
    /// | push | always (chat and social feed) |
    /// | issues | action is `opened`, `closed` or `reopened` |
    /// | issue_comment | action is `created` |
    /// | pull_request | action is `opened`, `closed` or `reopened` |
    /// | ping | never |
    pub fn interest(&self) -> Option<Interest> {
        match self {
            Self::Ping(_) => None,
            Self::Release(p) if p.action == "published" => Some(Interest::repository_chat(
                &p.repository,
                templates::GITHUB_RELEASE_CHAT,
            )),
            Self::Release(_) => None,
            Self::Push(p) => Some(Interest {
                feed_template: Some(templates::GITHUB_PUSH_FEED),
                ..Interest::repository_chat(&p.repository, templates::GITHUB_PUSH_CHAT)
            }),
            Self::Issues(p) if is_interesting_issue_action(&p.action) => Some(
                Interest::repository_chat(&p.repository, templates::GITHUB_ISSUE_CHAT),
            ),
            Self::Issues(_) => None,
            Self::IssueComment(p) if p.action == "created" => Some(Interest::repository_chat(
                &p.repository,
                templates::GITHUB_ISSUE_COMMENT_CHAT,
            )),
            Self::IssueComment(_) => None,
            Self::PullRequest(p) if is_interesting_issue_action(&p.action) => Some(
                Interest::repository_chat(&p.repository, templates::GITHUB_PULL_REQUEST_CHAT),
            ),
            Self::PullRequest(_) => None,
        }
    }
}

/// Body of `POST /send`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct GenericMessage {
    pub message: String,
}

/// Grafana alert notification. Covers both the legacy alerting format
/// (`state`, `ruleName`) and unified alerting (`status`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct GrafanaAlert {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default, rename = "ruleName")]
    pub rule_name: Option<String>,
}

impl GrafanaAlert {
    /// The alert state, whichever format it arrived in.
    pub fn state(&self) -> Option<&str> {
        self.state.as_deref().or(self.status.as_deref())
    }
}
