//! Shared fixtures for handler, route and server tests.

use std::sync::Arc;

use config_manager::{ListenerConfig, ListenersConfig};
use relay_core::test_support::{RecordingChat, RecordingFeed};
use relay_core::Dispatcher;
use template_engine::MessageTemplates;

use crate::AppState;

pub const GITHUB_SECRET: &str = "webhook-secret";
pub const GENERIC_TOKEN: &str = "token";

pub struct Fixture {
    pub state: AppState,
    pub chat: Arc<RecordingChat>,
    pub feed: Arc<RecordingFeed>,
}

/// All three listeners enabled: GitHub maps `widget` to `#builds` with no
/// default channel, generic and Grafana have default channels.
pub fn listeners() -> ListenersConfig {
    ListenersConfig {
        generic: Some(
            ListenerConfig::enabled()
                .with_secret(GENERIC_TOKEN)
                .with_default_channel("#general"),
        ),
        grafana: Some(ListenerConfig::enabled().with_default_channel("#alerts")),
        github: Some(
            ListenerConfig::enabled()
                .with_secret(GITHUB_SECRET)
                .with_repository("widget", "#builds"),
        ),
    }
}

pub fn fixture_with(listeners: &ListenersConfig) -> Fixture {
    let chat = Arc::new(RecordingChat::default());
    let feed = Arc::new(RecordingFeed::default());
    let templates = MessageTemplates::with_defaults().unwrap();
    let dispatcher = Dispatcher::new(Arc::new(templates), chat.clone()).with_feed(feed.clone());

    Fixture {
        state: AppState::from_config(Arc::new(dispatcher), listeners),
        chat,
        feed,
    }
}

pub fn fixture() -> Fixture {
    fixture_with(&listeners())
}

pub fn push_body(repository: &str) -> Vec<u8> {
    serde_json::to_vec(&serde_json::json!({
        "ref": "refs/heads/main",
        "compare": "https://github.com/acme/widget/compare/abc...def",
        "repository": { "name": repository, "full_name": format!("acme/{repository}") },
        "pusher": { "name": "octocat" },
        "commits": [
            {
                "id": "abc1234567",
                "message": "Fix parser\n\nHandles empty input",
                "url": "https://github.com/acme/widget/commit/abc1234567"
            },
            {
                "id": "def7654321",
                "message": "Add tests",
                "url": "https://github.com/acme/widget/commit/def7654321"
            }
        ]
    }))
    .unwrap()
}
