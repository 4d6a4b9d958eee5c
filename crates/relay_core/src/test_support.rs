//! Recording doubles for the renderer and sink traits.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use crate::errors::{RenderError, SinkError};
use crate::renderer::MessageRenderer;
use crate::sinks::{ChatRelay, SocialFeed, StatusId};

/// Renderer returning canned lines and recording every call.
#[derive(Default)]
pub struct StubRenderer {
    outputs: HashMap<String, Vec<String>>,
    failing: HashSet<String>,
    pub calls: Mutex<Vec<String>>,
}

impl StubRenderer {
    pub fn with_output(mut self, template: &str, lines: &[&str]) -> Self {
        self.outputs.insert(
            template.to_string(),
            lines.iter().map(|l| l.to_string()).collect(),
        );
        self
    }

    pub fn failing(mut self, template: &str) -> Self {
        self.failing.insert(template.to_string());
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

impl MessageRenderer for StubRenderer {
    fn render(&self, template: &str, _context: &Value) -> Result<Vec<String>, RenderError> {
        self.calls.lock().unwrap().push(template.to_string());
        if self.failing.contains(template) {
            return Err(RenderError {
                template: template.to_string(),
                message: "stub failure".to_string(),
            });
        }
        Ok(self.outputs.get(template).cloned().unwrap_or_default())
    }
}

/// Chat relay that records `(channel, text)` pairs.
#[derive(Default)]
pub struct RecordingChat {
    pub sent: Mutex<Vec<(String, String)>>,
    pub fail_on: HashSet<String>,
}

impl RecordingChat {
    pub fn failing_on(text: &str) -> Self {
        Self {
            fail_on: HashSet::from([text.to_string()]),
            ..Default::default()
        }
    }

    pub fn sent(&self) -> Vec<(String, String)> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChatRelay for RecordingChat {
    async fn send_line(&self, channel: &str, text: &str) -> Result<(), SinkError> {
        if self.fail_on.contains(text) {
            return Err(SinkError::Closed);
        }
        self.sent
            .lock()
            .unwrap()
            .push((channel.to_string(), text.to_string()));
        Ok(())
    }
}

/// Social feed that hands out sequential ids starting at 100 and records
/// `(text, in_reply_to)` for each successful post.
#[derive(Default)]
pub struct RecordingFeed {
    pub posts: Mutex<Vec<(String, Option<StatusId>)>>,
    pub fail_on: HashSet<String>,
    next_id: Mutex<u64>,
}

impl RecordingFeed {
    pub fn failing_on(text: &str) -> Self {
        Self {
            fail_on: HashSet::from([text.to_string()]),
            ..Default::default()
        }
    }

    pub fn posts(&self) -> Vec<(String, Option<StatusId>)> {
        self.posts.lock().unwrap().clone()
    }
}

#[async_trait]
impl SocialFeed for RecordingFeed {
    async fn post_status(
        &self,
        text: &str,
        in_reply_to: Option<StatusId>,
    ) -> Result<StatusId, SinkError> {
        if self.fail_on.contains(text) {
            return Err(SinkError::Rejected("duplicate status".to_string()));
        }

        let mut next = self.next_id.lock().unwrap();
        let id = StatusId(100 + *next);
        *next += 1;
        self.posts
            .lock()
            .unwrap()
            .push((text.to_string(), in_reply_to));
        Ok(id)
    }
}
