//! Twitter API mocking for integration tests.

use serde_json::{json, Value};
use std::sync::atomic::{AtomicU64, Ordering};
use wiremock::{
    matchers::{method, path},
    Mock, MockServer, Request, Respond, ResponseTemplate,
};

/// Answers each tweet with the next id from a counter.
struct SequentialIds {
    next: AtomicU64,
}

impl Respond for SequentialIds {
    fn respond(&self, _request: &Request) -> ResponseTemplate {
        let id = self.next.fetch_add(1, Ordering::SeqCst);
        ResponseTemplate::new(201).set_body_json(json!({
            "data": { "id": id.to_string(), "text": "" }
        }))
    }
}

/// Twitter API mock server.
pub struct TwitterMockServer {
    server: MockServer,
}

impl TwitterMockServer {
    /// Starts a server that accepts every tweet, numbering them from
    /// `first_id`.
    pub async fn start(first_id: u64) -> Self {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/2/tweets"))
            .respond_with(SequentialIds {
                next: AtomicU64::new(first_id),
            })
            .mount(&server)
            .await;
        Self { server }
    }

    pub fn uri(&self) -> String {
        self.server.uri()
    }

    /// JSON bodies of every tweet received, in arrival order.
    pub async fn tweets(&self) -> Vec<Value> {
        self.server
            .received_requests()
            .await
            .unwrap_or_default()
            .iter()
            .filter_map(|request| serde_json::from_slice(&request.body).ok())
            .collect()
    }
}
