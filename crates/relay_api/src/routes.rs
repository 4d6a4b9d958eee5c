//! HTTP routing configuration
//!
//! # Route Structure
//!
//! - POST   /github  - GitHub webhooks (when the `github` listener is enabled)
//! - POST   /send    - Generic messages (when the `generic` listener is enabled)
//! - POST   /grafana - Grafana alerts (when the `grafana` listener is enabled)
//! - GET    /health  - Health check
//!
//! Any other method on a webhook route gets `404 Not Found`. GitHub
//! deliveries may be up to 25 MB; the other routes keep axum's 2 MB limit.

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use std::time::Duration;
use tower_http::{
    timeout::TimeoutLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::{info, Level};

use crate::{handlers, AppState, GITHUB_MAX_BODY_BYTES, REQUEST_TIMEOUT_SECS};

#[cfg(test)]
#[path = "routes_tests.rs"]
mod tests;

/// Create the router, mounting a route for each listener present in `state`.
pub fn create_router(state: AppState) -> Router {
    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
        .on_response(DefaultOnResponse::new().level(Level::INFO));

    let timeout_layer = TimeoutLayer::new(Duration::from_secs(REQUEST_TIMEOUT_SECS));

    let mut router = Router::new().route("/health", get(handlers::health_check));

    if state.github.is_some() {
        info!(path = "/github", "Mounting GitHub listener");
        router = router.route(
            "/github",
            post(handlers::github_webhook)
                .fallback(handlers::not_found)
                .layer(DefaultBodyLimit::max(GITHUB_MAX_BODY_BYTES)),
        );
    }
    if state.generic.is_some() {
        info!(path = "/send", "Mounting generic listener");
        router = router.route(
            "/send",
            post(handlers::generic_webhook).fallback(handlers::not_found),
        );
    }
    if state.grafana.is_some() {
        info!(path = "/grafana", "Mounting Grafana listener");
        router = router.route(
            "/grafana",
            post(handlers::grafana_webhook).fallback(handlers::not_found),
        );
    }

    router
        .layer(timeout_layer)
        .layer(trace_layer)
        .with_state(state)
}
