//! HTTP request handlers
//!
//! Each webhook handler:
//! 1. Authenticates the request (HMAC signature or bearer token)
//! 2. Decodes the body into a typed payload
//! 3. Hands the event to the dispatcher
//! 4. Answers `200 OK` with an empty body
//!
//! Rejected requests are logged at warning level and get the same answer as
//! accepted ones.

use axum::{
    body::Bytes,
    extract::{ConnectInfo, State},
    http::{header, HeaderMap, StatusCode},
};
use std::net::SocketAddr;
use tracing::{debug, info, instrument, warn};

use relay_core::event::templates;
use relay_core::webhook::{
    authorize_bearer, decode, GITHUB_DELIVERY_HEADER, GITHUB_EVENT_HEADER,
    GITHUB_SIGNATURE_HEADER,
};
use relay_core::{
    DispatchOutcome, GenericMessage, GitHubEvent, GrafanaAlert, Interest, WebhookHeaders,
};

use crate::{AppState, ListenerState};

#[cfg(test)]
#[path = "handlers_tests.rs"]
mod tests;

type Peer = Option<ConnectInfo<SocketAddr>>;

fn peer_label(peer: &Peer) -> String {
    peer.as_ref()
        .map(|ConnectInfo(addr)| addr.to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|value| value.to_str().ok())
}

fn log_outcome(outcome: &DispatchOutcome) {
    match outcome {
        DispatchOutcome::Delivered(report) => info!(
            channel = %report.channel,
            chat_lines = report.chat.map_or(0, |c| c.sent),
            feed_posts = report.feed.as_ref().map_or(0, |f| f.posted.len()),
            "Event delivered"
        ),
        other => debug!(outcome = ?other, "Event not delivered"),
    }
}

/// GET /health
pub async fn health_check() -> StatusCode {
    StatusCode::OK
}

/// Answer for any method other than the one a route accepts.
pub async fn not_found() -> StatusCode {
    StatusCode::NOT_FOUND
}

/// POST /github
#[instrument(
    name = "github_webhook",
    skip_all,
    fields(
        peer = %peer_label(&peer),
        event = header_str(&headers, GITHUB_EVENT_HEADER).unwrap_or(""),
        delivery = header_str(&headers, GITHUB_DELIVERY_HEADER).unwrap_or(""),
    )
)]
pub async fn github_webhook(
    State(state): State<AppState>,
    peer: Peer,
    headers: HeaderMap,
    body: Bytes,
) -> StatusCode {
    let Some(listener) = state.github.as_deref() else {
        return StatusCode::NOT_FOUND;
    };

    let webhook_headers = WebhookHeaders {
        event: header_str(&headers, GITHUB_EVENT_HEADER),
        signature: header_str(&headers, GITHUB_SIGNATURE_HEADER),
        delivery: header_str(&headers, GITHUB_DELIVERY_HEADER),
    };

    let webhook = match listener.parser.parse(webhook_headers, &body) {
        Ok(webhook) => webhook,
        Err(e) => {
            warn!(error = %e, "Rejected GitHub webhook");
            return StatusCode::OK;
        }
    };

    if let GitHubEvent::Ping(ping) = &webhook.event {
        info!(
            hook_id = ping.hook_id,
            zen = ping.zen.as_deref().unwrap_or(""),
            "Received GitHub ping"
        );
        return StatusCode::OK;
    }

    let outcome = state
        .dispatcher
        .dispatch_github(&webhook, &listener.router)
        .await;
    log_outcome(&outcome);

    StatusCode::OK
}

/// Authenticates a bearer-protected request. Logs and returns `false` on
/// failure.
fn authorized(listener: &ListenerState, headers: &HeaderMap) -> bool {
    match authorize_bearer(
        listener.secret.as_ref(),
        header_str(headers, header::AUTHORIZATION.as_str()),
    ) {
        Ok(()) => true,
        Err(e) => {
            warn!(error = %e, "Rejected webhook");
            false
        }
    }
}

/// POST /send
#[instrument(name = "generic_webhook", skip_all, fields(peer = %peer_label(&peer)))]
pub async fn generic_webhook(
    State(state): State<AppState>,
    peer: Peer,
    headers: HeaderMap,
    body: Bytes,
) -> StatusCode {
    let Some(listener) = state.generic.as_deref() else {
        return StatusCode::NOT_FOUND;
    };
    if !authorized(listener, &headers) {
        return StatusCode::OK;
    }

    let decoded = match decode::<GenericMessage>(&body) {
        Ok(decoded) => decoded,
        Err(e) => {
            warn!(error = %e, "Rejected generic message");
            return StatusCode::OK;
        }
    };

    let outcome = state
        .dispatcher
        .dispatch(
            &Interest::chat(templates::GENERIC_CHAT),
            &decoded.context,
            &listener.router,
        )
        .await;
    log_outcome(&outcome);

    StatusCode::OK
}

/// POST /grafana
#[instrument(name = "grafana_webhook", skip_all, fields(peer = %peer_label(&peer)))]
pub async fn grafana_webhook(
    State(state): State<AppState>,
    peer: Peer,
    headers: HeaderMap,
    body: Bytes,
) -> StatusCode {
    let Some(listener) = state.grafana.as_deref() else {
        return StatusCode::NOT_FOUND;
    };
    if !authorized(listener, &headers) {
        return StatusCode::OK;
    }

    let decoded = match decode::<GrafanaAlert>(&body) {
        Ok(decoded) => decoded,
        Err(e) => {
            warn!(error = %e, "Rejected Grafana alert");
            return StatusCode::OK;
        }
    };
    debug!(
        state = decoded.payload.state().unwrap_or("unknown"),
        title = decoded.payload.title.as_deref().unwrap_or(""),
        "Received Grafana alert"
    );

    let outcome = state
        .dispatcher
        .dispatch(
            &Interest::chat(templates::GRAFANA_ALERT_CHAT),
            &decoded.context,
            &listener.router,
        )
        .await;
    log_outcome(&outcome);

    StatusCode::OK
}
