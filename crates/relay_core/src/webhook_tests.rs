use super::*;
use crate::event::GenericMessage;
use crate::signature::compute_signature;
use serde_json::json;

const SECRET: &str = "webhook-secret";

fn push_body() -> Vec<u8> {
    serde_json::to_vec(&json!({
        "ref": "refs/heads/main",
        "compare": "https://github.com/acme/widget/compare/a...b",
        "repository": { "name": "widget", "full_name": "acme/widget" },
        "pusher": { "name": "octocat" },
        "commits": [
            { "id": "0123456789abcdef", "message": "Fix the thing\n\nLonger body" }
        ]
    }))
    .unwrap()
}

fn signed_parser() -> GitHubWebhookParser {
    GitHubWebhookParser::new(Some(SecretString::from(SECRET.to_string())))
}

#[test]
fn test_parse_signed_push() {
    let body = push_body();
    let signature = compute_signature(SECRET, &body).unwrap();
    let headers = WebhookHeaders {
        event: Some("push"),
        signature: Some(&signature),
        delivery: Some("72d3162e-cc78-11e3-81ab-4c9367dc0958"),
    };

    let webhook = signed_parser().parse(headers, &body).unwrap();

    let GitHubEvent::Push(push) = &webhook.event else {
        panic!("expected a push event, got {:?}", webhook.event);
    };
    assert_eq!(push.git_ref, "refs/heads/main");
    assert_eq!(push.repository.name, "widget");
    assert_eq!(push.commits.len(), 1);
    assert_eq!(webhook.context["pusher"]["name"], "octocat");
    assert_eq!(
        webhook.delivery_id.as_deref(),
        Some("72d3162e-cc78-11e3-81ab-4c9367dc0958")
    );
}

#[test]
fn test_invalid_signature_is_rejected() {
    let body = push_body();
    let signature = compute_signature("some-other-secret", &body).unwrap();
    let headers = WebhookHeaders {
        event: Some("push"),
        signature: Some(&signature),
        delivery: None,
    };

    assert_eq!(
        signed_parser().parse(headers, &body),
        Err(WebhookError::InvalidSignature)
    );
}

#[test]
fn test_missing_signature_is_rejected_when_secret_configured() {
    let headers = WebhookHeaders {
        event: Some("push"),
        ..Default::default()
    };

    assert_eq!(
        signed_parser().parse(headers, &push_body()),
        Err(WebhookError::MissingSignature)
    );
}

#[test]
fn test_signature_not_checked_without_secret() {
    let headers = WebhookHeaders {
        event: Some("push"),
        signature: Some("sha256=deadbeef"),
        delivery: None,
    };

    let webhook = GitHubWebhookParser::new(None)
        .parse(headers, &push_body())
        .unwrap();
    assert_eq!(webhook.event.kind(), GitHubEventKind::Push);
}

#[test]
fn test_signature_checked_before_body_is_decoded() {
    let body = b"not json at all";
    let headers = WebhookHeaders {
        event: Some("push"),
        signature: Some("sha256=00"),
        delivery: None,
    };

    assert_eq!(
        signed_parser().parse(headers, body),
        Err(WebhookError::InvalidSignature)
    );
}

#[test]
fn test_missing_and_unsupported_event_header() {
    let parser = GitHubWebhookParser::new(None);

    assert_eq!(
        parser.parse(WebhookHeaders::default(), &push_body()),
        Err(WebhookError::MissingEventHeader)
    );

    let headers = WebhookHeaders {
        event: Some("deployment_status"),
        ..Default::default()
    };
    assert_eq!(
        parser.parse(headers, &push_body()),
        Err(WebhookError::UnsupportedEvent("deployment_status".to_string()))
    );
}

#[test]
fn test_body_not_matching_event_shape_is_malformed() {
    let headers = WebhookHeaders {
        event: Some("issues"),
        ..Default::default()
    };

    let result = GitHubWebhookParser::new(None).parse(headers, &push_body());
    assert!(matches!(result, Err(WebhookError::MalformedPayload(_))));
}

#[test]
fn test_parse_issue_comment() {
    let body = serde_json::to_vec(&json!({
        "action": "created",
        "issue": { "number": 3, "title": "Crash on start" },
        "comment": { "body": "Same here" },
        "repository": { "name": "Widget" }
    }))
    .unwrap();
    let headers = WebhookHeaders {
        event: Some("issue_comment"),
        ..Default::default()
    };

    let webhook = GitHubWebhookParser::new(None).parse(headers, &body).unwrap();
    let interest = webhook.event.interest().unwrap();
    assert_eq!(interest.repository.as_deref(), Some("Widget"));
}

#[test]
fn test_debug_does_not_leak_secret() {
    let rendered = format!("{:?}", signed_parser());
    assert!(!rendered.contains(SECRET));
}

#[test]
fn test_authorize_bearer() {
    let secret = SecretString::from("token".to_string());

    assert_eq!(authorize_bearer(None, None), Ok(()));
    assert_eq!(authorize_bearer(Some(&secret), Some("Bearer token")), Ok(()));
    assert_eq!(
        authorize_bearer(Some(&secret), Some("Bearer nope")),
        Err(WebhookError::Unauthorized)
    );
    assert_eq!(
        authorize_bearer(Some(&secret), None),
        Err(WebhookError::Unauthorized)
    );
}

#[test]
fn test_decode_generic_message() {
    let decoded: Decoded<GenericMessage> = decode(br#"{"message":"deploy done"}"#).unwrap();
    assert_eq!(decoded.payload.message, "deploy done");
    assert_eq!(decoded.context["message"], "deploy done");

    let missing = decode::<GenericMessage>(br#"{"text":"deploy done"}"#);
    assert!(matches!(missing, Err(WebhookError::MalformedPayload(_))));
}
