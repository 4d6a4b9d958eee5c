//! Tests for server module

use super::*;
use crate::routes::create_router;
use crate::test_support::{fixture, push_body, GENERIC_TOKEN, GITHUB_SECRET};
use relay_core::signature::compute_signature;
use std::io::Write;
use std::time::Duration;
use tempfile::NamedTempFile;

fn loopback() -> SocketAddr {
    "127.0.0.1:0".parse().unwrap()
}

#[tokio::test]
async fn test_serves_webhooks_until_stopped() {
    let fixture = fixture();
    let server = RelayServer::start_on(loopback(), create_router(fixture.state.clone()), None)
        .await
        .unwrap();
    let base = format!("http://{}", server.local_addr());
    let client = reqwest::Client::new();

    let response = client
        .post(format!("{base}/send"))
        .bearer_auth(GENERIC_TOKEN)
        .json(&serde_json::json!({ "message": "hello from the network" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::OK);
    assert_eq!(response.text().await.unwrap(), "");

    let body = push_body("widget");
    let response = client
        .post(format!("{base}/github"))
        .header("x-github-event", "push")
        .header("x-hub-signature-256", compute_signature(GITHUB_SECRET, &body).unwrap())
        .body(body)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::OK);

    let response = client.get(format!("{base}/github")).send().await.unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::NOT_FOUND);

    let sent = fixture.chat.sent();
    assert_eq!(sent.len(), 2);
    assert_eq!(
        sent[0],
        ("#general".to_string(), "hello from the network".to_string())
    );
    assert_eq!(sent[1].0, "#builds");
    assert_eq!(fixture.feed.posts().len(), 2);

    drop(client);
    tokio::time::timeout(Duration::from_secs(5), server.stop())
        .await
        .expect("server did not stop")
        .unwrap();
}

#[tokio::test]
async fn test_stopped_server_refuses_connections() {
    let server = RelayServer::start_on(loopback(), create_router(fixture().state), None)
        .await
        .unwrap();
    let address = server.local_addr();

    server.stop().await.unwrap();

    assert!(tokio::net::TcpStream::connect(address).await.is_err());
}

#[tokio::test]
async fn test_bind_conflict_is_reported() {
    let occupied = TcpListener::bind(loopback()).await.unwrap();
    let address = occupied.local_addr().unwrap();

    let result = RelayServer::start_on(address, create_router(fixture().state), None).await;

    assert!(
        matches!(result, Err(ServerError::Bind { address: ref a, .. }) if *a == address.to_string())
    );
}

#[tokio::test]
async fn test_start_uses_configured_address() {
    let http = HttpConfig {
        listen: "127.0.0.1:0".to_string(),
        ..HttpConfig::default()
    };

    let server = RelayServer::start(&http, create_router(fixture().state))
        .await
        .unwrap();

    assert!(server.local_addr().ip().is_loopback());
    assert_ne!(server.local_addr().port(), 0);
    server.stop().await.unwrap();
}

#[tokio::test]
async fn test_start_with_tls_requires_certificate() {
    let http = HttpConfig {
        listen: "127.0.0.1:0".to_string(),
        tls: true,
        ..HttpConfig::default()
    };

    let result = RelayServer::start(&http, create_router(fixture().state)).await;

    assert!(matches!(
        result,
        Err(ServerError::Configuration(
            ConfigurationError::RequiredConfigMissing { .. }
        ))
    ));
}

#[tokio::test]
async fn test_wait_twice_returns_immediately() {
    let mut server = RelayServer::start_on(loopback(), create_router(fixture().state), None)
        .await
        .unwrap();

    server.shutdown();
    server.wait().await.unwrap();
    server.wait().await.unwrap();
}

#[tokio::test]
async fn test_start_resolves_host_names() {
    let http = HttpConfig {
        listen: "localhost:0".to_string(),
        ..HttpConfig::default()
    };

    let server = RelayServer::start(&http, create_router(fixture().state))
        .await
        .unwrap();

    assert!(server.local_addr().ip().is_loopback());
    server.stop().await.unwrap();
}

fn pem_file(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

#[tokio::test]
async fn test_serves_webhooks_over_tls() {
    let certified = rcgen::generate_simple_self_signed(vec!["relay.test".to_string()]).unwrap();
    let cert_pem = certified.cert.pem();
    let cert = pem_file(&cert_pem);
    let key = pem_file(&certified.key_pair.serialize_pem());

    let http = HttpConfig {
        listen: "127.0.0.1:0".to_string(),
        tls: true,
        tls_cert: Some(cert.path().to_path_buf()),
        tls_key: Some(key.path().to_path_buf()),
        ..HttpConfig::default()
    };
    let fixture = fixture();
    let server = RelayServer::start(&http, create_router(fixture.state.clone()))
        .await
        .unwrap();

    let client = reqwest::Client::builder()
        .add_root_certificate(reqwest::Certificate::from_pem(cert_pem.as_bytes()).unwrap())
        .resolve("relay.test", server.local_addr())
        .build()
        .unwrap();
    let base = format!("https://relay.test:{}", server.local_addr().port());

    let body = push_body("widget");
    let response = client
        .post(format!("{base}/github"))
        .header("x-github-event", "push")
        .header("x-hub-signature-256", compute_signature(GITHUB_SECRET, &body).unwrap())
        .body(body)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::OK);
    assert_eq!(response.text().await.unwrap(), "");

    let sent = fixture.chat.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].0, "#builds");
    assert_eq!(fixture.feed.posts().len(), 2);

    let response = client.get(format!("{base}/health")).send().await.unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::OK);

    drop(client);
    tokio::time::timeout(Duration::from_secs(5), server.stop())
        .await
        .expect("server did not stop")
        .unwrap();
}

#[tokio::test]
async fn test_plain_client_is_refused_by_tls_server() {
    let certified = rcgen::generate_simple_self_signed(vec!["relay.test".to_string()]).unwrap();
    let cert = pem_file(&certified.cert.pem());
    let key = pem_file(&certified.key_pair.serialize_pem());
    let http = HttpConfig {
        listen: "127.0.0.1:0".to_string(),
        tls: true,
        tls_cert: Some(cert.path().to_path_buf()),
        tls_key: Some(key.path().to_path_buf()),
        ..HttpConfig::default()
    };
    let fixture = fixture();
    let server = RelayServer::start(&http, create_router(fixture.state.clone()))
        .await
        .unwrap();

    let result = reqwest::Client::new()
        .post(format!("http://{}/send", server.local_addr()))
        .bearer_auth(GENERIC_TOKEN)
        .json(&serde_json::json!({ "message": "not encrypted" }))
        .send()
        .await;

    assert!(result.is_err());
    assert!(fixture.chat.sent().is_empty());
    server.stop().await.unwrap();
}
