//! Integration tests for webhook delivery.
//!
//! These tests verify the request the sender makes and how it treats the
//! endpoint's response status.

use dungeonbell_monitor::config::Config;
use dungeonbell_monitor::sender::{Deliver, SenderError, WebhookSender};
use dungeonbell_monitor::types::Notification;
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// =============================================================================
// Test Helpers
// =============================================================================

fn create_test_sender(server_url: &str) -> WebhookSender {
    let config = Config::for_paths("/unused", "/unused", format!("{server_url}/hook"))
        .with_display("DungeonBell", "https://img.example.com/bell.png", "nh.example.org");
    WebhookSender::new(&config).expect("client should build")
}

fn started(name: &str) -> Notification {
    Notification::Started {
        name: name.to_string(),
    }
}

// =============================================================================
// Delivery Tests
// =============================================================================

#[tokio::test]
async fn test_posts_expected_payload() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/hook"))
        .and(header("content-type", "application/json"))
        .and(body_json(json!({
            "username": "DungeonBell",
            "avatar_url": "https://img.example.com/bell.png",
            "content": "alice started exploring.\n`$ telnet nh.example.org` to watch the game in progress!",
            "embeds": [],
            "tts": false
        })))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&mock_server)
        .await;

    let mut sender = create_test_sender(&mock_server.uri());
    let result = sender.deliver(&started("alice")).await;

    assert!(result.is_ok(), "Delivery should succeed: {:?}", result);
}

/// Only `204 No Content` counts as success, even other 2xx codes fail.
#[tokio::test]
async fn test_ok_status_is_not_success() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/hook"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&mock_server)
        .await;

    let mut sender = create_test_sender(&mock_server.uri());
    let result = sender.deliver(&started("alice")).await;

    assert!(matches!(
        result,
        Err(SenderError::UnexpectedStatus { status: 200, .. })
    ));
}

#[tokio::test]
async fn test_server_error_is_not_retried() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/hook"))
        .respond_with(ResponseTemplate::new(500).set_body_string("Internal server error"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let mut sender = create_test_sender(&mock_server.uri());
    let result = sender.deliver(&started("alice")).await;

    match result {
        Err(SenderError::UnexpectedStatus { status, message }) => {
            assert_eq!(status, 500);
            assert_eq!(message, "Internal server error");
        }
        other => panic!("expected UnexpectedStatus, got {other:?}"),
    }
}

#[tokio::test]
async fn test_unreachable_endpoint_is_http_error() {
    let mock_server = MockServer::start().await;
    let uri = mock_server.uri();
    drop(mock_server);

    let mut sender = create_test_sender(&uri);
    let result = sender.deliver(&started("alice")).await;

    assert!(matches!(result, Err(SenderError::Http(_))));
}
