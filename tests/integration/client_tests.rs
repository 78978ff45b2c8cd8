//! HTTP client tests
//!
//! Exercises [`HeadscaleClient`] against a local wiremock server.

use std::sync::Arc;
use std::time::Duration;

use serde_json::{json, Value};
use tokio_test::{assert_err, assert_ok};
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use headscale_admin::config::HeadscaleConfig;
use headscale_admin::services::{
    AppStore, HeadscaleClient, HeadscaleService, RequestOptions, Transport,
};
use headscale_admin::ApiError;

use crate::common::*;

const TEST_API_KEY: &str = keys::CURRENT_FORMAT;

fn client_for(server: &MockServer) -> HeadscaleClient {
    let config = HeadscaleConfig {
        url: server.uri(),
        api_key: TEST_API_KEY.to_string(),
        timeout_secs: 10,
        ssl_verify: true,
        ssl_ca: None,
    };
    HeadscaleClient::new(&config).unwrap()
}

#[tokio::test]
async fn test_get_sends_bearer_token() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/user"))
        .and(header("authorization", format!("Bearer {}", TEST_API_KEY).as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(users_response()))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let body = assert_ok!(client.get("/user", &RequestOptions::default()).await);

    assert_eq!(body, users_response());
}

#[tokio::test]
async fn test_gateway_error_message_is_surfaced() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/node"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "code": 5,
            "message": "node not found",
            "details": []
        })))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let err = assert_err!(client.get("/node", &RequestOptions::default()).await);

    match err {
        ApiError::Status { status, body } => {
            assert_eq!(status, 404);
            assert_eq!(body, "node not found");
        }
        other => panic!("expected status error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_plain_error_body_is_kept() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/policy"))
        .respond_with(ResponseTemplate::new(503).set_body_string("upstream unavailable"))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let err = assert_err!(client.get("/policy", &RequestOptions::default()).await);

    assert_eq!(err.status(), Some(503));
    assert!(err.to_string().contains("upstream unavailable"));
}

#[tokio::test]
async fn test_large_error_page_is_truncated() {
    let server = MockServer::start().await;
    let page = format!("<html><body>{}</body></html>", "gateway error ".repeat(500));
    Mock::given(method("GET"))
        .and(path("/api/v1/node"))
        .respond_with(ResponseTemplate::new(502).set_body_string(page.clone()))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let err = assert_err!(client.get("/node", &RequestOptions::default()).await);

    match err {
        ApiError::Status { status, body } => {
            assert_eq!(status, 502);
            assert!(body.len() < page.len());
            assert!(body.starts_with("<html><body>gateway error"));
            assert!(body.ends_with("... (truncated)"));
        }
        other => panic!("expected status error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_empty_body_decodes_to_null() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/api/v1/preauthkey"))
        .and(query_param("id", "44"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let body = assert_ok!(
        client
            .delete("/preauthkey?id=44", &RequestOptions::default())
            .await
    );

    assert_eq!(body, Value::Null);
}

#[tokio::test]
async fn test_post_sends_json_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/apikey/expire"))
        .and(body_json(json!({ "prefix": keys::CURRENT_PREFIX })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let body = assert_ok!(
        client
            .post(
                "/apikey/expire",
                json!({ "prefix": keys::CURRENT_PREFIX }),
                &RequestOptions::default()
            )
            .await
    );

    assert_eq!(body, json!({}));
}

#[tokio::test]
async fn test_request_headers_are_forwarded() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/node"))
        .and(header("x-request-id", "req-42"))
        .respond_with(ResponseTemplate::new(200).set_body_json(nodes_response()))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let opts = RequestOptions::new().header("X-Request-Id", "req-42");

    assert_ok!(client.get("/node", &opts).await);
}

#[tokio::test]
async fn test_request_timeout_override() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/user"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(users_response())
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&server)
        .await;

    let client = client_for(&server);
    let opts = RequestOptions::new().timeout(Duration::from_millis(100));
    let err = assert_err!(client.get("/user", &opts).await);

    assert!(matches!(err, ApiError::Transport(_)));
}

#[tokio::test]
async fn test_malformed_body_is_decode_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/user"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>login</html>"))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let err = assert_err!(client.get("/user", &RequestOptions::default()).await);

    assert!(matches!(err, ApiError::Decode(_)));
}

#[tokio::test]
async fn test_unreachable_server_is_transport_error() {
    let config = HeadscaleConfig {
        url: "http://127.0.0.1:1".to_string(),
        api_key: TEST_API_KEY.to_string(),
        timeout_secs: 5,
        ssl_verify: true,
        ssl_ca: None,
    };
    let client = HeadscaleClient::new(&config).unwrap();

    let err = assert_err!(client.get("/user", &RequestOptions::default()).await);

    assert!(matches!(err, ApiError::Transport(_)));
}

#[tokio::test]
async fn test_service_over_http_deletes_and_prunes() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/node"))
        .respond_with(ResponseTemplate::new(200).set_body_json(nodes_response()))
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/api/v1/node/1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/api/v1/node/2"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({
            "code": 13,
            "message": "database is locked"
        })))
        .mount(&server)
        .await;

    let service = HeadscaleService::new(Arc::new(client_for(&server)), Arc::new(AppStore::new()));
    let nodes = assert_ok!(service.get_nodes(&RequestOptions::default()).await);
    service.store().set_nodes(nodes.clone()).await;

    let remaining = assert_ok!(service.delete_node(&nodes[0]).await);
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].id, "2");

    let err = assert_err!(service.delete_node(&nodes[1]).await);
    assert_eq!(err.status(), Some(500));
    assert_eq!(service.store().nodes().await, remaining);
}
