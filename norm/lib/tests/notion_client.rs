//! Integration tests for the HTTP client against a mock Notion server.

use std::time::Duration;

use norm_lib::client::{NotionApi, NotionClient};
use norm_lib::config::RetryPolicy;
use norm_lib::error::RemoteError;
use serde_json::json;
use url::Url;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client(server: &MockServer, retry: RetryPolicy) -> NotionClient {
    NotionClient::builder(Url::parse(&server.uri()).unwrap())
        .token("secret_test")
        .retry(retry)
        .timeout(Duration::from_secs(5))
        .build()
        .unwrap()
}

fn fast_retry() -> RetryPolicy {
    RetryPolicy {
        max_attempts: 3,
        base_delay: Duration::from_millis(10),
    }
}

fn error_body(status: u16, code: &str, message: &str) -> serde_json::Value {
    json!({ "object": "error", "status": status, "code": code, "message": message })
}

#[tokio::test]
async fn retrieve_database_sends_auth_and_version_headers() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/databases/db1"))
        .and(header("authorization", "Bearer secret_test"))
        .and(header("notion-version", "2022-06-28"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "object": "database",
            "id": "db1",
            "title": [{ "plain_text": "Tasks" }],
            "properties": {
                "Name": { "id": "title", "name": "Name", "type": "title", "title": {} },
                "Status": {
                    "id": "s",
                    "name": "Status",
                    "type": "select",
                    "select": { "options": [{ "name": "Todo" }, { "name": "Done" }] }
                }
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let database = client(&server, RetryPolicy::none())
        .retrieve_database("db1")
        .await
        .unwrap();

    assert_eq!(database.title_text(), "Tasks");
    assert_eq!(database.property("name").map(|p| p.kind.as_str()), Some("title"));
    assert_eq!(database.property("Status").unwrap().options(), ["Todo", "Done"]);
}

#[tokio::test]
async fn query_posts_body_without_database_id() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/databases/db1/query"))
        .and(body_json(json!({
            "filter": { "property": "done", "checkbox": { "equals": true } },
            "page_size": 5
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "object": "list",
            "results": [{
                "object": "page",
                "id": "p1",
                "created_time": "2024-05-01T10:00:00.000Z",
                "last_edited_time": "2024-05-01T10:00:00.000Z",
                "properties": {}
            }],
            "next_cursor": "c2",
            "has_more": true
        })))
        .expect(1)
        .mount(&server)
        .await;

    let response = client(&server, RetryPolicy::none())
        .query_database(&json!({
            "database_id": "db1",
            "filter": { "property": "done", "checkbox": { "equals": true } },
            "page_size": 5
        }))
        .await
        .unwrap();

    assert_eq!(response.results.len(), 1);
    assert_eq!(response.results[0].id, "p1");
    assert_eq!(response.next_cursor.as_deref(), Some("c2"));
    assert!(response.has_more);
}

#[tokio::test]
async fn not_found_is_terminal() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/databases/missing"))
        .respond_with(
            ResponseTemplate::new(404).set_body_json(error_body(404, "object_not_found", "Could not find database")),
        )
        .expect(1)
        .mount(&server)
        .await;

    let err = client(&server, fast_retry())
        .retrieve_database("missing")
        .await
        .unwrap_err();

    assert!(err.is_not_found());
}

#[tokio::test]
async fn unauthorized_is_terminal() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/pages/p1"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(error_body(401, "unauthorized", "API token is invalid.")),
        )
        .expect(1)
        .mount(&server)
        .await;

    let err = client(&server, fast_retry())
        .retrieve_page("p1")
        .await
        .unwrap_err();

    assert!(matches!(err, RemoteError::Unauthorized { .. }));
}

#[tokio::test]
async fn validation_errors_are_not_retried() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/databases/db1/query"))
        .respond_with(ResponseTemplate::new(400).set_body_json(error_body(
            400,
            "validation_error",
            "body.filter.rich_text should be defined",
        )))
        .expect(1)
        .mount(&server)
        .await;

    let err = client(&server, fast_retry())
        .query_database(&json!({ "database_id": "db1" }))
        .await
        .unwrap_err();

    assert_eq!(err.code(), Some("validation_error"));
}

#[tokio::test]
async fn server_errors_are_retried_until_success() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/pages/p1"))
        .respond_with(ResponseTemplate::new(502).set_body_string("bad gateway"))
        .up_to_n_times(2)
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/pages/p1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "object": "page",
            "id": "p1",
            "properties": {}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let page = client(&server, fast_retry()).retrieve_page("p1").await.unwrap();

    assert_eq!(page.id, "p1");
}

#[tokio::test]
async fn last_error_surfaces_when_attempts_run_out() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/pages/p1"))
        .respond_with(
            ResponseTemplate::new(429).set_body_json(error_body(429, "rate_limited", "slow down")),
        )
        .expect(3)
        .mount(&server)
        .await;

    let err = client(&server, fast_retry())
        .retrieve_page("p1")
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        RemoteError::HttpStatus { status: 429, ref code, .. } if code == "rate_limited"
    ));
}

#[tokio::test]
async fn slow_responses_time_out() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/pages/p1"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "object": "page", "id": "p1", "properties": {} }))
                .set_delay(Duration::from_millis(500)),
        )
        .mount(&server)
        .await;

    let client = NotionClient::builder(Url::parse(&server.uri()).unwrap())
        .token("secret_test")
        .retry(RetryPolicy::none())
        .timeout(Duration::from_millis(50))
        .build()
        .unwrap();

    let err = client.retrieve_page("p1").await.unwrap_err();

    assert!(matches!(err, RemoteError::Timeout { duration_ms: 50 }));
    assert!(!err.is_retryable());
}
