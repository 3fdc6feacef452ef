//! HTTP contract tests for `GitHubActionsClient` against a mock API server.

use std::time::Duration;

use actions_client::{
    ActionsApi, ClientConfig, ClientError, GitHubActionsClient, RunId, RunStatus,
    MAX_ERROR_BODY_CHARS,
};
use serde_json::json;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> GitHubActionsClient {
    GitHubActionsClient::new(ClientConfig::new("secret-token").with_base_url(&server.uri()))
        .expect("client should build")
}

fn run_json(id: u64, created_at: &str) -> serde_json::Value {
    json!({
        "id": id,
        "name": "CI",
        "head_branch": "main",
        "html_url": format!("https://github.com/acme/widgets/actions/runs/{id}"),
        "created_at": created_at,
        "status": "completed",
        "conclusion": "failure"
    })
}

#[tokio::test]
async fn list_failed_runs_sends_auth_and_version_headers() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/repos/acme/widgets/actions/runs"))
        .and(query_param("status", "failure"))
        .and(query_param("per_page", "2"))
        .and(header("authorization", "Bearer secret-token"))
        .and(header("accept", "application/vnd.github+json"))
        .and(header("x-github-api-version", "2022-11-28"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "total_count": 2,
            "workflow_runs": [
                run_json(22, "2024-03-02T09:00:00Z"),
                run_json(11, "2024-03-01T09:00:00Z"),
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let runs = client_for(&server)
        .list_failed_runs("acme", "widgets", 2)
        .await
        .unwrap();

    assert_eq!(runs.len(), 2);
    assert_eq!(runs[0].id, RunId(22));
    assert_eq!(runs[1].id, RunId(11));
    assert!(runs.iter().all(|r| r.status == RunStatus::Failure));
}

#[tokio::test]
async fn list_failed_runs_orders_newest_first_and_caps_count() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/repos/acme/widgets/actions/runs"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "workflow_runs": [
                run_json(1, "2024-03-01T09:00:00Z"),
                run_json(3, "2024-03-03T09:00:00Z"),
                run_json(2, "2024-03-02T09:00:00Z"),
            ]
        })))
        .mount(&server)
        .await;

    let runs = client_for(&server)
        .list_failed_runs("acme", "widgets", 2)
        .await
        .unwrap();

    let ids: Vec<u64> = runs.iter().map(|r| r.id.0).collect();
    assert_eq!(ids, vec![3, 2]);
}

#[tokio::test]
async fn owner_and_repo_are_percent_encoded_in_the_path() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/repos/acme%20corp/CHATOPS-BOT%20/actions/runs"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "workflow_runs": [] })))
        .expect(1)
        .mount(&server)
        .await;

    let runs = client_for(&server)
        .list_failed_runs("acme corp", "CHATOPS-BOT ", 1)
        .await
        .unwrap();
    assert!(runs.is_empty());
}

#[tokio::test]
async fn dot_segment_identifiers_never_reach_the_server() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "workflow_runs": [] })))
        .expect(0)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let err = client.list_failed_runs("acme", "..", 1).await.unwrap_err();
    assert_eq!(err, ClientError::InvalidIdentifier("..".to_string()));

    let err = client
        .get_log_archive(".", "..", RunId(42))
        .await
        .unwrap_err();
    assert_eq!(err, ClientError::InvalidIdentifier(".".to_string()));
}

#[tokio::test]
async fn get_run_fetches_single_run() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/repos/acme/widgets/actions/runs/7001"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(run_json(7001, "2024-03-01T09:00:00Z")),
        )
        .mount(&server)
        .await;

    let run = client_for(&server)
        .get_run("acme", "widgets", RunId(7001))
        .await
        .unwrap();
    assert_eq!(run.id, RunId(7001));
    assert_eq!(run.head_branch.as_deref(), Some("main"));
}

#[tokio::test]
async fn get_log_archive_follows_redirect_and_returns_bytes() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/repos/acme/widgets/actions/runs/7001/logs"))
        .respond_with(
            ResponseTemplate::new(302)
                .insert_header("location", format!("{}/blobs/logs.zip", server.uri()).as_str()),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/blobs/logs.zip"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"PK\x05\x06zip-bytes".to_vec()))
        .mount(&server)
        .await;

    let bytes = client_for(&server)
        .get_log_archive("acme", "widgets", RunId(7001))
        .await
        .unwrap();
    assert_eq!(bytes, b"PK\x05\x06zip-bytes".to_vec());
}

#[tokio::test]
async fn non_success_status_is_a_transport_error_with_truncated_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/repos/acme/widgets/actions/runs"))
        .respond_with(ResponseTemplate::new(500).set_body_string("e".repeat(5000)))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .list_failed_runs("acme", "widgets", 1)
        .await
        .unwrap_err();

    match err {
        ClientError::Transport { status, body } => {
            assert_eq!(status, Some(500));
            assert_eq!(body.chars().count(), MAX_ERROR_BODY_CHARS + 1);
            assert!(body.ends_with('…'));
        }
        other => panic!("expected transport error, got {other:?}"),
    }
}

#[tokio::test]
async fn not_found_keeps_status_and_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/repos/acme/widgets/actions/runs/1"))
        .respond_with(ResponseTemplate::new(404).set_body_string(r#"{"message":"Not Found"}"#))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .get_run("acme", "widgets", RunId(1))
        .await
        .unwrap_err();
    assert_eq!(
        err,
        ClientError::Transport {
            status: Some(404),
            body: r#"{"message":"Not Found"}"#.to_string(),
        }
    );
}

#[tokio::test]
async fn undecodable_listing_is_a_transport_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/repos/acme/widgets/actions/runs"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .list_failed_runs("acme", "widgets", 1)
        .await
        .unwrap_err();
    match err {
        ClientError::Transport { status, body } => {
            assert_eq!(status, Some(200));
            assert!(body.contains("invalid JSON payload"));
        }
        other => panic!("expected transport error, got {other:?}"),
    }
}

#[tokio::test]
async fn slow_response_hits_the_request_deadline() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/repos/acme/widgets/actions/runs"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "workflow_runs": [] }))
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&server)
        .await;

    let client = GitHubActionsClient::new(
        ClientConfig::new("secret-token")
            .with_base_url(&server.uri())
            .with_timeout(Duration::from_millis(100)),
    )
    .unwrap();

    let err = client
        .list_failed_runs("acme", "widgets", 1)
        .await
        .unwrap_err();
    match err {
        ClientError::Transport { status, body } => {
            assert_eq!(status, None);
            assert!(body.contains("timed out"), "unexpected body: {body}");
        }
        other => panic!("expected transport error, got {other:?}"),
    }
}
