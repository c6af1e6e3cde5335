//! Request-level tests for the ingest router.

use std::sync::Arc;

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Method, Request, StatusCode, header};
use rstest::{fixture, rstest};
use serde_json::{Value, json};
use tower::ServiceExt;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use super::{IngestSettings, IngestState, router};
use crate::github::{
    CommentError, CommentGateway, IssueComment, MockCommentGateway, PersonalAccessToken,
};

const ENDPOINT: &str = "/api/log-error";

#[fixture]
fn settings() -> IngestSettings {
    IngestSettings {
        token: Some(PersonalAccessToken::new("ghp_test").expect("token")),
        ..IngestSettings::default()
    }
}

fn app(settings: IngestSettings, mock: Option<MockCommentGateway>) -> Router {
    let gateway = mock.map(|gateway| Arc::new(gateway) as Arc<dyn CommentGateway>);
    router(Arc::new(IngestState::with_gateway(settings, gateway)))
}

fn entry(message: &str, pr_number: Option<u64>) -> Value {
    let mut value = json!({
        "message": message,
        "level": "error",
        "timestamp": "2025-01-02T03:04:05.000Z",
        "url": "https://web-git-pr-42-octo.vercel.app/",
        "userAgent": "TestAgent/1.0",
        "deviceInfo": {}
    });
    if let (Some(number), Some(fields)) = (pr_number, value.as_object_mut()) {
        fields.insert("prNumber".to_owned(), json!(number));
    }
    value
}

fn batch(logs: Vec<Value>) -> Value {
    json!({ "logs": logs, "config": { "repository": "web", "owner": "octo" } })
}

async fn send(app: Router, method: Method, body: String) -> (StatusCode, Option<String>, Value) {
    let request = Request::builder()
        .method(method)
        .uri(ENDPOINT)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body))
        .expect("request should build");
    let response = app.oneshot(request).await.expect("router is infallible");
    let status = response.status();
    let allow = response
        .headers()
        .get(header::ALLOW)
        .and_then(|value| value.to_str().ok())
        .map(str::to_owned);
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body should read");
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, allow, body)
}

fn comment(id: u64, body: &str) -> IssueComment {
    IssueComment {
        id,
        body: Some(body.to_owned()),
        author: None,
    }
}

fn untouched_gateway() -> MockCommentGateway {
    let mut gateway = MockCommentGateway::new();
    gateway.expect_repository_access().never();
    gateway.expect_list_issue_comments().never();
    gateway.expect_create_issue_comment().never();
    gateway.expect_update_issue_comment().never();
    gateway
}

#[rstest]
#[case::get(Method::GET)]
#[case::put(Method::PUT)]
#[case::delete(Method::DELETE)]
#[tokio::test]
async fn rejects_non_post_methods(settings: IngestSettings, #[case] verb: Method) {
    let (status, allow, body) = send(
        app(settings, Some(untouched_gateway())),
        verb,
        String::new(),
    )
    .await;

    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(allow.as_deref(), Some("POST"));
    assert_eq!(body, json!({ "error": "Method not allowed" }));
}

#[rstest]
#[case::not_json("not json".to_owned())]
#[case::missing(json!({ "config": {} }).to_string())]
#[case::empty(json!({ "logs": [] }).to_string())]
#[case::not_array(json!({ "logs": "boom" }).to_string())]
#[tokio::test]
async fn rejects_bodies_without_logs(settings: IngestSettings, #[case] payload: String) {
    let (status, _, body) = send(
        app(settings, Some(untouched_gateway())),
        Method::POST,
        payload,
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "error": "No logs provided" }));
}

#[rstest]
#[tokio::test]
async fn rejects_entries_that_do_not_decode(settings: IngestSettings) {
    let payload = batch(vec![json!({ "message": "boom" })]);

    let (status, _, body) = send(
        app(settings, Some(untouched_gateway())),
        Method::POST,
        payload.to_string(),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body.get("error"), Some(&json!("Invalid log entries")));
    let details = body
        .get("details")
        .and_then(Value::as_str)
        .expect("details present");
    assert!(details.contains("level"), "details name the field: {details}");
}

#[rstest]
#[tokio::test]
async fn reports_missing_token() {
    let payload = batch(vec![entry("boom", Some(42))]);

    let (status, _, body) = send(
        app(IngestSettings::default(), None),
        Method::POST,
        payload.to_string(),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({ "error": "GitHub token not configured" }));
}

#[rstest]
#[case::no_config(json!({ "logs": [entry("boom", Some(42))] }))]
#[case::blank_values(json!({
    "logs": [entry("boom", Some(42))],
    "config": { "repository": "", "owner": " " }
}))]
#[case::owner_only(json!({
    "logs": [entry("boom", Some(42))],
    "config": { "owner": "octo" }
}))]
#[tokio::test]
async fn requires_repository_information(settings: IngestSettings, #[case] payload: Value) {
    let (status, _, body) = send(
        app(settings, Some(untouched_gateway())),
        Method::POST,
        payload.to_string(),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "error": "Repository information not available" }));
}

#[rstest]
#[case::absent(None)]
#[case::zero(Some(0))]
#[tokio::test]
async fn skips_github_without_pr_number(settings: IngestSettings, #[case] pr: Option<u64>) {
    let payload = batch(vec![entry("boom", pr), entry("later", Some(7))]);

    let (status, _, body) = send(
        app(settings, Some(untouched_gateway())),
        Method::POST,
        payload.to_string(),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({ "message": "Logs received but no PR number found" })
    );
}

#[rstest]
#[tokio::test]
async fn reports_failed_access_probe(settings: IngestSettings) {
    let mut gateway = MockCommentGateway::new();
    gateway.expect_repository_access().times(1).returning(|_| {
        Err(CommentError::Authentication {
            message: "Bad credentials".to_owned(),
        })
    });
    gateway.expect_list_issue_comments().never();
    let payload = batch(vec![entry("boom", Some(42))]);

    let (status, _, body) = send(app(settings, Some(gateway)), Method::POST, payload.to_string()).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({ "error": "GitHub access verification failed" }));
}

#[rstest]
#[tokio::test]
async fn reports_comment_failures_with_details(settings: IngestSettings) {
    let mut gateway = MockCommentGateway::new();
    gateway.expect_repository_access().returning(|_| Ok(()));
    gateway.expect_list_issue_comments().returning(|_, _| {
        Err(CommentError::Api {
            message: "issue comments failed with status 502 Bad Gateway: upstream".to_owned(),
        })
    });
    let payload = batch(vec![entry("boom", Some(42))]);

    let (status, _, body) = send(app(settings, Some(gateway)), Method::POST, payload.to_string()).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body.get("error"), Some(&json!("Failed to process error logs")));
    let details = body
        .get("details")
        .and_then(Value::as_str)
        .expect("details present");
    assert!(details.contains("502"), "{details}");
}

#[rstest]
#[tokio::test]
async fn comments_on_first_entry_pull_request(settings: IngestSettings) {
    let mut gateway = MockCommentGateway::new();
    gateway
        .expect_repository_access()
        .withf(|locator| locator.slug() == "octo/web")
        .times(1)
        .returning(|_| Ok(()));
    gateway
        .expect_list_issue_comments()
        .withf(|_, number| number.get() == 42)
        .times(1)
        .returning(|_, _| Ok(Vec::new()));
    gateway
        .expect_create_issue_comment()
        .withf(|_, number, body| {
            number.get() == 42 && body.contains("boom") && body.contains("stray")
        })
        .times(1)
        .returning(|_, _, body| Ok(comment(501, body)));
    let payload = batch(vec![entry("boom", Some(42)), entry("stray", Some(7))]);

    let (status, _, body) = send(app(settings, Some(gateway)), Method::POST, payload.to_string()).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({
            "message": "Error logs processed successfully",
            "prNumber": 42,
            "logCount": 2
        })
    );
}

#[rstest]
#[tokio::test]
async fn falls_back_to_server_repository(settings: IngestSettings) {
    let mut gateway = MockCommentGateway::new();
    gateway
        .expect_repository_access()
        .withf(|locator| locator.slug() == "acme/shop")
        .returning(|_| Ok(()));
    gateway
        .expect_list_issue_comments()
        .returning(|_, _| Ok(vec![comment(9, "<!-- pr-error-logger -->\nold")]));
    gateway
        .expect_update_issue_comment()
        .withf(|_, comment_id, _| *comment_id == 9)
        .times(1)
        .returning(|_, comment_id, body| Ok(comment(comment_id, body)));
    let configured = IngestSettings {
        owner: Some("acme".to_owned()),
        repository: Some("shop".to_owned()),
        ..settings
    };
    let payload = json!({ "logs": [entry("boom", Some(3))] });

    let (status, _, body) =
        send(app(configured, Some(gateway)), Method::POST, payload.to_string()).await;

    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body.get("prNumber"), Some(&json!(3)));
}

#[rstest]
#[tokio::test]
async fn creates_comment_through_github_api() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v3/repos/octo/web"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "full_name": "octo/web" })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v3/repos/octo/web/issues/42/comments"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/v3/repos/octo/web/issues/42/comments"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "id": 1001,
            "body": "<!-- pr-error-logger -->",
            "user": { "login": "bot" }
        })))
        .expect(1)
        .mount(&server)
        .await;
    let settings = IngestSettings {
        token: Some(PersonalAccessToken::new("ghp_test").expect("token")),
        api_base: format!("{}/api/v3", server.uri()),
        ..IngestSettings::default()
    };
    let state = IngestState::new(settings).expect("state should build");
    let payload = batch(vec![entry("boom", Some(42))]);

    let (status, _, body) = send(router(Arc::new(state)), Method::POST, payload.to_string()).await;

    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body.get("logCount"), Some(&json!(1)));
}

#[rstest]
#[tokio::test]
async fn batch_without_pr_number_never_reaches_github() {
    let server = MockServer::start().await;
    Mock::given(wiremock::matchers::any())
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;
    let settings = IngestSettings {
        token: Some(PersonalAccessToken::new("ghp_test").expect("token")),
        api_base: format!("{}/api/v3", server.uri()),
        ..IngestSettings::default()
    };
    let state = IngestState::new(settings).expect("state should build");
    let payload = batch(vec![entry("boom", None)]);

    let (status, _, body) = send(router(Arc::new(state)), Method::POST, payload.to_string()).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({ "message": "Logs received but no PR number found" })
    );
}
