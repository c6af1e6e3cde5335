//! Behavioural tests for the error log ingest endpoint.

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

use axum::body::{Body, to_bytes};
use axum::http::{Method, Request, header};
use pr_error_logger::server::router;
use pr_error_logger::github::PersonalAccessToken;
use pr_error_logger::{CommentError, IngestSettings, IngestState};
use rstest::fixture;
use rstest_bdd::Slot;
use rstest_bdd_macros::{ScenarioState, given, scenario, then, when};
use serde_json::{Value, json};
use tokio::runtime::Runtime;
use tower::ServiceExt;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Shared runtime wrapper that can be stored in rstest-bdd Slot.
#[derive(Clone)]
struct SharedRuntime(Rc<RefCell<Runtime>>);

impl SharedRuntime {
    fn new(runtime: Runtime) -> Self {
        Self(Rc::new(RefCell::new(runtime)))
    }

    fn block_on<F: std::future::Future>(&self, future: F) -> F::Output {
        self.0.borrow().block_on(future)
    }
}

/// Status and JSON body returned by the ingest endpoint.
#[derive(Clone, Debug)]
struct Reply {
    status: u16,
    body: Value,
}

#[derive(ScenarioState, Default)]
struct IngestScenario {
    runtime: Slot<SharedRuntime>,
    github: Slot<MockServer>,
    token: Slot<Option<String>>,
    reply: Slot<Reply>,
}

#[fixture]
fn ingest_scenario() -> IngestScenario {
    IngestScenario::default()
}

fn failure(message: impl Into<String>) -> CommentError {
    CommentError::Api {
        message: message.into(),
    }
}

/// Ensures the runtime and GitHub mock are initialised.
fn ensure_runtime_and_server(scenario: &IngestScenario) -> Result<SharedRuntime, CommentError> {
    if scenario.runtime.with_ref(|_| ()).is_none() {
        let runtime = Runtime::new()
            .map_err(|error| failure(format!("failed to create Tokio runtime: {error}")))?;
        scenario.runtime.set(SharedRuntime::new(runtime));
    }

    let shared_runtime = scenario
        .runtime
        .get()
        .ok_or_else(|| failure("runtime not initialised"))?;

    if scenario.github.with_ref(|_| ()).is_none() {
        scenario
            .github
            .set(shared_runtime.block_on(MockServer::start()));
    }

    Ok(shared_runtime)
}

fn mount_github(
    scenario: &IngestScenario,
    existing_comments: Value,
    pr: u64,
) -> Result<(), CommentError> {
    let runtime = ensure_runtime_and_server(scenario)?;

    let repository = Mock::given(method("GET"))
        .and(path("/api/v3/repos/octo/web"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "full_name": "octo/web" })));
    let listing = Mock::given(method("GET"))
        .and(path(format!("/api/v3/repos/octo/web/issues/{pr}/comments")))
        .respond_with(ResponseTemplate::new(200).set_body_json(existing_comments));
    let create = Mock::given(method("POST"))
        .and(path(format!("/api/v3/repos/octo/web/issues/{pr}/comments")))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "id": 500,
            "body": "<!-- pr-error-logger -->",
            "user": { "login": "bot" }
        })));
    let update = Mock::given(method("PATCH"))
        .and(path("/api/v3/repos/octo/web/issues/comments/9"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 9,
            "body": "<!-- pr-error-logger -->",
            "user": { "login": "bot" }
        })));

    scenario
        .github
        .with_ref(|server| {
            runtime.block_on(repository.mount(server));
            runtime.block_on(listing.mount(server));
            runtime.block_on(create.mount(server));
            runtime.block_on(update.mount(server));
        })
        .ok_or_else(|| failure("mock server not initialised"))
}

#[given("a GitHub API for octo/web with no summary comment on pull request {pr:u64}")]
fn github_without_summary(#[from(ingest_scenario)] scenario: &IngestScenario, pr: u64) -> Result<(), CommentError> {
    mount_github(
        scenario,
        json!([{ "id": 1, "body": "LGTM", "user": { "login": "reviewer" } }]),
        pr,
    )
}

#[given("a GitHub API for octo/web with summary comment {id:u64} on pull request {pr:u64}")]
fn github_with_summary(#[from(ingest_scenario)] scenario: &IngestScenario, id: u64, pr: u64) -> Result<(), CommentError> {
    mount_github(
        scenario,
        json!([
            { "id": 1, "body": "LGTM", "user": { "login": "reviewer" } },
            { "id": id, "body": "<!-- pr-error-logger -->\nold", "user": { "login": "bot" } }
        ]),
        pr,
    )
}

#[expect(
    clippy::needless_pass_by_value,
    reason = "rstest-bdd passes owned step arguments"
)]
#[given("the ingest server has token {token}")]
fn server_with_token(#[from(ingest_scenario)] scenario: &IngestScenario, token: String) {
    scenario
        .token
        .set(Some(token.trim_matches('"').to_owned()));
}

#[given("the ingest server has no token")]
fn server_without_token(#[from(ingest_scenario)] scenario: &IngestScenario) {
    scenario.token.set(None);
}

fn entries(count: u64, pr: Option<u64>) -> Vec<Value> {
    (0..count)
        .map(|index| {
            let mut entry = json!({
                "message": format!("failure {index}"),
                "level": "error",
                "timestamp": "2025-01-02T03:04:05.000Z",
                "url": "https://web-git-pr-42-octo.vercel.app/",
                "userAgent": "TestAgent/1.0",
                "deviceInfo": {}
            });
            if let (Some(number), Some(fields)) = (pr, entry.as_object_mut()) {
                fields.insert("prNumber".to_owned(), json!(number));
            }
            entry
        })
        .collect()
}

fn post_batch(scenario: &IngestScenario, logs: Vec<Value>) -> Result<(), CommentError> {
    let runtime = ensure_runtime_and_server(scenario)?;
    let api_base = scenario
        .github
        .with_ref(|server| format!("{}/api/v3", server.uri()))
        .ok_or_else(|| failure("mock server not initialised"))?;
    let token = scenario
        .token
        .get()
        .flatten()
        .map(PersonalAccessToken::new)
        .transpose()?;
    let settings = IngestSettings {
        token,
        api_base,
        ..IngestSettings::default()
    };
    let payload = json!({ "logs": logs, "config": { "repository": "web", "owner": "octo" } });

    let reply = runtime.block_on(async {
        let state = IngestState::new(settings)?;
        let request = Request::builder()
            .method(Method::POST)
            .uri("/api/log-error")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(payload.to_string()))
            .map_err(|error| failure(error.to_string()))?;
        let response = router(Arc::new(state))
            .oneshot(request)
            .await
            .map_err(|error| failure(error.to_string()))?;
        let status = response.status().as_u16();
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .map_err(|error| failure(error.to_string()))?;
        let body = serde_json::from_slice(&bytes).map_err(|error| failure(error.to_string()))?;
        Ok::<_, CommentError>(Reply { status, body })
    })?;

    scenario.reply.set(reply);
    Ok(())
}

#[when("the client posts {count:u64} error entries for pull request {pr:u64}")]
fn post_entries_for_pr(#[from(ingest_scenario)] scenario: &IngestScenario, count: u64, pr: u64) -> Result<(), CommentError> {
    post_batch(scenario, entries(count, Some(pr)))
}

#[when("the client posts {count:u64} error entries without a pull request number")]
fn post_entries_without_pr(#[from(ingest_scenario)] scenario: &IngestScenario, count: u64) -> Result<(), CommentError> {
    post_batch(scenario, entries(count, None))
}

fn reply(scenario: &IngestScenario) -> Result<Reply, CommentError> {
    scenario
        .reply
        .get()
        .ok_or_else(|| failure("no response recorded"))
}

#[then("the response status is {status:u64}")]
fn assert_status(#[from(ingest_scenario)] scenario: &IngestScenario, status: u64) -> Result<(), CommentError> {
    let actual = reply(scenario)?;
    if u64::from(actual.status) == status {
        Ok(())
    } else {
        Err(failure(format!(
            "expected status {status}, got {} with {}",
            actual.status, actual.body
        )))
    }
}

#[then("the response reports {count:u64} logs for pull request {pr:u64}")]
fn assert_reported_counts(
    #[from(ingest_scenario)] scenario: &IngestScenario,
    count: u64,
    pr: u64,
) -> Result<(), CommentError> {
    let body = reply(scenario)?.body;
    let expected = json!({
        "message": "Error logs processed successfully",
        "prNumber": pr,
        "logCount": count
    });
    if body == expected {
        Ok(())
    } else {
        Err(failure(format!("unexpected body {body}")))
    }
}

fn assert_body_field(
    scenario: &IngestScenario,
    field: &str,
    expected: &str,
) -> Result<(), CommentError> {
    let body = reply(scenario)?.body;
    let wanted = expected.trim_matches('"');
    if body.get(field).and_then(Value::as_str) == Some(wanted) {
        Ok(())
    } else {
        Err(failure(format!("expected {field} {wanted}, got {body}")))
    }
}

#[expect(
    clippy::needless_pass_by_value,
    reason = "rstest-bdd passes owned step arguments"
)]
#[then("the response message is {message}")]
fn assert_message(#[from(ingest_scenario)] scenario: &IngestScenario, message: String) -> Result<(), CommentError> {
    assert_body_field(scenario, "message", &message)
}

#[expect(
    clippy::needless_pass_by_value,
    reason = "rstest-bdd passes owned step arguments"
)]
#[then("the response error is {error}")]
fn assert_error(#[from(ingest_scenario)] scenario: &IngestScenario, error: String) -> Result<(), CommentError> {
    assert_body_field(scenario, "error", &error)
}

fn received(scenario: &IngestScenario) -> Result<Vec<wiremock::Request>, CommentError> {
    let runtime = ensure_runtime_and_server(scenario)?;
    scenario
        .github
        .with_ref(|server| runtime.block_on(server.received_requests()))
        .flatten()
        .ok_or_else(|| failure("request recording disabled"))
}

#[expect(
    clippy::needless_pass_by_value,
    reason = "rstest-bdd passes owned step arguments"
)]
#[then("GitHub received {count:usize} {verb} to {target}")]
fn assert_github_calls(
    #[from(ingest_scenario)] scenario: &IngestScenario,
    count: usize,
    verb: String,
    target: String,
) -> Result<(), CommentError> {
    let wanted_path = target.trim_matches('"');
    let actual = received(scenario)?
        .iter()
        .filter(|request| request.method.as_str() == verb && request.url.path() == wanted_path)
        .count();
    if actual == count {
        Ok(())
    } else {
        Err(failure(format!(
            "expected {count} {verb} to {wanted_path}, saw {actual}"
        )))
    }
}

#[then("GitHub received no requests")]
fn assert_github_untouched(#[from(ingest_scenario)] scenario: &IngestScenario) -> Result<(), CommentError> {
    let requests = received(scenario)?;
    if requests.is_empty() {
        Ok(())
    } else {
        Err(failure(format!(
            "expected no GitHub calls, saw {}",
            requests.len()
        )))
    }
}

#[scenario(path = "tests/features/ingest.feature", index = 0)]
fn first_batch_creates_comment(ingest_scenario: IngestScenario) {
    let _ = ingest_scenario;
}

#[scenario(path = "tests/features/ingest.feature", index = 1)]
fn later_batch_updates_comment(ingest_scenario: IngestScenario) {
    let _ = ingest_scenario;
}

#[scenario(path = "tests/features/ingest.feature", index = 2)]
fn batch_without_pr_skips_github(ingest_scenario: IngestScenario) {
    let _ = ingest_scenario;
}

#[scenario(path = "tests/features/ingest.feature", index = 3)]
fn missing_token_rejects_batch(ingest_scenario: IngestScenario) {
    let _ = ingest_scenario;
}
