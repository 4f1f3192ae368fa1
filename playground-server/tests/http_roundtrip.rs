//! End-to-end tests: a real server on a loopback port, driven by the
//! playground's HTTP backend and session.

use std::fs;
use std::sync::Arc;
use std::time::{Duration, Instant};

use serde_json::json;
use tempfile::TempDir;

use playground::core::types::RequestFailure;
use playground::core::update::Msg;
use playground::io::client::{Backend, HttpBackend};
use playground::io::config::PlaygroundConfig;
use playground::session::Session;
use playground::test_support::RecordingRenderer;
use playground_server::evaluator::{CommandEvaluator, EvaluatorConfig, TIMEOUT_MESSAGE};
use playground_server::examples::load_examples;
use playground_server::state::AppState;

struct TestServer {
    base_url: String,
    _examples_dir: TempDir,
}

impl TestServer {
    async fn start(command: &[&str], examples: &[(&str, &str)], timeout: Duration) -> Self {
        let examples_dir = tempfile::tempdir().expect("tempdir");
        for (name, value) in examples {
            fs::write(examples_dir.path().join(format!("{name}.glu")), value).expect("write");
        }
        let entries = load_examples(examples_dir.path()).expect("load examples");

        let mut config = EvaluatorConfig::new(command.iter().map(|s| s.to_string()).collect());
        config.timeout = timeout;
        let evaluator = CommandEvaluator::new(config).expect("evaluator");
        let state = AppState::new(evaluator, &entries).expect("state");
        let app = playground_server::app(state, None);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind");
        let addr = listener.local_addr().expect("addr");
        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("serve");
        });

        Self {
            base_url: format!("http://{addr}"),
            _examples_dir: examples_dir,
        }
    }

    fn config(&self) -> PlaygroundConfig {
        PlaygroundConfig::for_server(&self.base_url)
    }

    fn backend(&self) -> HttpBackend {
        HttpBackend::new(&self.config()).expect("backend")
    }
}

#[tokio::test]
async fn catalog_is_served_in_name_order() {
    let server = TestServer::start(
        &["cat"],
        &[("id", "\\x -> x"), ("const", "\\x y -> x")],
        Duration::from_secs(5),
    )
    .await;

    let entries = server.backend().fetch_examples().await.expect("examples");
    let names: Vec<&str> = entries.iter().map(|e| e.name.as_str()).collect();
    assert_eq!(names, vec!["const", "id"]);
    assert_eq!(entries[1].value, "\\x -> x");
}

#[tokio::test]
async fn raw_text_reaches_the_evaluator() {
    let server = TestServer::start(&["cat"], &[], Duration::from_secs(5)).await;
    let value = server
        .backend()
        .evaluate("let x = \"quoted\" in x\n".to_string())
        .await
        .expect("evaluate");
    assert_eq!(value, json!("let x = \"quoted\" in x"));
}

#[tokio::test]
async fn evaluator_failure_is_a_json_error_value() {
    let server = TestServer::start(
        &["sh", "-c", "cat >/dev/null; echo 'parse error' >&2; exit 1"],
        &[],
        Duration::from_secs(5),
    )
    .await;
    let value = server
        .backend()
        .evaluate("(".to_string())
        .await
        .expect("evaluate");
    assert_eq!(value, json!({"error": "parse error"}));
}

#[tokio::test]
async fn slow_evaluation_reports_timeout() {
    let server = TestServer::start(
        &["sh", "-c", "sleep 5; echo done"],
        &[],
        Duration::from_millis(200),
    )
    .await;
    let started = Instant::now();
    let value = server
        .backend()
        .evaluate("loop".to_string())
        .await
        .expect("evaluate");
    assert_eq!(value, json!({"error": TIMEOUT_MESSAGE}));
    assert!(started.elapsed() < Duration::from_secs(3));
}

#[tokio::test]
async fn non_json_body_is_a_decode_failure() {
    let server = TestServer::start(&["cat"], &[], Duration::from_secs(5)).await;
    let mut cfg = server.config();
    cfg.examples_url = format!("{}/api/health", server.base_url);
    let err = HttpBackend::new(&cfg)
        .expect("backend")
        .fetch_examples()
        .await
        .expect_err("health is not json");
    assert!(matches!(err, RequestFailure::Decode(_)));
}

#[tokio::test]
async fn missing_endpoint_is_a_status_failure() {
    let server = TestServer::start(&["cat"], &[], Duration::from_secs(5)).await;
    let mut cfg = server.config();
    cfg.examples_url = format!("{}/no-such-route", server.base_url);
    let err = HttpBackend::new(&cfg)
        .expect("backend")
        .fetch_examples()
        .await
        .expect_err("404");
    assert_eq!(err, RequestFailure::Status(404));
}

/// Mount, auto-select, edit, submit: the whole loop over real HTTP.
#[tokio::test]
async fn session_round_trip_over_http() {
    let server = TestServer::start(
        &["sh", "-c", "printf 'evaluated: '; cat"],
        &[("a_first", "1 + 1"), ("b_second", "2 * 3")],
        Duration::from_secs(5),
    )
    .await;
    let cfg = server.config();
    let backend = Arc::new(HttpBackend::new(&cfg).expect("backend"));
    let renderer = RecordingRenderer::new();
    let mut session = Session::new(backend, renderer.clone(), &cfg);

    session.mount();
    session.settle_one().await;
    assert_eq!(session.state().editor.text(), "1 + 1");

    session.dispatch(Msg::SelectionChanged("2 * 3".to_string()));
    session.dispatch(Msg::Submit);
    session.settle_one().await;

    assert_eq!(
        session.state().editor.result(),
        Some(&json!("evaluated: 2 * 3"))
    );
    let frame = renderer.last().expect("frame");
    assert_eq!(frame.editor.result.as_deref(), Some("evaluated: 2 * 3"));
}
