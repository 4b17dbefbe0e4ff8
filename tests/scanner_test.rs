use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::{Notify, oneshot};

use codeguardian::fetch::{ContentFetcher, FetchError};
use codeguardian::llm::{ModelClient, ModelError};
use codeguardian::prompts::AuditPayload;
use codeguardian::scanner::{ScanState, Scanner};
use codeguardian::{SecurityAnalysis, Severity};

const EVAL_RESPONSE: &str = r#"{
    "summary": "Uses eval on unsanitized input",
    "vulnerabilities": [
        {
            "type": "Code Injection",
            "severity": "Critical",
            "description": "User input flows directly into eval, allowing arbitrary code execution.",
            "remediation": "Parse the input with JSON.parse or a safe expression evaluator.",
            "lineNumber": 1
        }
    ]
}"#;

const SECURE_RESPONSE: &str =
    r#"{"summary": "The code appears secure.", "vulnerabilities": []}"#;

/// Model double returning canned text, sharing its observations with the
/// test through `Arc`s so they survive the move into the scanner.
#[derive(Clone)]
struct MockModel {
    text: String,
    calls: Arc<AtomicUsize>,
    last_payload: Arc<Mutex<Option<AuditPayload>>>,
}

impl MockModel {
    fn returning(text: &str) -> Self {
        Self {
            text: text.to_string(),
            calls: Arc::new(AtomicUsize::new(0)),
            last_payload: Arc::new(Mutex::new(None)),
        }
    }
}

#[async_trait]
impl ModelClient for MockModel {
    async fn analyze(&self, payload: &AuditPayload) -> Result<SecurityAnalysis, ModelError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_payload.lock().unwrap() = Some(payload.clone());
        SecurityAnalysis::from_model_text(&self.text).map_err(ModelError::Parse)
    }
}

/// Fetcher double with a single canned outcome.
#[derive(Clone)]
struct MockFetcher {
    calls: Arc<AtomicUsize>,
    result: Arc<Mutex<Option<Result<String, FetchError>>>>,
}

impl MockFetcher {
    fn returning_html(html: &str) -> Self {
        Self {
            calls: Arc::new(AtomicUsize::new(0)),
            result: Arc::new(Mutex::new(Some(Ok(html.to_string())))),
        }
    }

    fn returning_error(err: FetchError) -> Self {
        Self {
            calls: Arc::new(AtomicUsize::new(0)),
            result: Arc::new(Mutex::new(Some(Err(err)))),
        }
    }

    fn unused() -> Self {
        Self {
            calls: Arc::new(AtomicUsize::new(0)),
            result: Arc::new(Mutex::new(None)),
        }
    }
}

#[async_trait]
impl ContentFetcher for MockFetcher {
    async fn fetch_url_content(&self, _url: &str) -> Result<String, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.result
            .lock()
            .unwrap()
            .take()
            .expect("fetcher called without a canned result")
    }
}

/// Model double whose calls can be held open by the test, for observing the
/// Loading state and for racing an old scan against a newer one.
#[derive(Clone)]
struct GatedModel {
    entered: Arc<Notify>,
    gate: Arc<Mutex<Option<oneshot::Receiver<()>>>>,
    texts: Arc<Mutex<VecDeque<String>>>,
}

impl GatedModel {
    /// The first call blocks on the returned sender; later calls run free.
    /// Responses are handed out in order, one per call.
    fn new(texts: &[&str]) -> (Self, oneshot::Sender<()>) {
        let (tx, rx) = oneshot::channel();
        let model = Self {
            entered: Arc::new(Notify::new()),
            gate: Arc::new(Mutex::new(Some(rx))),
            texts: Arc::new(Mutex::new(
                texts.iter().map(|t| t.to_string()).collect(),
            )),
        };
        (model, tx)
    }
}

#[async_trait]
impl ModelClient for GatedModel {
    async fn analyze(&self, _payload: &AuditPayload) -> Result<SecurityAnalysis, ModelError> {
        let text = self
            .texts
            .lock()
            .unwrap()
            .pop_front()
            .expect("no canned response left");
        let gate = self.gate.lock().unwrap().take();
        if let Some(rx) = gate {
            self.entered.notify_one();
            let _ = rx.await;
        }
        SecurityAnalysis::from_model_text(&text).map_err(ModelError::Parse)
    }
}

fn scanner_with(
    model: MockModel,
    fetcher: MockFetcher,
) -> Scanner<MockModel, MockFetcher> {
    Scanner::new(model, fetcher, Some("test-key".to_string()))
}

#[tokio::test]
async fn test_blank_inputs_fail_without_any_network_call() {
    let model = MockModel::returning(EVAL_RESPONSE);
    let fetcher = MockFetcher::unused();
    let scanner = scanner_with(model.clone(), fetcher.clone());

    for input in ["", "   ", "\n"] {
        let err = scanner.scan_code(input, "JavaScript").await.unwrap_err();
        assert!(!err.to_string().is_empty());
    }

    let err = scanner.scan_url("  ").await.unwrap_err();
    assert_eq!(err.to_string(), "URL input cannot be empty.");

    assert_eq!(model.calls.load(Ordering::SeqCst), 0);
    assert_eq!(fetcher.calls.load(Ordering::SeqCst), 0);

    match scanner.state().await {
        ScanState::Failed(msg) => assert!(!msg.is_empty()),
        other => panic!("expected Failed, got {other:?}"),
    }
}

#[tokio::test]
async fn test_malformed_url_yields_fixed_error_and_no_fetch() {
    let model = MockModel::returning(EVAL_RESPONSE);
    let fetcher = MockFetcher::unused();
    let scanner = scanner_with(model.clone(), fetcher.clone());

    let err = scanner.scan_url("not-a-url").await.unwrap_err();
    assert_eq!(
        err.to_string(),
        "Invalid URL provided. Please include http:// or https://"
    );

    assert_eq!(fetcher.calls.load(Ordering::SeqCst), 0);
    assert_eq!(model.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_code_scan_prompt_embeds_snippet_and_result_round_trips() {
    let model = MockModel::returning(EVAL_RESPONSE);
    let scanner = scanner_with(model.clone(), MockFetcher::unused());

    let analysis = scanner
        .scan_code("eval(userInput)", "JavaScript")
        .await
        .unwrap();

    // Prompt must embed the literal snippet with a lowercased fence tag
    let payload = model.last_payload.lock().unwrap().clone().unwrap();
    let prompt = payload.render_prompt();
    assert!(prompt.contains("```javascript\neval(userInput)\n```"));
    assert!(prompt.contains("The code is written in: JavaScript"));

    // Result matches the model output exactly: no re-ordering, no mutation
    assert_eq!(analysis.summary, "Uses eval on unsanitized input");
    assert_eq!(analysis.vulnerabilities.len(), 1);
    let vuln = &analysis.vulnerabilities[0];
    assert_eq!(vuln.vuln_type, "Code Injection");
    assert_eq!(vuln.severity, Severity::Critical);
    assert_eq!(vuln.line_number, Some(1));

    assert_eq!(scanner.state().await, ScanState::Success(analysis));
}

#[tokio::test]
async fn test_multiple_findings_keep_model_order() {
    let text = r#"{
        "summary": "Two findings",
        "vulnerabilities": [
            {"type": "Open Redirect", "severity": "Low", "description": "d1", "remediation": "r1"},
            {"type": "SQL Injection", "severity": "Critical", "description": "d2", "remediation": "r2", "lineNumber": 7}
        ]
    }"#;
    let model = MockModel::returning(text);
    let scanner = scanner_with(model, MockFetcher::unused());

    let analysis = scanner.scan_code("query(req.body)", "TypeScript").await.unwrap();

    // Low stays before Critical: output order is model order
    assert_eq!(analysis.vulnerabilities[0].vuln_type, "Open Redirect");
    assert_eq!(analysis.vulnerabilities[1].vuln_type, "SQL Injection");
    assert_eq!(analysis.vulnerabilities[1].line_number, Some(7));
}

#[tokio::test]
async fn test_invalid_model_json_surfaces_parse_reason() {
    let model = MockModel::returning("I found some bugs!");
    let scanner = scanner_with(model, MockFetcher::unused());

    let err = scanner.scan_code("let x = 1;", "JavaScript").await.unwrap_err();
    let message = err.to_string();
    assert!(message.starts_with("Failed to analyze code."));
    assert!(message.contains("not valid analysis JSON"));

    match scanner.state().await {
        ScanState::Failed(msg) => assert_eq!(msg, message),
        other => panic!("expected Failed, got {other:?}"),
    }
}

#[tokio::test]
async fn test_loading_state_spans_call_start_to_settlement() {
    let (model, release) = GatedModel::new(&[SECURE_RESPONSE]);
    let scanner = Arc::new(Scanner::new(
        model.clone(),
        MockFetcher::unused(),
        Some("test-key".to_string()),
    ));

    assert_eq!(scanner.state().await, ScanState::Idle);

    let handle = {
        let scanner = Arc::clone(&scanner);
        tokio::spawn(async move { scanner.scan_code("fn main() {}", "Rust").await })
    };

    model.entered.notified().await;
    assert!(scanner.state().await.is_loading());

    release.send(()).unwrap();
    let analysis = handle.await.unwrap().unwrap();

    assert!(!scanner.state().await.is_loading());
    assert_eq!(scanner.state().await, ScanState::Success(analysis));
}

#[tokio::test]
async fn test_url_scan_fetch_error_propagates_cause() {
    let model = MockModel::returning(EVAL_RESPONSE);
    let fetcher =
        MockFetcher::returning_error(FetchError::Request("timeout of 10000ms exceeded".into()));
    let scanner = scanner_with(model.clone(), fetcher);

    let err = scanner.scan_url("https://example.com").await.unwrap_err();
    let message = err.to_string();
    assert!(message.starts_with("Failed to analyze URL."));
    assert!(message.contains("timeout"));

    assert_eq!(model.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_url_scan_empty_body_is_a_failure() {
    let model = MockModel::returning(EVAL_RESPONSE);
    let fetcher = MockFetcher::returning_html("   ");
    let scanner = scanner_with(model.clone(), fetcher);

    let err = scanner.scan_url("https://example.com").await.unwrap_err();
    assert!(err.to_string().contains("empty content"));
    assert_eq!(model.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_url_scan_feeds_fetched_html_into_site_prompt() {
    let model = MockModel::returning(SECURE_RESPONSE);
    let fetcher = MockFetcher::returning_html("<html><body>hi</body></html>");
    let scanner = scanner_with(model.clone(), fetcher.clone());

    let analysis = scanner.scan_url("https://example.com").await.unwrap();
    assert_eq!(analysis.summary, "The code appears secure.");
    assert!(!analysis.has_vulnerabilities());

    assert_eq!(fetcher.calls.load(Ordering::SeqCst), 1);
    let payload = model.last_payload.lock().unwrap().clone().unwrap();
    assert!(matches!(payload, AuditPayload::Site { .. }));
    assert!(
        payload
            .render_prompt()
            .contains("```html\n<html><body>hi</body></html>\n```")
    );
}

#[tokio::test]
async fn test_stale_settlement_does_not_overwrite_newer_scan() {
    let stale = r#"{"summary": "stale", "vulnerabilities": []}"#;
    let fresh = r#"{"summary": "fresh", "vulnerabilities": []}"#;

    let (model, release) = GatedModel::new(&[stale, fresh]);
    let scanner = Arc::new(Scanner::new(
        model.clone(),
        MockFetcher::unused(),
        Some("test-key".to_string()),
    ));

    // First scan enters the model and blocks on the gate
    let first = {
        let scanner = Arc::clone(&scanner);
        tokio::spawn(async move { scanner.scan_code("old", "Rust").await })
    };
    model.entered.notified().await;

    // Second scan starts later and completes first
    let second = scanner.scan_code("new", "Rust").await.unwrap();
    assert_eq!(second.summary, "fresh");
    assert_eq!(scanner.state().await, ScanState::Success(second.clone()));

    // Releasing the first scan settles it with a stale ticket; the newer
    // state must survive
    release.send(()).unwrap();
    let stale_result = first.await.unwrap().unwrap();
    assert_eq!(stale_result.summary, "stale");
    assert_eq!(scanner.state().await, ScanState::Success(second));
}
