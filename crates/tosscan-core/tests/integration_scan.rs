//! Integration test: real libcurl transport against a local HTTP server
//! standing in for both the scanned site and the analysis service.

mod common;

use common::http_server::{Canned, TestServer};
use std::sync::Arc;
use tokio::io::duplex;
use tosscan_core::command::framing::{read_message, write_message};
use tosscan_core::command::{Dispatcher, PanelHost};
use tosscan_core::config::ScannerConfig;
use tosscan_core::extract::{self, ExtractError, ExtractOptions};
use tosscan_core::http::{self, CurlTransport, HttpTransport};
use tosscan_core::model::{AnalysisOutcome, AnalysisSource, LinkCategory};
use tosscan_core::orchestrator::Orchestrator;
use tosscan_core::store::ResultStore;

fn site(server: &TestServer) {
    server.route(
        "GET",
        "/shop/index.html",
        Canned::html(
            r#"<html><head><title>Shop</title></head><body>
            <a href="/">Home</a>
            <footer class="site-footer">
              <a href="legal/terms.html">Terms of Use</a>
              <a href="/privacy" title="Privacy notice"><img src="p.svg"></a>
            </footer></body></html>"#,
        ),
    );
    let policy = format!(
        "<html><body><h1>Terms of Use</h1><p>{}</p></body></html>",
        "By using the shop you waive the right to a jury trial. ".repeat(4)
    );
    server.route("GET", "/shop/legal/terms.html", Canned::html(&policy));
    server.route("GET", "/privacy", Canned::html("<body><div id=app></div></body>"));
    server.route("GET", "/api/health/", Canned::json(200, r#"{"status":"ok"}"#));
    server.route(
        "POST",
        "/api/analyze/",
        Canned::json(200, r#"{"summary":"Jury waiver.","risk_level":"high"}"#),
    );
    server.route(
        "POST",
        "/api/scrape-and-analyze/",
        Canned::json(
            200,
            r#"{"analysis":{"summary":"Rendered policy."},"scraping_metadata":{"title":"Privacy"}}"#,
        ),
    );
}

async fn orchestrator(server: &TestServer, db: &std::path::Path) -> Orchestrator {
    let config = ScannerConfig {
        backend_url: server.url("/api"),
        ..ScannerConfig::default()
    };
    let transport = Arc::new(CurlTransport::new(config.fetch.clone()));
    let store = ResultStore::open_at(db).await.unwrap();
    Orchestrator::new(config, transport, store)
}

#[tokio::test]
async fn scan_and_analyze_over_http() {
    let server = TestServer::start();
    site(&server);
    let dir = tempfile::tempdir().unwrap();
    let orch = orchestrator(&server, &dir.path().join("results.db")).await;

    assert!(orch.check_health().await);

    let scan = orch.scan_page(&server.url("/shop/index.html")).await.unwrap();
    assert_eq!(scan.page.hostname, "127.0.0.1");
    assert_eq!(scan.page.title, "Shop");
    assert_eq!(scan.links.len(), 2);
    assert_eq!(scan.links[0].category, LinkCategory::LegalTerms);
    assert_eq!(scan.links[0].absolute_url, server.url("/shop/legal/terms.html"));
    assert_eq!(scan.links[1].category, LinkCategory::PrivacyPolicy);
    assert_eq!(scan.links[1].display_text, "Privacy notice");

    let terms = orch.analyze_link("127.0.0.1", 0, false).await.unwrap();
    match &terms.record.outcome {
        AnalysisOutcome::Analyzed { payload, source } => {
            assert_eq!(payload.summary().as_deref(), Some("Jury waiver."));
            assert!(matches!(source, AnalysisSource::Extracted { .. }));
        }
        other => panic!("unexpected {other:?}"),
    }
    let posted = server
        .seen()
        .into_iter()
        .find(|s| s.path == "/api/analyze/")
        .unwrap();
    let body: serde_json::Value = serde_json::from_str(&posted.body).unwrap();
    assert!(body["tos_text"].as_str().unwrap().contains("jury trial"));

    // Client-rendered page: too little text, so the service renders it.
    let privacy = orch.analyze_link("127.0.0.1", 1, false).await.unwrap();
    match &privacy.record.outcome {
        AnalysisOutcome::Analyzed { source, .. } => {
            assert!(matches!(source, AnalysisSource::RemoteScrape { .. }))
        }
        other => panic!("unexpected {other:?}"),
    }

    let stored = orch.stored("127.0.0.1").await.unwrap().unwrap();
    assert_eq!(stored.analysis_results.len(), 2);
}

#[tokio::test]
async fn missing_document_and_failing_service() {
    let server = TestServer::start();
    server.route(
        "GET",
        "/",
        Canned::html(r#"<body><a href="/gone/terms">Terms</a></body>"#),
    );
    server.route("POST", "/api/scrape-and-analyze/", Canned::json(500, "{}"));
    let dir = tempfile::tempdir().unwrap();
    let orch = orchestrator(&server, &dir.path().join("results.db")).await;

    orch.scan_page(&server.url("/")).await.unwrap();
    let result = orch.analyze_link("127.0.0.1", 0, false).await.unwrap();
    assert_eq!(result.record.failure_reason(), Some("HTTP 500"));
    assert!(!orch.check_health().await);
}

struct NoPanel;

impl PanelHost for NoPanel {
    fn open_side_panel(&self, _tab_id: i64, _window_id: Option<i64>) -> bool {
        false
    }
}

#[tokio::test]
async fn framed_request_round_trip() {
    let server = TestServer::start();
    site(&server);
    let dir = tempfile::tempdir().unwrap();
    let orch = Arc::new(orchestrator(&server, &dir.path().join("results.db")).await);
    let dispatcher = Dispatcher::new(orch, Box::new(NoPanel));

    let (mut host_end, mut browser_end) = duplex(64 * 1024);
    let request = serde_json::json!({
        "action": "scanPage",
        "url": server.url("/shop/index.html"),
    });
    write_message(&mut browser_end, request.to_string().as_bytes())
        .await
        .unwrap();

    let raw = read_message(&mut host_end).await.unwrap().unwrap();
    let response = dispatcher.handle_raw(&raw).await;
    write_message(&mut host_end, &response.to_bytes()).await.unwrap();

    let reply = read_message(&mut browser_end).await.unwrap().unwrap();
    let reply: serde_json::Value = serde_json::from_slice(&reply).unwrap();
    assert_eq!(reply["success"], true);
    assert_eq!(reply["results"].as_array().unwrap().len(), 2);
    assert_eq!(reply["pageInfo"]["title"], "Shop");
}

#[tokio::test]
async fn content_type_comes_from_the_final_redirect_hop() {
    let server = TestServer::start();
    server.route("GET", "/terms", Canned::redirect("/files/terms.pdf"));
    server.route("GET", "/files/terms.pdf", Canned::bytes("application/pdf", b"%PDF-1.4"));
    let transport: Arc<dyn HttpTransport> =
        Arc::new(CurlTransport::new(ScannerConfig::default().fetch));

    let resp = http::get(&transport, &server.url("/terms")).await.unwrap();
    assert_eq!(resp.status, 200);
    assert_eq!(resp.content_type.as_deref(), Some("application/pdf"));
    assert_eq!(resp.body, b"%PDF-1.4");

    let err = extract::extract(&transport, &server.url("/terms"), &ExtractOptions::default())
        .await
        .unwrap_err();
    assert!(matches!(err, ExtractError::Parse { .. }));

    let seen = server.seen();
    let hops: Vec<(&str, &str, &str)> = seen
        .iter()
        .map(|s| (s.method.as_str(), s.path.as_str(), s.body.as_str()))
        .collect();
    assert_eq!(
        hops[..2],
        [("GET", "/terms", ""), ("GET", "/files/terms.pdf", "")]
    );
}
