//! Scan orchestration: page → classified links → stored scan, and per-link
//! extraction + remote analysis with caching.
//!
//! One [`Orchestrator`] per session, built from explicit configuration, a
//! transport and a store.

mod analyze;
mod state;

use std::sync::Arc;

use crate::backend::{AnalysisClient, AnalysisError, ScanUpload};
use crate::classify::{self, Anchor};
use crate::config::ScannerConfig;
use crate::http::{self, HttpTransport};
use crate::model::{epoch_millis, ScanResult, StoredScan};
use crate::page::{self, ParsedPage};
use crate::store::ResultStore;
use crate::url_model::PageLocation;

pub use analyze::{is_fresh, BatchOutcome, LinkAnalysis};
pub use state::{IllegalTransition, LinkProgress, LinkState};

#[derive(Debug, thiserror::Error)]
pub enum OrchestratorError {
    #[error("invalid page URL {url}: {reason}")]
    InvalidPageUrl { url: String, reason: String },
    #[error("fetching page {url} failed: {reason}")]
    PageFetch { url: String, reason: String },
    #[error("no stored scan for {0}")]
    NoStoredScan(String),
    #[error("link index {index} out of range: {host} has {len} stored links")]
    LinkIndexOutOfRange {
        host: String,
        index: usize,
        len: usize,
    },
    #[error("analysis service: {0}")]
    Backend(#[from] AnalysisError),
    #[error(transparent)]
    Store(#[from] anyhow::Error),
}

pub struct Orchestrator {
    config: ScannerConfig,
    transport: Arc<dyn HttpTransport>,
    store: ResultStore,
    client: AnalysisClient,
}

impl Orchestrator {
    pub fn new(config: ScannerConfig, transport: Arc<dyn HttpTransport>, store: ResultStore) -> Self {
        let client = AnalysisClient::new(config.backend_url.clone(), Arc::clone(&transport));
        Self {
            config,
            transport,
            store,
            client,
        }
    }

    pub fn config(&self) -> &ScannerConfig {
        &self.config
    }

    pub fn store(&self) -> &ResultStore {
        &self.store
    }

    pub fn client(&self) -> &AnalysisClient {
        &self.client
    }

    pub fn transport(&self) -> &Arc<dyn HttpTransport> {
        &self.transport
    }

    /// Fetch `url`, classify its links and store the scan.
    pub async fn scan_page(&self, url: &str) -> Result<ScanResult, OrchestratorError> {
        let location = locate(url)?;
        let response = http::get(&self.transport, url)
            .await
            .map_err(|e| OrchestratorError::PageFetch {
                url: url.to_string(),
                reason: e.to_string(),
            })?;
        if !response.is_success() {
            return Err(OrchestratorError::PageFetch {
                url: url.to_string(),
                reason: format!("HTTP {}", response.status),
            });
        }
        let parsed = ParsedPage::parse(&response.text());
        self.record(url, &location, &parsed.title, &parsed.anchors)
            .await
    }

    /// Classify host-supplied HTML of the page at `url` and store the scan.
    /// `title` overrides the document's `<title>`.
    pub async fn scan_html(
        &self,
        url: &str,
        html: &str,
        title: Option<&str>,
    ) -> Result<ScanResult, OrchestratorError> {
        let location = locate(url)?;
        let parsed = ParsedPage::parse(html);
        let title = title.unwrap_or(&parsed.title);
        self.record(url, &location, title, &parsed.anchors).await
    }

    /// Classify anchors a content script collected on the page at `url`.
    pub async fn scan_anchors(
        &self,
        url: &str,
        title: &str,
        anchors: &[Anchor],
    ) -> Result<ScanResult, OrchestratorError> {
        let location = locate(url)?;
        self.record(url, &location, title, anchors).await
    }

    async fn record(
        &self,
        url: &str,
        location: &PageLocation,
        title: &str,
        anchors: &[Anchor],
    ) -> Result<ScanResult, OrchestratorError> {
        let links = classify::classify(anchors, &location.origin, &location.path);
        let scan = ScanResult {
            links,
            page: page::page_context(url, location, title),
            captured_at: epoch_millis(),
        };
        self.store.save_scan(&scan).await?;
        tracing::info!(
            host = %scan.page.hostname,
            links = scan.links.len(),
            "scan stored"
        );
        if self.config.telemetry.enabled {
            self.send_telemetry(&scan).await;
        }
        Ok(scan)
    }

    /// Upload one scan; queue it for the next batch flush on failure.
    async fn send_telemetry(&self, scan: &ScanResult) {
        let upload = ScanUpload::from(scan);
        if let Err(e) = self.client.upload_scan(&upload).await {
            tracing::warn!(host = %upload.domain, "scan upload failed, queued: {e}");
            if let Err(e) = self.store.enqueue_upload(&upload).await {
                tracing::warn!("queueing scan upload failed: {e:#}");
            }
        }
    }

    /// Upload every queued scan in one batch. Returns how many were sent.
    pub async fn flush_telemetry(&self) -> Result<usize, OrchestratorError> {
        let pending = self.store.pending_uploads().await?;
        if pending.is_empty() {
            return Ok(0);
        }
        let uploads: Vec<ScanUpload> = pending.iter().map(|p| p.upload.clone()).collect();
        self.client.upload_batch(&uploads).await?;
        let ids: Vec<i64> = pending.iter().map(|p| p.id).collect();
        self.store.delete_uploads(&ids).await?;
        tracing::info!(count = ids.len(), "queued scan uploads delivered");
        Ok(ids.len())
    }

    pub async fn stored(&self, hostname: &str) -> Result<Option<StoredScan>, OrchestratorError> {
        Ok(self.store.get_scan(hostname).await?)
    }

    pub async fn clear(&self, hostname: &str) -> Result<bool, OrchestratorError> {
        Ok(self.store.clear(hostname).await?)
    }

    pub async fn clear_analyses(&self, hostname: &str) -> Result<usize, OrchestratorError> {
        Ok(self.store.clear_analyses(hostname).await?)
    }

    pub async fn check_health(&self) -> bool {
        self.client.health().await
    }
}

fn locate(url: &str) -> Result<PageLocation, OrchestratorError> {
    PageLocation::from_url(url).map_err(|e| OrchestratorError::InvalidPageUrl {
        url: url.to_string(),
        reason: format!("{e:#}"),
    })
}
