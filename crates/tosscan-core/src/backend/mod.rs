//! Client for the remote analysis service.
//!
//! Endpoints live under a configurable base URL (`backend_url`):
//! `health/`, `analyze/`, `scrape-and-analyze/`, `scan-results/` and
//! `batch-scan-results/`. Single attempt per call; no retries.

mod types;

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;

use crate::http::{self, HttpResponse, HttpTransport, TransportError};

pub use types::{
    AnalysisPayload, AnalyzeRequest, BatchUpload, HarmfulClause, KeyClause,
    ScrapeAndAnalyzeResponse, ScrapeRequest, ScanUpload,
};

#[derive(Debug, thiserror::Error)]
pub enum AnalysisError {
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error("HTTP {0}")]
    Status(u32),
    #[error("invalid response body: {0}")]
    Decode(String),
}

#[derive(Clone)]
pub struct AnalysisClient {
    base_url: String,
    transport: Arc<dyn HttpTransport>,
}

impl AnalysisClient {
    pub fn new(base_url: impl Into<String>, transport: Arc<dyn HttpTransport>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            base_url,
            transport,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Absolute URL of `name` (`analyze` → `<base>/analyze/`).
    pub fn endpoint(&self, name: &str) -> String {
        format!("{}/{}/", self.base_url, name.trim_matches('/'))
    }

    /// True if the health endpoint answers 2xx.
    pub async fn health(&self) -> bool {
        let url = self.endpoint("health");
        match http::get(&self.transport, &url).await {
            Ok(resp) => {
                tracing::debug!(status = resp.status, "backend health");
                resp.is_success()
            }
            Err(e) => {
                tracing::info!("backend unreachable at {url}: {e}");
                false
            }
        }
    }

    /// Posts extracted document text for analysis.
    pub async fn analyze(&self, text: &str) -> Result<AnalysisPayload, AnalysisError> {
        let resp = self
            .post("analyze", &AnalyzeRequest { tos_text: text })
            .await?;
        decode(&resp)
    }

    /// Asks the service to render, extract and analyze `url` itself.
    pub async fn scrape_and_analyze(
        &self,
        url: &str,
        headless: bool,
        timeout_ms: u64,
    ) -> Result<ScrapeAndAnalyzeResponse, AnalysisError> {
        let request = ScrapeRequest {
            url,
            headless,
            timeout: timeout_ms,
        };
        let resp = self.post("scrape-and-analyze", &request).await?;
        decode(&resp)
    }

    pub async fn upload_scan(&self, scan: &ScanUpload) -> Result<(), AnalysisError> {
        self.post("scan-results", scan).await.map(|_| ())
    }

    pub async fn upload_batch(&self, scans: &[ScanUpload]) -> Result<(), AnalysisError> {
        self.post("batch-scan-results", &BatchUpload { scans })
            .await
            .map(|_| ())
    }

    async fn post<T: Serialize>(&self, name: &str, body: &T) -> Result<HttpResponse, AnalysisError> {
        let url = self.endpoint(name);
        let body = serde_json::to_value(body)
            .map_err(|e| TransportError::InvalidRequest(e.to_string()))?;
        let resp = http::post_json(&self.transport, &url, body).await?;
        if !resp.is_success() {
            tracing::warn!(
                url = %url,
                status = resp.status,
                body = %String::from_utf8_lossy(&resp.body[..resp.body.len().min(512)]),
                "analysis service error"
            );
            return Err(AnalysisError::Status(resp.status));
        }
        Ok(resp)
    }
}

fn decode<T: DeserializeOwned>(resp: &HttpResponse) -> Result<T, AnalysisError> {
    serde_json::from_slice(&resp.body).map_err(|e| AnalysisError::Decode(e.to_string()))
}
