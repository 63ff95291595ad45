//! Blocking HTTP transport over libcurl.
//!
//! Uses the curl crate (easy interface) for page GETs and JSON POSTs to the
//! analysis service. Calls block; async callers go through [`get`] and
//! [`post_json`], which run the transfer on the blocking pool.

use std::sync::Arc;
use std::time::Duration;

use crate::config::FetchConfig;

/// A completed HTTP exchange. Any status counts as completed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u32,
    /// `Content-Type` of the final response in a redirect chain.
    pub content_type: Option<String>,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Body decoded as UTF-8, invalid sequences replaced.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// The exchange did not complete.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("invalid request: {0}")]
    InvalidRequest(String),
    #[error(transparent)]
    Curl(#[from] curl::Error),
    #[error("transfer task failed: {0}")]
    Join(String),
}

/// Seam between the orchestrator and the network.
pub trait HttpTransport: Send + Sync {
    fn get(&self, url: &str) -> Result<HttpResponse, TransportError>;
    fn post_json(&self, url: &str, body: &serde_json::Value)
        -> Result<HttpResponse, TransportError>;
}

/// libcurl-backed [`HttpTransport`]; one easy handle per request.
#[derive(Debug, Clone)]
pub struct CurlTransport {
    fetch: FetchConfig,
}

impl CurlTransport {
    pub fn new(fetch: FetchConfig) -> Self {
        Self { fetch }
    }

    fn easy(&self, url: &str, timeout_secs: u64) -> Result<curl::easy::Easy, TransportError> {
        let mut easy = curl::easy::Easy::new();
        easy.url(url)
            .map_err(|e| TransportError::InvalidRequest(format!("{url}: {e}")))?;
        easy.follow_location(true)?;
        easy.max_redirections(self.fetch.max_redirects)?;
        easy.connect_timeout(Duration::from_secs(self.fetch.connect_timeout_secs))?;
        easy.timeout(Duration::from_secs(timeout_secs))?;
        easy.useragent(&self.fetch.user_agent)?;
        // Empty string: every encoding libcurl was built with.
        easy.accept_encoding("")?;
        Ok(easy)
    }

    fn perform(&self, mut easy: curl::easy::Easy) -> Result<HttpResponse, TransportError> {
        let limit = self.fetch.max_body_bytes;
        let mut body: Vec<u8> = Vec::new();
        {
            let mut transfer = easy.transfer();
            transfer.write_function(|data| {
                if body.len() + data.len() > limit {
                    // Short count aborts the transfer with a write error.
                    return Ok(0);
                }
                body.extend_from_slice(data);
                Ok(data.len())
            })?;
            transfer.perform()?;
        }

        let status = easy.response_code()?;
        // libcurl reports the header of the last response after redirects.
        let content_type = easy.content_type()?.map(str::to_string);
        Ok(HttpResponse {
            status,
            content_type,
            body,
        })
    }
}

impl HttpTransport for CurlTransport {
    fn get(&self, url: &str) -> Result<HttpResponse, TransportError> {
        let mut easy = self.easy(url, self.fetch.timeout_secs)?;
        easy.get(true)?;
        let response = self.perform(easy)?;
        tracing::debug!(url, status = response.status, bytes = response.body.len(), "GET");
        Ok(response)
    }

    fn post_json(
        &self,
        url: &str,
        body: &serde_json::Value,
    ) -> Result<HttpResponse, TransportError> {
        let payload = serde_json::to_vec(body)
            .map_err(|e| TransportError::InvalidRequest(e.to_string()))?;
        let mut easy = self.easy(url, self.fetch.backend_timeout_secs)?;
        easy.post(true)?;
        easy.post_fields_copy(&payload)?;
        let mut list = curl::easy::List::new();
        list.append("Content-Type: application/json")?;
        list.append("Accept: application/json")?;
        // No `Expect: 100-continue` round trip for large bodies.
        list.append("Expect:")?;
        easy.http_headers(list)?;
        let response = self.perform(easy)?;
        tracing::debug!(url, status = response.status, sent = payload.len(), "POST");
        Ok(response)
    }
}

/// GET `url` on the blocking pool.
pub async fn get(
    transport: &Arc<dyn HttpTransport>,
    url: &str,
) -> Result<HttpResponse, TransportError> {
    let transport = Arc::clone(transport);
    let url = url.to_string();
    tokio::task::spawn_blocking(move || transport.get(&url))
        .await
        .map_err(|e| TransportError::Join(e.to_string()))?
}

/// POST `body` as JSON to `url` on the blocking pool.
pub async fn post_json(
    transport: &Arc<dyn HttpTransport>,
    url: &str,
    body: serde_json::Value,
) -> Result<HttpResponse, TransportError> {
    let transport = Arc::clone(transport);
    let url = url.to_string();
    tokio::task::spawn_blocking(move || transport.post_json(&url, &body))
        .await
        .map_err(|e| TransportError::Join(e.to_string()))?
}
