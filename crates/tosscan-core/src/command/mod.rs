//! Host messaging surface: `{ "action": ... }` requests, one handler per
//! action, `{ "success": bool, ... }` responses.

pub mod framing;

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::sync::Arc;

use crate::classify::Anchor;
use crate::control::BatchControl;
use crate::orchestrator::{Orchestrator, OrchestratorError};

/// Every request the host understands.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum Request {
    /// Classify a page. With `anchors` the page is not fetched; with `html`
    /// that markup is parsed; otherwise `url` is fetched.
    ScanPage {
        url: String,
        #[serde(default)]
        html: Option<String>,
        #[serde(default)]
        anchors: Option<Vec<Anchor>>,
        #[serde(default)]
        title: Option<String>,
    },
    GetStoredResults {
        domain: String,
    },
    #[serde(rename_all = "camelCase")]
    ClearResults {
        domain: String,
        #[serde(default)]
        analyses_only: bool,
    },
    CheckBackendHealth,
    #[serde(rename_all = "camelCase")]
    OpenSidePanel {
        tab_id: i64,
        #[serde(default)]
        window_id: Option<i64>,
    },
    AnalyzeLinks {
        domain: String,
        indices: Vec<usize>,
        #[serde(default)]
        force: bool,
    },
    AnalyzeUrl {
        url: String,
    },
    /// Stop a running `analyzeLinks` batch after its current link.
    CancelAnalysis,
}

const ACTIONS: &[&str] = &[
    "scanPage",
    "getStoredResults",
    "clearResults",
    "checkBackendHealth",
    "openSidePanel",
    "analyzeLinks",
    "analyzeUrl",
    "cancelAnalysis",
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(flatten)]
    pub payload: Map<String, Value>,
}

impl Response {
    /// Success carrying the fields of `payload` (an object; anything else is dropped).
    pub fn ok(payload: Value) -> Self {
        let payload = match payload {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        Self {
            success: true,
            error: None,
            payload,
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(error.into()),
            payload: Map::new(),
        }
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        serde_json::to_vec(self)
            .unwrap_or_else(|_| br#"{"success":false,"error":"unserializable response"}"#.to_vec())
    }
}

impl From<OrchestratorError> for Response {
    fn from(e: OrchestratorError) -> Self {
        Response::failure(e.to_string())
    }
}

/// Opens the extension's side panel. Supplied by whoever embeds the host.
pub trait PanelHost: Send + Sync {
    fn open_side_panel(&self, tab_id: i64, window_id: Option<i64>) -> bool;
}

pub struct Dispatcher {
    orchestrator: Arc<Orchestrator>,
    panel: Box<dyn PanelHost>,
    batches: BatchControl,
}

impl Dispatcher {
    pub fn new(orchestrator: Arc<Orchestrator>, panel: Box<dyn PanelHost>) -> Self {
        Self {
            orchestrator,
            panel,
            batches: BatchControl::new(),
        }
    }

    /// Handle raw request bytes. Never fails: bad input yields a failure response.
    pub async fn handle_raw(&self, raw: &[u8]) -> Response {
        match parse_request(raw) {
            Ok(request) => self.handle(request).await,
            Err(message) => {
                tracing::warn!("rejected request: {message}");
                Response::failure(message)
            }
        }
    }

    pub async fn handle(&self, request: Request) -> Response {
        let orch = &self.orchestrator;
        let result = match request {
            Request::ScanPage {
                url,
                html,
                anchors,
                title,
            } => self.scan_page(&url, html, anchors, title).await,
            Request::GetStoredResults { domain } => orch
                .stored(&domain)
                .await
                .map(|stored| json!({ "results": stored })),
            Request::ClearResults {
                domain,
                analyses_only,
            } => {
                if analyses_only {
                    orch.clear_analyses(&domain)
                        .await
                        .map(|removed| json!({ "removed": removed }))
                } else {
                    orch.clear(&domain)
                        .await
                        .map(|existed| json!({ "removed": usize::from(existed) }))
                }
            }
            Request::CheckBackendHealth => Ok(json!({ "healthy": orch.check_health().await })),
            Request::OpenSidePanel { tab_id, window_id } => {
                if self.panel.open_side_panel(tab_id, window_id) {
                    Ok(json!({ "opened": true }))
                } else {
                    let mut resp = Response::failure("side panel is not available");
                    resp.payload.insert("opened".to_string(), Value::Bool(false));
                    return resp;
                }
            }
            Request::AnalyzeLinks {
                domain,
                indices,
                force,
            } => {
                let batch = self.batches.register();
                orch.analyze_selected(&domain, &indices, batch.token(), force)
                    .await
                    .map(|outcomes| json!({ "analyses": outcomes }))
            }
            Request::AnalyzeUrl { url } => orch
                .analyze_url(&url)
                .await
                .map(|record| json!({ "analysis": record })),
            Request::CancelAnalysis => {
                let batches = self.batches.cancel_all();
                tracing::info!(batches, "analysis cancel requested");
                Ok(json!({ "cancelled": true, "batches": batches }))
            }
        };
        match result {
            Ok(payload) => Response::ok(payload),
            Err(e) => {
                tracing::warn!("request failed: {e}");
                e.into()
            }
        }
    }

    async fn scan_page(
        &self,
        url: &str,
        html: Option<String>,
        anchors: Option<Vec<Anchor>>,
        title: Option<String>,
    ) -> Result<Value, OrchestratorError> {
        let orch = &self.orchestrator;
        let scan = match (anchors, html) {
            (Some(anchors), _) => {
                orch.scan_anchors(url, title.as_deref().unwrap_or_default(), &anchors)
                    .await?
            }
            (None, Some(html)) => orch.scan_html(url, &html, title.as_deref()).await?,
            (None, None) => orch.scan_page(url).await?,
        };
        Ok(json!({ "results": scan.links, "pageInfo": scan.page }))
    }
}

fn parse_request(raw: &[u8]) -> Result<Request, String> {
    let value: Value =
        serde_json::from_slice(raw).map_err(|e| format!("malformed request: {e}"))?;
    let action = value
        .get("action")
        .and_then(Value::as_str)
        .ok_or_else(|| "malformed request: missing \"action\"".to_string())?
        .to_string();
    if !ACTIONS.contains(&action.as_str()) {
        return Err(format!("unknown action: {action}"));
    }
    serde_json::from_value(value).map_err(|e| format!("invalid {action} request: {e}"))
}
