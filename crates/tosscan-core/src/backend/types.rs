//! Wire types of the analysis service.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::model::{ClassifiedLink, ScanResult};

/// Body of a successful `/analyze/` call, kept exactly as the service sent it.
///
/// The service output is model-generated, so its shape is not trusted: any
/// JSON object is accepted and stored verbatim. The accessors below read the
/// usual fields leniently and never fail.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnalysisPayload(Map<String, Value>);

impl AnalysisPayload {
    /// Raw field, as sent.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn summary(&self) -> Option<String> {
        self.get("summary").and_then(lenient_text)
    }

    /// Risk level; numbers are rendered as text.
    pub fn risk_level(&self) -> Option<String> {
        self.get("risk_level").and_then(lenient_text)
    }

    pub fn overall_assessment(&self) -> Option<String> {
        self.get("overall_assessment").and_then(lenient_text)
    }

    pub fn recommendations(&self) -> Vec<String> {
        items(self.get("recommendations"))
            .filter_map(lenient_text)
            .collect()
    }

    pub fn key_clauses(&self) -> Vec<KeyClause> {
        items(self.get("key_clauses"))
            .filter_map(|item| match item {
                Value::Object(fields) => Some(KeyClause {
                    title: field_text(fields, "title"),
                    details: field_text(fields, "details"),
                }),
                other => lenient_text(other).map(|title| KeyClause {
                    title,
                    details: String::new(),
                }),
            })
            .collect()
    }

    pub fn harmful_clauses(&self) -> Vec<HarmfulClause> {
        items(self.get("harmful_clauses_found"))
            .filter_map(|item| match item {
                Value::Object(fields) => Some(HarmfulClause {
                    title: field_text(fields, "title"),
                    severity: field_text(fields, "severity"),
                    category: field_text(fields, "category"),
                    user_impact: field_text(fields, "user_impact"),
                    description: field_text(fields, "description"),
                    clause_text: fields.get("clause_text").and_then(lenient_text),
                }),
                other => lenient_text(other).map(|title| HarmfulClause {
                    title,
                    ..HarmfulClause::default()
                }),
            })
            .collect()
    }
}

/// Read-only view of one `key_clauses` entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyClause {
    pub title: String,
    pub details: String,
}

/// Read-only view of one `harmful_clauses_found` entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HarmfulClause {
    pub title: String,
    pub severity: String,
    pub category: String,
    pub user_impact: String,
    pub description: String,
    pub clause_text: Option<String>,
}

/// Elements of a list field; a lone value counts as a one-element list.
fn items(value: Option<&Value>) -> impl Iterator<Item = &Value> {
    let slice: &[Value] = match value {
        Some(Value::Array(list)) => list,
        Some(Value::Null) | None => &[],
        Some(single) => std::slice::from_ref(single),
    };
    slice.iter()
}

fn field_text(fields: &Map<String, Value>, key: &str) -> String {
    fields.get(key).and_then(lenient_text).unwrap_or_default()
}

/// Text rendering of a scalar or list; `None` for null and empty values.
fn lenient_text(value: &Value) -> Option<String> {
    let text = match value {
        Value::Null => return None,
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Array(list) => list
            .iter()
            .filter_map(lenient_text)
            .collect::<Vec<_>>()
            .join("; "),
        Value::Object(_) => value.to_string(),
    };
    (!text.is_empty()).then_some(text)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalyzeRequest<'a> {
    pub tos_text: &'a str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScrapeRequest<'a> {
    pub url: &'a str,
    pub headless: bool,
    /// Milliseconds.
    pub timeout: u64,
}

/// Body of a successful `/scrape-and-analyze/` call.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ScrapeAndAnalyzeResponse {
    #[serde(default)]
    pub analysis: AnalysisPayload,
    #[serde(default)]
    pub scraping_metadata: Option<Value>,
}

/// Telemetry record posted to `/scan-results/`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanUpload {
    pub domain: String,
    pub url: String,
    pub title: String,
    pub links: Vec<ClassifiedLink>,
    pub timestamp: i64,
}

impl From<&ScanResult> for ScanUpload {
    fn from(scan: &ScanResult) -> Self {
        Self {
            domain: scan.page.hostname.clone(),
            url: scan.page.origin_url.clone(),
            title: scan.page.title.clone(),
            links: scan.links.clone(),
            timestamp: scan.captured_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchUpload<'a> {
    pub scans: &'a [ScanUpload],
}
