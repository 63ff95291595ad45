//! Domain types shared by the classifier, the orchestrator and the store.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::backend::AnalysisPayload;

/// Category of a legal-document link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LinkCategory {
    /// Terms of Service and equivalents.
    #[serde(rename = "tos")]
    LegalTerms,
    /// Privacy policy and equivalents.
    #[serde(rename = "privacy")]
    PrivacyPolicy,
}

impl LinkCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            LinkCategory::LegalTerms => "tos",
            LinkCategory::PrivacyPolicy => "privacy",
        }
    }
}

/// A link the classifier decided points at a legal document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassifiedLink {
    #[serde(rename = "type")]
    pub category: LinkCategory,
    #[serde(rename = "text")]
    pub display_text: String,
    #[serde(rename = "url")]
    pub absolute_url: String,
}

/// Page the scan ran on. Captured once at scan time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageContext {
    pub title: String,
    #[serde(rename = "url")]
    pub origin_url: String,
    #[serde(rename = "domain")]
    pub hostname: String,
}

/// Result of one classification pass over a page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanResult {
    #[serde(rename = "scanResults")]
    pub links: Vec<ClassifiedLink>,
    #[serde(rename = "pageInfo")]
    pub page: PageContext,
    #[serde(rename = "timestamp")]
    pub captured_at: i64,
}

/// Where a successful analysis got its text from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AnalysisSource {
    /// Text extracted locally and posted to the analyze endpoint.
    Extracted { chars: usize, truncated: bool },
    /// Page rendered, extracted and analyzed by the backend in one call.
    RemoteScrape {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        metadata: Option<serde_json::Value>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AnalysisOutcome {
    Analyzed {
        payload: AnalysisPayload,
        source: AnalysisSource,
    },
    Failed {
        reason: String,
    },
}

/// Analysis of one classified link.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisRecord {
    pub link: ClassifiedLink,
    #[serde(flatten)]
    pub outcome: AnalysisOutcome,
    #[serde(rename = "timestamp")]
    pub produced_at: i64,
}

impl AnalysisRecord {
    pub fn is_success(&self) -> bool {
        matches!(self.outcome, AnalysisOutcome::Analyzed { .. })
    }

    pub fn failure_reason(&self) -> Option<&str> {
        match &self.outcome {
            AnalysisOutcome::Failed { reason } => Some(reason),
            AnalysisOutcome::Analyzed { .. } => None,
        }
    }
}

/// Persisted value under `scan_<hostname>`: the latest scan plus per-link analyses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredScan {
    #[serde(flatten)]
    pub scan: ScanResult,
    #[serde(
        rename = "analysisResults",
        default,
        skip_serializing_if = "BTreeMap::is_empty"
    )]
    pub analysis_results: BTreeMap<usize, AnalysisRecord>,
}

impl StoredScan {
    pub fn new(scan: ScanResult) -> Self {
        Self {
            scan,
            analysis_results: BTreeMap::new(),
        }
    }
}

/// Current time as Unix milliseconds.
pub fn epoch_millis() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as i64
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_scan() -> ScanResult {
        ScanResult {
            links: vec![ClassifiedLink {
                category: LinkCategory::PrivacyPolicy,
                display_text: "Privacy Policy".to_string(),
                absolute_url: "https://example.com/privacy".to_string(),
            }],
            page: PageContext {
                title: "Example".to_string(),
                origin_url: "https://example.com/".to_string(),
                hostname: "example.com".to_string(),
            },
            captured_at: 1_700_000_000_000,
        }
    }

    #[test]
    fn classified_link_uses_extension_wire_names() {
        let link = &sample_scan().links[0];
        let json = serde_json::to_value(link).unwrap();
        assert_eq!(json["type"], "privacy");
        assert_eq!(json["text"], "Privacy Policy");
        assert_eq!(json["url"], "https://example.com/privacy");
    }

    #[test]
    fn stored_scan_omits_empty_analysis_map() {
        let stored = StoredScan::new(sample_scan());
        let json = serde_json::to_value(&stored).unwrap();
        assert!(json.get("analysisResults").is_none());
        assert_eq!(json["pageInfo"]["domain"], "example.com");
        assert_eq!(json["scanResults"].as_array().unwrap().len(), 1);
    }

    #[test]
    fn stored_scan_analysis_keys_survive_json() {
        let mut stored = StoredScan::new(sample_scan());
        stored.analysis_results.insert(
            3,
            AnalysisRecord {
                link: stored.scan.links[0].clone(),
                outcome: AnalysisOutcome::Failed {
                    reason: "HTTP 502".to_string(),
                },
                produced_at: 42,
            },
        );
        let json = serde_json::to_string(&stored).unwrap();
        let back: StoredScan = serde_json::from_str(&json).unwrap();
        assert_eq!(back, stored);
        assert_eq!(back.analysis_results[&3].failure_reason(), Some("HTTP 502"));
    }
}
