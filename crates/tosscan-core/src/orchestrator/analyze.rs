//! Per-link analysis: extract locally, analyze remotely, fall back to a
//! remote scrape when extraction fails.

use serde::Serialize;

use super::state::{IllegalTransition, LinkProgress, LinkState};
use super::{Orchestrator, OrchestratorError};
use crate::control::CancelToken;
use crate::extract::{self, ExtractOptions};
use crate::model::{
    epoch_millis, AnalysisOutcome, AnalysisRecord, AnalysisSource, ClassifiedLink, LinkCategory,
};
use crate::terms;
use crate::url_model;

/// Result of analyzing one stored link.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkAnalysis {
    pub index: usize,
    #[serde(rename = "analysis")]
    pub record: AnalysisRecord,
    pub from_cache: bool,
    pub trail: Vec<LinkState>,
}

/// Per-index outcome of a batch.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum BatchOutcome {
    Analyzed(LinkAnalysis),
    /// The index could not be analyzed at all (out of range, store failure).
    Skipped { index: usize, reason: String },
    /// Not started because the batch was cancelled.
    Cancelled { index: usize },
}

impl BatchOutcome {
    pub fn index(&self) -> usize {
        match self {
            BatchOutcome::Analyzed(a) => a.index,
            BatchOutcome::Skipped { index, .. } | BatchOutcome::Cancelled { index } => *index,
        }
    }
}

/// True when `record` is younger than `freshness_secs` at `now_ms`.
pub fn is_fresh(record: &AnalysisRecord, now_ms: i64, freshness_secs: u64) -> bool {
    let age = now_ms - record.produced_at;
    let window = i64::try_from(freshness_secs.saturating_mul(1000)).unwrap_or(i64::MAX);
    (0..window).contains(&age)
}

impl Orchestrator {
    /// Analyze link `index` of the scan stored for `hostname`.
    ///
    /// A fresh successful analysis of the same link is returned from the
    /// store unless `force` is set. The new record is stored; a failing
    /// store write is logged and does not fail the call.
    pub async fn analyze_link(
        &self,
        hostname: &str,
        index: usize,
        force: bool,
    ) -> Result<LinkAnalysis, OrchestratorError> {
        let stored = self
            .store
            .get_scan(hostname)
            .await?
            .ok_or_else(|| OrchestratorError::NoStoredScan(hostname.to_string()))?;
        let link = stored.scan.links.get(index).cloned().ok_or_else(|| {
            OrchestratorError::LinkIndexOutOfRange {
                host: hostname.to_string(),
                index,
                len: stored.scan.links.len(),
            }
        })?;

        if !force {
            if let Some(cached) = stored.analysis_results.get(&index) {
                let usable = cached.is_success()
                    && cached.link == link
                    && is_fresh(cached, epoch_millis(), self.config.analysis.freshness_secs);
                if usable {
                    tracing::debug!(host = hostname, index, "analysis served from cache");
                    return Ok(LinkAnalysis {
                        index,
                        record: cached.clone(),
                        from_cache: true,
                        trail: vec![LinkState::Pending, LinkState::Done],
                    });
                }
            }
        }

        let (record, trail) = self.run_link(&link).await;
        match self.store.save_analysis(hostname, index, &record).await {
            Ok(true) => {}
            Ok(false) => tracing::warn!(host = hostname, index, "scan vanished before analysis was stored"),
            Err(e) => tracing::warn!(host = hostname, index, "storing analysis failed: {e:#}"),
        }
        Ok(LinkAnalysis {
            index,
            record,
            from_cache: false,
            trail,
        })
    }

    /// Analyze the given link indices one after another.
    ///
    /// One link's failure never stops the others. `cancel` is checked before
    /// each link; once set, the remaining indices come back as cancelled.
    pub async fn analyze_selected(
        &self,
        hostname: &str,
        indices: &[usize],
        cancel: &CancelToken,
        force: bool,
    ) -> Result<Vec<BatchOutcome>, OrchestratorError> {
        if self.store.get_scan(hostname).await?.is_none() {
            return Err(OrchestratorError::NoStoredScan(hostname.to_string()));
        }

        let mut outcomes = Vec::with_capacity(indices.len());
        for &index in indices {
            if cancel.is_cancelled() {
                outcomes.push(BatchOutcome::Cancelled { index });
                continue;
            }
            let outcome = match self.analyze_link(hostname, index, force).await {
                Ok(analysis) => BatchOutcome::Analyzed(analysis),
                Err(e) => {
                    tracing::warn!(host = hostname, index, "link skipped: {e}");
                    BatchOutcome::Skipped {
                        index,
                        reason: e.to_string(),
                    }
                }
            };
            outcomes.push(outcome);
        }
        let cancelled = outcomes
            .iter()
            .filter(|o| matches!(o, BatchOutcome::Cancelled { .. }))
            .count();
        tracing::info!(host = hostname, total = indices.len(), cancelled, "batch analysis finished");
        Ok(outcomes)
    }

    /// Analyze an arbitrary document URL. Nothing is cached or stored.
    pub async fn analyze_url(&self, url: &str) -> Result<AnalysisRecord, OrchestratorError> {
        if !url_model::is_web_url(url) {
            return Err(OrchestratorError::InvalidPageUrl {
                url: url.to_string(),
                reason: "not an absolute http(s) URL".to_string(),
            });
        }
        let link = ClassifiedLink {
            category: terms::category_of(&[url]).unwrap_or(LinkCategory::LegalTerms),
            display_text: url.to_string(),
            absolute_url: url.to_string(),
        };
        let (record, _) = self.run_link(&link).await;
        Ok(record)
    }

    async fn run_link(&self, link: &ClassifiedLink) -> (AnalysisRecord, Vec<LinkState>) {
        let mut progress = LinkProgress::new();
        let outcome = match self.pipeline(link, &mut progress).await {
            Ok(outcome) => outcome,
            Err(illegal) => {
                tracing::error!(url = %link.absolute_url, "{illegal}");
                progress.fail();
                AnalysisOutcome::Failed {
                    reason: illegal.to_string(),
                }
            }
        };
        match &outcome {
            AnalysisOutcome::Analyzed { .. } => {
                tracing::info!(url = %link.absolute_url, "link analyzed")
            }
            AnalysisOutcome::Failed { reason } => {
                tracing::warn!(url = %link.absolute_url, %reason, "link analysis failed")
            }
        }
        let record = AnalysisRecord {
            link: link.clone(),
            outcome,
            produced_at: epoch_millis(),
        };
        (record, progress.into_trail())
    }

    async fn pipeline(
        &self,
        link: &ClassifiedLink,
        progress: &mut LinkProgress,
    ) -> Result<AnalysisOutcome, IllegalTransition> {
        let url = link.absolute_url.as_str();
        let options = ExtractOptions::from(&self.config.extraction);

        progress.advance(LinkState::Fetching)?;
        let content = match extract::extract(&self.transport, url, &options).await {
            Ok(content) => content,
            Err(e) => {
                tracing::info!(url, "extraction failed, requesting remote scrape: {e}");
                progress.advance(LinkState::FallbackRequested)?;
                let analysis = &self.config.analysis;
                return match self
                    .client
                    .scrape_and_analyze(url, analysis.scrape_headless, analysis.scrape_timeout_ms)
                    .await
                {
                    Ok(resp) => {
                        progress.advance(LinkState::Done)?;
                        Ok(AnalysisOutcome::Analyzed {
                            payload: resp.analysis,
                            source: AnalysisSource::RemoteScrape {
                                metadata: resp.scraping_metadata,
                            },
                        })
                    }
                    Err(e) => {
                        progress.advance(LinkState::Failed)?;
                        Ok(AnalysisOutcome::Failed {
                            reason: e.to_string(),
                        })
                    }
                };
            }
        };

        progress.advance(LinkState::Extracted)?;
        progress.advance(LinkState::Analyzing)?;
        match self.client.analyze(&content.text).await {
            Ok(payload) => {
                progress.advance(LinkState::Done)?;
                Ok(AnalysisOutcome::Analyzed {
                    payload,
                    source: AnalysisSource::Extracted {
                        chars: content.char_count(),
                        truncated: content.truncated,
                    },
                })
            }
            Err(e) => {
                progress.advance(LinkState::Failed)?;
                Ok(AnalysisOutcome::Failed {
                    reason: e.to_string(),
                })
            }
        }
    }
}
