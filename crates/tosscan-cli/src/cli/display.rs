//! Terminal rendering of scans and analyses.

use tosscan_core::model::{AnalysisOutcome, AnalysisRecord, AnalysisSource, ScanResult, StoredScan};
use tosscan_core::orchestrator::{BatchOutcome, LinkAnalysis};

pub fn print_scan(scan: &ScanResult) {
    let page = &scan.page;
    if page.title.is_empty() {
        println!("{} ({})", page.origin_url, page.hostname);
    } else {
        println!("{} - {} ({})", page.title, page.origin_url, page.hostname);
    }
    if scan.links.is_empty() {
        println!("No legal links found.");
        return;
    }
    println!("{:<4} {:<8} {:<32} {}", "IDX", "TYPE", "TEXT", "URL");
    for (i, link) in scan.links.iter().enumerate() {
        println!(
            "{:<4} {:<8} {:<32} {}",
            i,
            link.category.as_str(),
            clip(&link.display_text, 32),
            link.absolute_url
        );
    }
}

pub fn print_stored(stored: &StoredScan) {
    print_scan(&stored.scan);
    for (index, record) in &stored.analysis_results {
        println!();
        println!("[{index}] {}", record.link.absolute_url);
        print_record(record);
    }
}

pub fn print_link_analysis(analysis: &LinkAnalysis) {
    let cached = if analysis.from_cache { " (cached)" } else { "" };
    println!("[{}] {}{}", analysis.index, analysis.record.link.absolute_url, cached);
    print_record(&analysis.record);
}

pub fn print_batch(outcomes: &[BatchOutcome]) {
    for outcome in outcomes {
        match outcome {
            BatchOutcome::Analyzed(analysis) => print_link_analysis(analysis),
            BatchOutcome::Skipped { index, reason } => println!("[{index}] skipped: {reason}"),
            BatchOutcome::Cancelled { index } => println!("[{index}] cancelled"),
        }
        println!();
    }
}

pub fn print_record(record: &AnalysisRecord) {
    match &record.outcome {
        AnalysisOutcome::Failed { reason } => println!("  failed: {reason}"),
        AnalysisOutcome::Analyzed { payload, source } => {
            match source {
                AnalysisSource::Extracted { chars, truncated } => {
                    let note = if *truncated { ", truncated" } else { "" };
                    println!("  source: extracted text ({chars} chars{note})");
                }
                AnalysisSource::RemoteScrape { .. } => println!("  source: remote scrape"),
            }
            if let Some(risk) = payload.risk_level() {
                println!("  risk: {risk}");
            }
            if let Some(summary) = payload.summary() {
                println!("  summary: {summary}");
            }
            for clause in payload.key_clauses() {
                println!("  clause: {} - {}", clause.title, clause.details);
            }
            for harmful in payload.harmful_clauses() {
                println!(
                    "  harmful [{}]: {} - {}",
                    harmful.severity, harmful.title, harmful.user_impact
                );
            }
            for rec in payload.recommendations() {
                println!("  recommendation: {rec}");
            }
            if let Some(overall) = payload.overall_assessment() {
                println!("  overall: {overall}");
            }
        }
    }
}

/// Cut `s` to at most `max` characters, marking the cut.
pub fn clip(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out: String = s.chars().take(max.saturating_sub(1)).collect();
    out.push('…');
    out
}
