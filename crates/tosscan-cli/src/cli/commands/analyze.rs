//! `tosscan analyze <host> [indices...] [--all]` and `tosscan analyze-url <url>`

use anyhow::{bail, Result};
use tosscan_core::control::CancelToken;
use tosscan_core::orchestrator::{Orchestrator, OrchestratorError};

use crate::cli::display;

pub async fn run_analyze(
    orch: &Orchestrator,
    host: &str,
    indices: Vec<usize>,
    all: bool,
    force: bool,
) -> Result<()> {
    let indices = if all {
        let Some(stored) = orch.stored(host).await? else {
            return Err(OrchestratorError::NoStoredScan(host.to_string()).into());
        };
        (0..stored.scan.links.len()).collect()
    } else {
        indices
    };
    if indices.is_empty() {
        bail!("no link indices given (use --all to analyze every link)");
    }

    // Ctrl-C stops after the link in flight.
    let cancel = CancelToken::new();
    let on_signal = cancel.clone();
    let watcher = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            eprintln!("cancelling after the current link...");
            on_signal.cancel();
        }
    });

    let outcomes = orch.analyze_selected(host, &indices, &cancel, force).await;
    watcher.abort();
    display::print_batch(&outcomes?);
    Ok(())
}

pub async fn run_analyze_url(orch: &Orchestrator, url: &str) -> Result<()> {
    let record = orch.analyze_url(url).await?;
    println!("{}", record.link.absolute_url);
    display::print_record(&record);
    Ok(())
}
