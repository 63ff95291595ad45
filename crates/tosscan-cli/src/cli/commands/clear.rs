//! `tosscan clear <host> [--analyses-only]`

use anyhow::Result;
use tosscan_core::orchestrator::Orchestrator;

pub async fn run_clear(orch: &Orchestrator, host: &str, analyses_only: bool) -> Result<()> {
    if analyses_only {
        let removed = orch.clear_analyses(host).await?;
        println!("Removed {removed} cached analyses for {host}.");
    } else if orch.clear(host).await? {
        println!("Cleared stored results for {host}.");
    } else {
        println!("No stored results for {host}.");
    }
    Ok(())
}
