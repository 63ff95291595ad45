//! `tosscan upload`: deliver queued scan results.

use anyhow::Result;
use tosscan_core::orchestrator::Orchestrator;

pub async fn run_upload(orch: &Orchestrator) -> Result<()> {
    let sent = orch.flush_telemetry().await?;
    if sent == 0 {
        println!("Nothing queued.");
    } else {
        println!("Uploaded {sent} queued scan result(s).");
    }
    Ok(())
}
