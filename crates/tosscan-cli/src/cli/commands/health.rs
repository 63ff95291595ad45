//! `tosscan health`

use anyhow::{bail, Result};
use tosscan_core::orchestrator::Orchestrator;

pub async fn run_health(orch: &Orchestrator) -> Result<()> {
    let base = orch.client().base_url();
    if !orch.check_health().await {
        bail!("analysis service at {base} is not reachable");
    }
    println!("Analysis service at {base} is reachable.");
    Ok(())
}
