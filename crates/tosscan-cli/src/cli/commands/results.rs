//! `tosscan results [host]`

use anyhow::Result;
use tosscan_core::orchestrator::Orchestrator;

use crate::cli::display;

pub async fn run_results(orch: &Orchestrator, host: Option<&str>) -> Result<()> {
    let Some(host) = host else {
        let hosts = orch.store().list_hosts().await?;
        if hosts.is_empty() {
            println!("No stored scans.");
        }
        for host in hosts {
            println!("{host}");
        }
        return Ok(());
    };
    match orch.stored(host).await? {
        Some(stored) => display::print_stored(&stored),
        None => println!("No stored scan for {host}."),
    }
    Ok(())
}
