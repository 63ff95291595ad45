//! `tosscan scan <url> [--analyze]`

use anyhow::Result;
use tosscan_core::control::CancelToken;
use tosscan_core::orchestrator::Orchestrator;

use crate::cli::display;

pub async fn run_scan(orch: &Orchestrator, url: &str, analyze: bool) -> Result<()> {
    let scan = orch.scan_page(url).await?;
    display::print_scan(&scan);
    if analyze && !scan.links.is_empty() {
        println!();
        let indices: Vec<usize> = (0..scan.links.len()).collect();
        let outcomes = orch
            .analyze_selected(&scan.page.hostname, &indices, &CancelToken::new(), false)
            .await?;
        display::print_batch(&outcomes);
    }
    Ok(())
}
