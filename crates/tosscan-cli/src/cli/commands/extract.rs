//! `tosscan extract <url>`: print the text that would be analyzed.

use anyhow::Result;
use tosscan_core::extract::{self, ExtractMode, ExtractOptions};
use tosscan_core::orchestrator::Orchestrator;

pub async fn run_extract(orch: &Orchestrator, url: &str, strip_chrome: bool) -> Result<()> {
    let mut options = ExtractOptions::from(&orch.config().extraction);
    if strip_chrome {
        options.mode = ExtractMode::Document;
    }
    let content = extract::extract(orch.transport(), url, &options).await?;
    if let Some(title) = &content.title {
        eprintln!("title: {title}");
    }
    eprintln!(
        "{} chars{}",
        content.char_count(),
        if content.truncated { " (truncated)" } else { "" }
    );
    println!("{}", content.text);
    Ok(())
}
