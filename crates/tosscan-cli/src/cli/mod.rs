//! CLI for tosscan.

mod commands;
mod display;
mod panel;

use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use std::sync::Arc;
use tosscan_core::config::{self, ScannerConfig};
use tosscan_core::http::CurlTransport;
use tosscan_core::orchestrator::Orchestrator;
use tosscan_core::store::ResultStore;

use commands::{
    run_analyze, run_analyze_url, run_clear, run_extract, run_health, run_results, run_scan,
    run_serve, run_upload,
};

/// Top-level CLI for tosscan.
#[derive(Debug, Parser)]
#[command(name = "tosscan")]
#[command(about = "Find and analyze Terms of Service and Privacy Policy links", long_about = None)]
pub struct Cli {
    /// Analysis service base URL (overrides `backend_url` in config.toml).
    #[arg(long, global = true, value_name = "URL")]
    pub backend_url: Option<String>,

    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Fetch a page, classify its legal links and store the result.
    Scan {
        /// HTTP/HTTPS page URL.
        url: String,
        /// Also analyze every link found.
        #[arg(long)]
        analyze: bool,
    },

    /// Show the stored scan of a host, or list scanned hosts.
    Results {
        /// Hostname as shown by `scan` (e.g. example.com).
        host: Option<String>,
    },

    /// Analyze stored links of a host by index.
    Analyze {
        host: String,
        /// Link indices from `results`.
        indices: Vec<usize>,
        /// Analyze every stored link.
        #[arg(long, conflicts_with = "indices")]
        all: bool,
        /// Ignore cached analyses.
        #[arg(long)]
        force: bool,
    },

    /// Analyze a single document URL without storing anything.
    AnalyzeUrl {
        url: String,
    },

    /// Print the plain text extracted from a document.
    Extract {
        url: String,
        /// Drop nav/header/footer and prefer the main content.
        #[arg(long)]
        strip_chrome: bool,
    },

    /// Delete stored results of a host.
    Clear {
        host: String,
        /// Keep the scan, drop only cached analyses.
        #[arg(long)]
        analyses_only: bool,
    },

    /// Check that the analysis service is reachable.
    Health,

    /// Send queued scan results to the analysis service.
    Upload,

    /// Run as a browser native-messaging host on stdin/stdout.
    Serve,

    /// Print shell completions.
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}

impl CliCommand {
    pub async fn run_from_args() -> Result<()> {
        let cli = Cli::parse();

        if let CliCommand::Completions { shell } = cli.command {
            let mut cmd = Cli::command();
            clap_complete::generate(shell, &mut cmd, "tosscan", &mut std::io::stdout());
            return Ok(());
        }

        let mut cfg = config::load_or_init()?;
        if let Some(url) = cli.backend_url {
            cfg.backend_url = url;
        }
        tracing::debug!("loaded config: {:?}", cfg);
        let orch = build_orchestrator(cfg).await?;

        match cli.command {
            CliCommand::Scan { url, analyze } => run_scan(&orch, &url, analyze).await?,
            CliCommand::Results { host } => run_results(&orch, host.as_deref()).await?,
            CliCommand::Analyze {
                host,
                indices,
                all,
                force,
            } => run_analyze(&orch, &host, indices, all, force).await?,
            CliCommand::AnalyzeUrl { url } => run_analyze_url(&orch, &url).await?,
            CliCommand::Extract { url, strip_chrome } => {
                run_extract(&orch, &url, strip_chrome).await?
            }
            CliCommand::Clear {
                host,
                analyses_only,
            } => run_clear(&orch, &host, analyses_only).await?,
            CliCommand::Health => run_health(&orch).await?,
            CliCommand::Upload => run_upload(&orch).await?,
            CliCommand::Serve => run_serve(Arc::new(orch)).await?,
            CliCommand::Completions { .. } => {}
        }

        Ok(())
    }
}

async fn build_orchestrator(cfg: ScannerConfig) -> Result<Orchestrator> {
    let store = ResultStore::open_default().await?;
    let transport = Arc::new(CurlTransport::new(cfg.fetch.clone()));
    Ok(Orchestrator::new(cfg, transport, store))
}

#[cfg(test)]
mod tests;
