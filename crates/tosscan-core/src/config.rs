use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// HTTP fetch parameters shared by page scans and content extraction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    pub connect_timeout_secs: u64,
    /// Whole-request timeout for page fetches.
    pub timeout_secs: u64,
    /// Whole-request timeout for calls to the analysis service, which may
    /// render and analyze a page before answering.
    pub backend_timeout_secs: u64,
    pub max_redirects: u32,
    /// Responses larger than this are aborted.
    pub max_body_bytes: usize,
    pub user_agent: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            connect_timeout_secs: 15,
            timeout_secs: 30,
            backend_timeout_secs: 120,
            max_redirects: 10,
            max_body_bytes: 16 * 1024 * 1024,
            user_agent: concat!("tosscan/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

/// HTML-to-text extraction limits (`[extraction]`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Below this many characters the page is treated as unextractable and the
    /// remote scrape-and-analyze fallback is used.
    pub min_chars: usize,
    /// Extracted text is truncated to this many characters.
    pub max_chars: usize,
    /// Also drop nav/header/footer and prefer the main content container.
    pub strip_page_chrome: bool,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            min_chars: 100,
            max_chars: 50_000,
            strip_page_chrome: false,
        }
    }
}

/// Remote analysis parameters (`[analysis]`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Cached analyses younger than this are served without a network call.
    pub freshness_secs: u64,
    pub scrape_headless: bool,
    /// Render budget passed to scrape-and-analyze, in milliseconds.
    pub scrape_timeout_ms: u64,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            freshness_secs: 3600,
            scrape_headless: true,
            scrape_timeout_ms: 30_000,
        }
    }
}

/// Scan-result telemetry (`[telemetry]`). Off unless enabled.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TelemetryConfig {
    pub enabled: bool,
}

/// Global configuration loaded from `~/.config/tosscan/config.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScannerConfig {
    /// Base URL of the analysis service, e.g. `http://localhost:8000/api`.
    pub backend_url: String,
    pub fetch: FetchConfig,
    pub extraction: ExtractionConfig,
    pub analysis: AnalysisConfig,
    pub telemetry: TelemetryConfig,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            backend_url: "http://localhost:8000/api".to_string(),
            fetch: FetchConfig::default(),
            extraction: ExtractionConfig::default(),
            analysis: AnalysisConfig::default(),
            telemetry: TelemetryConfig::default(),
        }
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("tosscan")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<ScannerConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = ScannerConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data = fs::read_to_string(&path)?;
    let cfg: ScannerConfig = toml::from_str(&data)?;
    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_values() {
        let cfg = ScannerConfig::default();
        assert_eq!(cfg.backend_url, "http://localhost:8000/api");
        assert_eq!(cfg.extraction.min_chars, 100);
        assert_eq!(cfg.extraction.max_chars, 50_000);
        assert_eq!(cfg.analysis.freshness_secs, 3600);
        assert_eq!(cfg.analysis.scrape_timeout_ms, 30_000);
        assert!(cfg.analysis.scrape_headless);
        assert!(!cfg.telemetry.enabled);
    }

    #[test]
    fn config_toml_roundtrip() {
        let cfg = ScannerConfig::default();
        let toml = toml::to_string_pretty(&cfg).unwrap();
        let parsed: ScannerConfig = toml::from_str(&toml).unwrap();
        assert_eq!(parsed, cfg);
    }

    #[test]
    fn config_toml_partial_sections() {
        let toml = r#"
            backend_url = "https://analysis.internal/api"

            [extraction]
            min_chars = 250

            [telemetry]
            enabled = true
        "#;
        let cfg: ScannerConfig = toml::from_str(toml).unwrap();
        assert_eq!(cfg.backend_url, "https://analysis.internal/api");
        assert_eq!(cfg.extraction.min_chars, 250);
        assert_eq!(cfg.extraction.max_chars, 50_000);
        assert!(cfg.telemetry.enabled);
        assert_eq!(cfg.fetch.timeout_secs, 30);
    }

    #[test]
    fn empty_file_is_all_defaults() {
        let cfg: ScannerConfig = toml::from_str("").unwrap();
        assert_eq!(cfg, ScannerConfig::default());
    }
}
