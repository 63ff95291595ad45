//! Content extraction: fetch a legal document and reduce it to plain text.
//!
//! The result is what gets posted to the analysis service. Pages that yield
//! too little text (typically client-rendered ones) fail with
//! [`ExtractError::InsufficientContent`] so the caller can fall back to a
//! remote render.

mod text;

use std::sync::Arc;

use crate::config::ExtractionConfig;
use crate::http::{self, HttpResponse, HttpTransport};

pub use text::html_to_text;

/// Which part of the document text is taken from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExtractMode {
    /// Everything under `<body>`.
    #[default]
    Body,
    /// Main content container, without nav / header / footer.
    Document,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractOptions {
    pub min_chars: usize,
    pub max_chars: usize,
    pub mode: ExtractMode,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self::from(&ExtractionConfig::default())
    }
}

impl From<&ExtractionConfig> for ExtractOptions {
    fn from(cfg: &ExtractionConfig) -> Self {
        Self {
            min_chars: cfg.min_chars,
            max_chars: cfg.max_chars,
            mode: if cfg.strip_page_chrome {
                ExtractMode::Document
            } else {
                ExtractMode::Body
            },
        }
    }
}

/// Plain text of one fetched document. Not persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedContent {
    pub source_url: String,
    /// At most `max_chars` characters.
    pub text: String,
    pub truncated: bool,
    pub title: Option<String>,
}

impl ExtractedContent {
    pub fn char_count(&self) -> usize {
        self.text.chars().count()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExtractError {
    /// Transport failure or non-2xx status.
    #[error("fetching {url} failed: {reason}")]
    Fetch {
        url: String,
        status: Option<u32>,
        reason: String,
    },
    #[error("{url} yielded {chars} characters of text, fewer than {min}")]
    InsufficientContent { url: String, chars: usize, min: usize },
    #[error("cannot extract text from {url}: {reason}")]
    Parse { url: String, reason: String },
}

/// Fetch `url` and extract its text.
pub async fn extract(
    transport: &Arc<dyn HttpTransport>,
    url: &str,
    options: &ExtractOptions,
) -> Result<ExtractedContent, ExtractError> {
    let response = http::get(transport, url)
        .await
        .map_err(|e| ExtractError::Fetch {
            url: url.to_string(),
            status: None,
            reason: e.to_string(),
        })?;
    let content = extract_from_response(url, &response, options)?;
    tracing::debug!(
        url,
        chars = content.char_count(),
        truncated = content.truncated,
        "extracted document text"
    );
    Ok(content)
}

/// Extraction from an already completed response.
pub fn extract_from_response(
    url: &str,
    response: &HttpResponse,
    options: &ExtractOptions,
) -> Result<ExtractedContent, ExtractError> {
    if !response.is_success() {
        return Err(ExtractError::Fetch {
            url: url.to_string(),
            status: Some(response.status),
            reason: format!("HTTP {}", response.status),
        });
    }
    if let Some(ct) = response.content_type.as_deref() {
        if !is_html_like(ct) {
            return Err(ExtractError::Parse {
                url: url.to_string(),
                reason: format!("unsupported content type {ct}"),
            });
        }
    }

    let html = response.text();
    let text = html_to_text(&html, options.mode);
    let chars = text.chars().count();
    if chars < options.min_chars {
        return Err(ExtractError::InsufficientContent {
            url: url.to_string(),
            chars,
            min: options.min_chars,
        });
    }

    let (text, truncated) = truncate_chars(text, options.max_chars);
    let title = crate::page::document_title(&scraper::Html::parse_document(&html));
    Ok(ExtractedContent {
        source_url: url.to_string(),
        text,
        truncated,
        title,
    })
}

fn is_html_like(content_type: &str) -> bool {
    let mime = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    mime.starts_with("text/") || mime == "application/xhtml+xml"
}

/// Cut `text` to `max` characters on a char boundary.
fn truncate_chars(mut text: String, max: usize) -> (String, bool) {
    match text.char_indices().nth(max) {
        Some((cut, _)) => {
            text.truncate(cut);
            (text, true)
        }
        None => (text, false),
    }
}
