//! Page URL decomposition: origin, document path and hostname.

use anyhow::{Context, Result};

/// Where a page lives, split the way the resolver and the store need it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageLocation {
    /// `scheme://host[:port]`, no trailing slash.
    pub origin: String,
    /// Document path, always starting with `/`.
    pub path: String,
    /// Host name used as the store key.
    pub hostname: String,
}

impl PageLocation {
    /// Parses a page URL. Only http(s) pages can be scanned.
    pub fn from_url(url: &str) -> Result<Self> {
        let parsed =
            url::Url::parse(url).with_context(|| format!("invalid page URL: {url}"))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            anyhow::bail!("not a web page (scheme {}): {url}", parsed.scheme());
        }
        let hostname = parsed
            .host_str()
            .ok_or_else(|| anyhow::anyhow!("page URL has no host: {url}"))?
            .to_string();
        Ok(Self {
            origin: parsed.origin().ascii_serialization(),
            path: parsed.path().to_string(),
            hostname,
        })
    }
}

/// Host name of `url`, if it parses and has one.
pub fn hostname_of(url: &str) -> Option<String> {
    let parsed = url::Url::parse(url).ok()?;
    parsed.host_str().map(str::to_string)
}

/// True when `url` parses as an absolute http(s) URL with a host.
pub fn is_web_url(url: &str) -> bool {
    url::Url::parse(url)
        .map(|u| matches!(u.scheme(), "http" | "https") && u.host_str().is_some())
        .unwrap_or(false)
}
