//! Relative href resolution against a page origin and path.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    #[error("origin is not an absolute scheme://host origin: {0:?}")]
    InvalidOrigin(String),
}

/// Resolves `href` against `origin` (e.g. `https://example.com`) and the
/// current document path (e.g. `/docs/legal/index.html`).
///
/// Best effort: if the origin is unusable the href is returned unchanged.
/// An empty href resolves to an empty string, which callers treat as "no link".
pub fn resolve(href: &str, origin: &str, current_path: &str) -> String {
    match try_resolve(href, origin, current_path) {
        Ok(url) => url,
        Err(e) => {
            tracing::debug!(href, "href left unresolved: {}", e);
            href.to_string()
        }
    }
}

/// Like [`resolve`] but reports an unusable origin instead of falling back.
pub fn try_resolve(href: &str, origin: &str, current_path: &str) -> Result<String, ResolveError> {
    if href.is_empty() {
        return Ok(String::new());
    }
    if has_http_scheme(href) {
        return Ok(href.to_string());
    }

    let origin = origin.trim_end_matches('/');
    let scheme =
        origin_scheme(origin).ok_or_else(|| ResolveError::InvalidOrigin(origin.to_string()))?;

    if href.starts_with("//") {
        return Ok(format!("{scheme}:{href}"));
    }
    if href.starts_with('/') {
        return Ok(format!("{origin}{href}"));
    }

    let dir = directory_of(current_path);
    if let Some(rest) = href.strip_prefix("./") {
        return Ok(format!("{origin}{dir}{rest}"));
    }
    if href.starts_with("../") {
        return Ok(walk_parent_segments(origin, &dir, href));
    }
    Ok(format!("{origin}{dir}{href}"))
}

fn has_http_scheme(href: &str) -> bool {
    let starts_with = |prefix: &str| {
        href.get(..prefix.len())
            .map(|head| head.eq_ignore_ascii_case(prefix))
            .unwrap_or(false)
    };
    starts_with("http://") || starts_with("https://")
}

/// Returns the scheme when `origin` looks like `scheme://host[:port]`.
fn origin_scheme(origin: &str) -> Option<&str> {
    let (scheme, authority) = origin.split_once("://")?;
    let scheme_ok = !scheme.is_empty()
        && scheme
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'));
    let authority_ok = !authority.is_empty()
        && !authority.contains('/')
        && !authority.chars().any(char::is_whitespace);
    (scheme_ok && authority_ok).then_some(scheme)
}

/// Directory part of a document path, always rooted and ending in `/`.
fn directory_of(current_path: &str) -> String {
    let rooted = if current_path.starts_with('/') {
        current_path.to_string()
    } else {
        format!("/{current_path}")
    };
    match rooted.rfind('/') {
        Some(idx) => rooted[..=idx].to_string(),
        None => "/".to_string(),
    }
}

/// Applies `..` / `.` segments of `href` to the directory stack of `dir`.
fn walk_parent_segments(origin: &str, dir: &str, href: &str) -> String {
    let mut stack: Vec<&str> = dir.split('/').filter(|s| !s.is_empty()).collect();
    for segment in href.split('/') {
        match segment {
            ".." => {
                stack.pop();
            }
            "." | "" => {}
            s => stack.push(s),
        }
    }
    let mut out = format!("{origin}/{}", stack.join("/"));
    if href.ends_with('/') && !stack.is_empty() {
        out.push('/');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const ORIGIN: &str = "https://example.com";

    #[test]
    fn root_relative() {
        assert_eq!(
            resolve("/privacy", ORIGIN, "/any/path"),
            "https://example.com/privacy"
        );
    }

    #[test]
    fn parent_relative_strips_document_name_first() {
        assert_eq!(
            resolve("../tos.html", ORIGIN, "/docs/legal/index.html"),
            "https://example.com/docs/tos.html"
        );
        assert_eq!(
            resolve("../../terms", ORIGIN, "/a/b/c/page"),
            "https://example.com/a/terms"
        );
    }

    #[test]
    fn parent_relative_never_climbs_above_root() {
        assert_eq!(
            resolve("../../../privacy", ORIGIN, "/legal/page"),
            "https://example.com/privacy"
        );
    }

    #[test]
    fn parent_relative_keeps_trailing_slash() {
        assert_eq!(
            resolve("../legal/", ORIGIN, "/docs/help/faq"),
            "https://example.com/docs/legal/"
        );
    }

    #[test]
    fn dot_slash_and_bare_relative_use_current_directory() {
        assert_eq!(
            resolve("./terms.html", ORIGIN, "/help/index.html"),
            "https://example.com/help/terms.html"
        );
        assert_eq!(
            resolve("privacy.html", ORIGIN, "/help/index.html"),
            "https://example.com/help/privacy.html"
        );
        assert_eq!(
            resolve("privacy.html", ORIGIN, "/help/"),
            "https://example.com/help/privacy.html"
        );
    }

    #[test]
    fn absolute_hrefs_unchanged() {
        assert_eq!(
            resolve("https://other.org/terms", ORIGIN, "/"),
            "https://other.org/terms"
        );
        assert_eq!(
            resolve("HTTP://other.org/terms", ORIGIN, "/"),
            "HTTP://other.org/terms"
        );
    }

    #[test]
    fn protocol_relative_takes_origin_scheme() {
        assert_eq!(
            resolve("//cdn.example.net/privacy", ORIGIN, "/"),
            "https://cdn.example.net/privacy"
        );
    }

    #[test]
    fn empty_href_is_empty() {
        assert_eq!(resolve("", ORIGIN, "/x"), "");
    }

    #[test]
    fn origin_with_trailing_slash_and_unrooted_path() {
        assert_eq!(
            resolve("terms", "https://example.com/", ""),
            "https://example.com/terms"
        );
        assert_eq!(
            resolve("terms", ORIGIN, "docs/page"),
            "https://example.com/docs/terms"
        );
    }

    #[test]
    fn bad_origin_falls_back_to_href() {
        assert_eq!(
            try_resolve("/terms", "not an origin", "/"),
            Err(ResolveError::InvalidOrigin("not an origin".to_string()))
        );
        assert_eq!(resolve("/terms", "not an origin", "/"), "/terms");
        assert_eq!(resolve("/terms", "https://", "/"), "/terms");
    }

    #[test]
    fn relative_results_are_valid_urls_under_origin() {
        let hrefs = [
            "/privacy",
            "./a/b",
            "../x",
            "../../y/z.html",
            "terms?lang=en",
            "legal/terms#section-2",
            "//example.com/tos",
        ];
        let paths = ["/", "/a/b/c.html", "/deep/er/", "", "no-slash"];
        for href in hrefs {
            for path in paths {
                let out = resolve(href, ORIGIN, path);
                assert!(out.starts_with(ORIGIN), "{href} @ {path} -> {out}");
                assert!(url::Url::parse(&out).is_ok(), "{href} @ {path} -> {out}");
            }
        }
    }
}
