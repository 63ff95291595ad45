//! HTML page parsing into classifier input.
//!
//! Uses the `scraper` crate. Produces the title and every `a[href]` in
//! document order as an [`Anchor`] with its ancestor chain.

use scraper::{ElementRef, Html, Selector};

use crate::classify::{Anchor, Container};
use crate::model::PageContext;
use crate::url_model::PageLocation;

/// Title and anchors of one HTML document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedPage {
    /// Trimmed `<title>`, empty when missing.
    pub title: String,
    pub anchors: Vec<Anchor>,
}

impl ParsedPage {
    pub fn parse(html: &str) -> Self {
        let document = Html::parse_document(html);
        Self {
            title: document_title(&document).unwrap_or_default(),
            anchors: parse_anchors(&document),
        }
    }
}

/// Builds the [`PageContext`] recorded with a scan.
pub fn page_context(url: &str, location: &PageLocation, title: &str) -> PageContext {
    PageContext {
        title: title.trim().to_string(),
        origin_url: url.to_string(),
        hostname: location.hostname.clone(),
    }
}

/// Trimmed text of the first `<title>`, if non-empty.
pub fn document_title(document: &Html) -> Option<String> {
    let selector = Selector::parse("title").ok()?;
    document
        .select(&selector)
        .next()
        .map(|el| collapse_whitespace(&el.text().collect::<String>()))
        .filter(|t| !t.is_empty())
}

/// Every `a[href]` of `document`, in document order.
pub fn parse_anchors(document: &Html) -> Vec<Anchor> {
    let Ok(selector) = Selector::parse("a[href]") else {
        return Vec::new();
    };
    document.select(&selector).map(anchor_of).collect()
}

fn anchor_of(el: ElementRef<'_>) -> Anchor {
    let attrs = el.value();
    let label = attrs
        .attr("aria-label")
        .or_else(|| attrs.attr("title"))
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(str::to_string);
    let text = collapse_whitespace(&el.text().collect::<String>());
    let href = attrs.attr("href").unwrap_or_default();
    let mut anchor = el
        .ancestors()
        .filter_map(ElementRef::wrap)
        .map(container_of)
        .fold(Anchor::new(text, href), Anchor::within);
    anchor.label = label;
    anchor
}

fn container_of(el: ElementRef<'_>) -> Container {
    let v = el.value();
    Container {
        tag: v.name().to_ascii_lowercase(),
        id: v.attr("id").map(str::to_string),
        class: v.attr("class").map(str::to_string),
    }
}

fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}
