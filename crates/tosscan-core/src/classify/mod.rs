//! Link classification: which anchors on a page point at legal documents.
//!
//! Works on plain anchor tuples rather than a live DOM so it can run on
//! anchors parsed from fetched HTML ([`crate::page`]) or on anchors a browser
//! content script collected and sent over the host messaging surface.
//!
//! Two passes run over the anchors:
//! 1. every anchor, matching its text and resolved URL;
//! 2. anchors inside footer / nav regions, additionally matching the anchor's
//!    accessible label and the class / id names of the containers between
//!    the anchor and the region. This recovers icon-only links.
//!
//! Results are de-duplicated by absolute URL, first occurrence wins.

mod region;

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::model::{ClassifiedLink, LinkCategory};
use crate::terms;
use crate::url_model;

pub use region::RegionKind;

/// An ancestor element of an anchor.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Container {
    pub tag: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class: Option<String>,
}

/// One `<a href>` as seen on a page.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Anchor {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub href: String,
    /// `aria-label` or `title`, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Ancestor elements, innermost first.
    #[serde(default)]
    pub containers: Vec<Container>,
}

impl Anchor {
    pub fn new(text: impl Into<String>, href: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            href: href.into(),
            ..Self::default()
        }
    }

    /// Adds the next enclosing container (containers go innermost first).
    pub fn within(mut self, container: Container) -> Self {
        self.containers.push(container);
        self
    }
}

/// Why an anchor was left out without being matched. Logged, never surfaced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassificationSkip {
    EmptyHref,
    FragmentOnly,
    NonNavigationalScheme,
    Unresolvable,
}

const NON_NAVIGATIONAL_SCHEMES: &[&str] = &["javascript:", "mailto:", "tel:", "data:"];

/// An anchor that survived inspection, with its resolved URL.
struct Candidate<'a> {
    anchor: &'a Anchor,
    text: &'a str,
    url: String,
}

/// Classifies `anchors` found on the page at `origin` + `current_path`.
///
/// Never fails: anchors that cannot be inspected are skipped. The output is
/// deterministic for a given input.
pub fn classify(anchors: &[Anchor], origin: &str, current_path: &str) -> Vec<ClassifiedLink> {
    let candidates: Vec<Candidate<'_>> = anchors
        .iter()
        .filter_map(|anchor| match inspect(anchor, origin, current_path) {
            Ok(candidate) => Some(candidate),
            Err(skip) => {
                tracing::trace!(href = %anchor.href, ?skip, "anchor skipped");
                None
            }
        })
        .collect();

    let mut seen: HashSet<String> = HashSet::new();
    let mut links = Vec::new();

    for c in &candidates {
        if let Some(category) = terms::category_of(&[c.text, c.url.as_str()]) {
            push_unique(&mut links, &mut seen, c, category);
        }
    }

    let primary = links.len();
    for kind in RegionKind::ALL {
        for c in &candidates {
            let Some(at) = region::region_position(&c.anchor.containers, kind) else {
                continue;
            };
            let mut sources = vec![c.text, c.url.as_str()];
            if let Some(label) = c.anchor.label.as_deref() {
                sources.push(label);
            }
            sources.extend(region::inner_hints(&c.anchor.containers, at));
            if let Some(category) = terms::category_of(&sources) {
                push_unique(&mut links, &mut seen, c, category);
            }
        }
    }

    tracing::debug!(
        anchors = anchors.len(),
        primary,
        region_added = links.len() - primary,
        "classified page links"
    );
    links
}

fn inspect<'a>(
    anchor: &'a Anchor,
    origin: &str,
    current_path: &str,
) -> Result<Candidate<'a>, ClassificationSkip> {
    let href = anchor.href.trim();
    if href.is_empty() {
        return Err(ClassificationSkip::EmptyHref);
    }
    if href.starts_with('#') {
        return Err(ClassificationSkip::FragmentOnly);
    }
    let lower = href.to_ascii_lowercase();
    if NON_NAVIGATIONAL_SCHEMES.iter().any(|s| lower.starts_with(s)) {
        return Err(ClassificationSkip::NonNavigationalScheme);
    }
    let url = url_model::resolve(href, origin, current_path);
    if !url_model::is_web_url(&url) {
        return Err(ClassificationSkip::Unresolvable);
    }
    Ok(Candidate {
        anchor,
        text: anchor.text.trim(),
        url,
    })
}

fn push_unique(
    links: &mut Vec<ClassifiedLink>,
    seen: &mut HashSet<String>,
    c: &Candidate<'_>,
    category: LinkCategory,
) {
    if !seen.insert(c.url.clone()) {
        return;
    }
    let display_text = if c.text.is_empty() {
        c.anchor.label.as_deref().unwrap_or_default().trim().to_string()
    } else {
        c.text.to_string()
    };
    links.push(ClassifiedLink {
        category,
        display_text,
        absolute_url: c.url.clone(),
    });
}
