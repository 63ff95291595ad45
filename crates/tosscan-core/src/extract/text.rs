//! HTML to plain text.

use scraper::node::Node;
use scraper::{ElementRef, Html, Selector};

use super::ExtractMode;

/// Never contribute text.
const ALWAYS_SKIPPED: &[&str] = &["script", "style", "noscript", "template", "head"];
/// Page chrome dropped in [`ExtractMode::Document`].
const CHROME: &[&str] = &["nav", "header", "footer", "aside"];
/// Tried in order in [`ExtractMode::Document`] before falling back to `<body>`.
const MAIN_SELECTORS: &[&str] = &[
    "main",
    "article",
    "[role='main']",
    "#content",
    "#main",
    ".content",
    ".main",
];

const BLOCK_TAGS: &[&str] = &[
    "address", "article", "aside", "blockquote", "br", "dd", "details", "div", "dl", "dt",
    "figcaption", "figure", "footer", "form", "h1", "h2", "h3", "h4", "h5", "h6", "header",
    "hr", "li", "main", "nav", "ol", "p", "pre", "section", "summary", "table", "tr", "ul",
];

/// Plain text of `html`, whitespace-normalized.
///
/// Text comes from the main container (document mode) or `<body>`; when that
/// yields nothing, the whole document is used instead.
pub fn html_to_text(html: &str, mode: ExtractMode) -> String {
    let document = Html::parse_document(html);

    let primary = match mode {
        ExtractMode::Document => main_container(&document).or_else(|| body(&document)),
        ExtractMode::Body => body(&document),
    };
    if let Some(root) = primary {
        let text = normalize(&raw_text(root, mode));
        if !text.is_empty() {
            return text;
        }
    }
    normalize(&whole_document_text(&document, mode))
}

fn body(document: &Html) -> Option<ElementRef<'_>> {
    let selector = Selector::parse("body").ok()?;
    document.select(&selector).next()
}

fn main_container(document: &Html) -> Option<ElementRef<'_>> {
    MAIN_SELECTORS.iter().find_map(|css| {
        let selector = Selector::parse(css).ok()?;
        document.select(&selector).next()
    })
}

fn whole_document_text(document: &Html, mode: ExtractMode) -> String {
    let root = document.root_element();
    let mut out = String::new();
    // <head> is skipped everywhere else; its title still counts here.
    for child in root.children().filter_map(ElementRef::wrap) {
        if child.value().name().eq_ignore_ascii_case("head") {
            for el in child.children().filter_map(ElementRef::wrap) {
                if el.value().name().eq_ignore_ascii_case("title") {
                    out.push_str(&el.text().collect::<String>());
                    out.push('\n');
                }
            }
        } else {
            walk(child, mode, &mut out);
        }
    }
    out
}

fn raw_text(root: ElementRef<'_>, mode: ExtractMode) -> String {
    let mut out = String::new();
    walk(root, mode, &mut out);
    out
}

fn skipped(tag: &str, mode: ExtractMode) -> bool {
    ALWAYS_SKIPPED.contains(&tag) || (mode == ExtractMode::Document && CHROME.contains(&tag))
}

fn walk(el: ElementRef<'_>, mode: ExtractMode, out: &mut String) {
    for child in el.children() {
        match child.value() {
            Node::Text(text) => out.push_str(text),
            Node::Element(element) => {
                let tag = element.name().to_ascii_lowercase();
                if skipped(&tag, mode) {
                    continue;
                }
                let Some(child_el) = ElementRef::wrap(child) else {
                    continue;
                };
                let block = BLOCK_TAGS.contains(&tag.as_str());
                if block {
                    out.push('\n');
                } else if tag == "td" || tag == "th" {
                    out.push(' ');
                }
                walk(child_el, mode, out);
                if block {
                    out.push('\n');
                }
            }
            _ => {}
        }
    }
}

/// Trim lines, drop blank ones, collapse inner whitespace runs.
pub(crate) fn normalize(raw: &str) -> String {
    raw.lines()
        .map(|line| line.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}
