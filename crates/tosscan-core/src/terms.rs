//! Keyword matching for legal-document links.
//!
//! Both term lists include bare words ("terms", "privacy", "cookies", "tos"),
//! so false positives such as "photos" are expected.

use crate::model::LinkCategory;

/// Synonyms of "terms of service".
pub const LEGAL_TERMS: &[&str] = &[
    "terms of service",
    "terms of use",
    "user agreement",
    "terms and conditions",
    "service agreement",
    "user terms",
    "website terms",
    "terms & conditions",
    "tos",
    "terms",
    "user policy",
    "service terms",
];

/// Synonyms of "privacy policy".
pub const PRIVACY_TERMS: &[&str] = &[
    "privacy policy",
    "privacy notice",
    "privacy statement",
    "data policy",
    "cookie policy",
    "privacy practices",
    "data protection",
    "privacy & cookies",
    "privacy",
    "data usage",
    "information collection",
    "data security",
    "cookies",
    "information usage",
    "data collection",
    "user privacy",
];

/// Case-insensitive substring match of `text` against any of `terms`.
///
/// Terms are expected in lowercase.
pub fn matches(text: &str, terms: &[&str]) -> bool {
    if text.is_empty() {
        return false;
    }
    let lower = text.to_lowercase();
    terms.iter().any(|term| lower.contains(term))
}

/// Category of the first list any source matches; legal terms are checked first.
pub fn category_of(sources: &[&str]) -> Option<LinkCategory> {
    if sources.iter().any(|s| matches(s, LEGAL_TERMS)) {
        Some(LinkCategory::LegalTerms)
    } else if sources.iter().any(|s| matches(s, PRIVACY_TERMS)) {
        Some(LinkCategory::PrivacyPolicy)
    } else {
        None
    }
}
