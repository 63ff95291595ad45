//! URL modeling: page location and href resolution.
//!
//! Turns possibly-relative hrefs found on a page into absolute URLs, and splits
//! page URLs into the origin / path / hostname triple the classifier and the
//! result store key on.

mod origin;
mod resolve;

pub use origin::{hostname_of, is_web_url, PageLocation};
pub use resolve::{resolve, try_resolve, ResolveError};
