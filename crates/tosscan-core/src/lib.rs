//! Core engine of tosscan: finds Terms-of-Service and Privacy-Policy links on
//! web pages, extracts their text and submits it to a remote analysis service.
//!
//! Pipeline: [`page`] parses HTML into anchors, [`classify`] picks the legal
//! links (using [`url_model`] and [`terms`]), [`orchestrator`] stores scans in
//! the [`store`] and runs per-link [`extract`] + [`backend`] analysis.
//! [`command`] exposes all of it as JSON request/response messages.

pub mod config;
pub mod logging;

pub mod backend;
pub mod classify;
pub mod command;
pub mod control;
pub mod extract;
pub mod http;
pub mod model;
pub mod orchestrator;
pub mod page;
pub mod store;
pub mod terms;
pub mod url_model;

#[cfg(test)]
mod testing;
