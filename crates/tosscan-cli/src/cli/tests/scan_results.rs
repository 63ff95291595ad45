//! Tests for scan, results, clear and the global flag.

use super::parse;
use crate::cli::{Cli, CliCommand};
use clap::Parser;

#[test]
fn cli_parse_scan() {
    match parse(&["tosscan", "scan", "https://example.com/"]) {
        CliCommand::Scan { url, analyze } => {
            assert_eq!(url, "https://example.com/");
            assert!(!analyze);
        }
        _ => panic!("expected Scan"),
    }
}

#[test]
fn cli_parse_scan_analyze() {
    match parse(&["tosscan", "scan", "https://example.com/", "--analyze"]) {
        CliCommand::Scan { analyze, .. } => assert!(analyze),
        _ => panic!("expected Scan --analyze"),
    }
}

#[test]
fn cli_parse_results_with_and_without_host() {
    match parse(&["tosscan", "results"]) {
        CliCommand::Results { host } => assert!(host.is_none()),
        _ => panic!("expected Results"),
    }
    match parse(&["tosscan", "results", "example.com"]) {
        CliCommand::Results { host } => assert_eq!(host.as_deref(), Some("example.com")),
        _ => panic!("expected Results host"),
    }
}

#[test]
fn cli_parse_clear() {
    match parse(&["tosscan", "clear", "example.com", "--analyses-only"]) {
        CliCommand::Clear {
            host,
            analyses_only,
        } => {
            assert_eq!(host, "example.com");
            assert!(analyses_only);
        }
        _ => panic!("expected Clear"),
    }
}

#[test]
fn cli_backend_url_is_global() {
    let cli = Cli::try_parse_from(["tosscan", "health", "--backend-url", "http://h:9/api"]).unwrap();
    assert_eq!(cli.backend_url.as_deref(), Some("http://h:9/api"));
    assert!(matches!(cli.command, CliCommand::Health));

    let cli = Cli::try_parse_from(["tosscan", "--backend-url", "http://h:9/api", "upload"]).unwrap();
    assert_eq!(cli.backend_url.as_deref(), Some("http://h:9/api"));
    assert!(matches!(cli.command, CliCommand::Upload));
}

#[test]
fn cli_parse_serve_and_completions() {
    assert!(matches!(parse(&["tosscan", "serve"]), CliCommand::Serve));
    match parse(&["tosscan", "completions", "bash"]) {
        CliCommand::Completions { shell } => assert_eq!(shell, clap_complete::Shell::Bash),
        _ => panic!("expected Completions"),
    }
}

#[test]
fn cli_rejects_missing_url() {
    assert!(Cli::try_parse_from(["tosscan", "scan"]).is_err());
}
