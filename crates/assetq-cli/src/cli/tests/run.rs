//! Tests for `assetq run`.

use super::parse;
use crate::cli::{Cli, CliCommand};
use clap::Parser;
use std::path::PathBuf;

#[test]
fn cli_parse_run_defaults() {
    match parse(&["assetq", "run"]) {
        CliCommand::Run {
            site,
            download_dir,
            limit,
            reindex,
        } => {
            assert!(site.is_none());
            assert!(download_dir.is_none());
            assert!(limit.is_none());
            assert!(!reindex);
        }
        _ => panic!("expected Run"),
    }
}

#[test]
fn cli_parse_run_all_flags() {
    match parse(&[
        "assetq",
        "run",
        "--site",
        "ambientcg",
        "--download-dir",
        "/data/textures",
        "--limit",
        "10",
        "--reindex",
    ]) {
        CliCommand::Run {
            site,
            download_dir,
            limit,
            reindex,
        } => {
            assert_eq!(site.as_deref(), Some("ambientcg"));
            assert_eq!(download_dir, Some(PathBuf::from("/data/textures")));
            assert_eq!(limit, Some(10));
            assert!(reindex);
        }
        _ => panic!("expected Run"),
    }
}

#[test]
fn cli_parse_run_rejects_bad_limit() {
    assert!(Cli::try_parse_from(["assetq", "run", "--limit", "many"]).is_err());
    assert!(Cli::try_parse_from(["assetq", "run", "--limit", "-1"]).is_err());
}
