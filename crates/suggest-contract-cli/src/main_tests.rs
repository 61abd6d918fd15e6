// crates/suggest-contract-cli/src/main_tests.rs
// ============================================================================
// Module: CLI Main Tests
// Description: Unit tests for flag mapping, exit codes, and report output.
// Purpose: Ensure setup failures stop the run before any case executes.
// Dependencies: suggest-contract-cli main helpers, tempfile
// ============================================================================

//! ## Overview
//! Exercises `run` with an injected environment lookup so the process
//! environment never leaks into assertions. No test here reaches the network.

#![allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    reason = "Test-only output and panic-based assertions are permitted."
)]

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs;
use std::path::Path;
use std::process::ExitCode;

use clap::Parser;
use suggest_contract_core::ConfigError;
use suggest_contract_core::RequiredOption;
use suggest_contract_core::RunReport;

use super::Cli;
use super::CliError;
use super::run;
use super::write_report;

// ============================================================================
// SECTION: Helpers
// ============================================================================

fn no_env(_: &str) -> Result<Option<String>, ConfigError> {
    Ok(None)
}

fn cli_for(data_dir: &Path, scenarios_file: &Path, scratch: &Path) -> Cli {
    Cli {
        scenarios_file: Some(scenarios_file.display().to_string()),
        service_url: Some("http://127.0.0.1:9".to_string()),
        registry_url: Some("http://127.0.0.1:9/v1".to_string()),
        registry_bucket: Some("main".to_string()),
        registry_collection: Some("quicksuggest".to_string()),
        registry_data_dir: Some(data_dir.display().to_string()),
        registry_attachments_url: Some("https://cdn.example".to_string()),
        audit_log: Some(scratch.join("audit.jsonl").display().to_string()),
        report: Some(scratch.join("report.json")),
        ..Cli::default()
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[test]
fn flags_map_onto_run_options() {
    let cli = Cli::try_parse_from([
        "suggest-contract",
        "--service-url",
        "http://svc",
        "--registry-bucket",
        "main",
        "--request-timeout-sec",
        "5",
        "--scenario",
        "a",
        "--scenario",
        "b",
    ])
    .unwrap();

    let options = cli.run_options();
    assert_eq!(options.service_url.as_deref(), Some("http://svc"));
    assert_eq!(options.registry_bucket.as_deref(), Some("main"));
    assert_eq!(options.request_timeout_secs.as_deref(), Some("5"));
    assert!(options.scenarios_file.is_none());
    assert_eq!(cli.scenarios, vec!["a", "b"]);
}

#[test]
fn missing_options_are_all_reported() {
    let err = run(&Cli::default(), no_env).unwrap_err();
    match err {
        CliError::Config(ConfigError::Missing(missing)) => {
            assert_eq!(missing, RequiredOption::ALL.to_vec());
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn empty_data_dir_fails_session_setup() {
    let data_dir = tempfile::tempdir().unwrap();
    let scratch = tempfile::tempdir().unwrap();
    let scenarios = scratch.path().join("scenarios.yml");
    fs::write(&scenarios, "scenarios: []\n").unwrap();

    let err = run(&cli_for(data_dir.path(), &scenarios, scratch.path()), no_env).unwrap_err();
    assert!(matches!(err, CliError::Session(_)));
    assert!(!scratch.path().join("report.json").exists());
}

#[test]
fn unknown_scenario_selection_is_rejected() {
    let data_dir = tempfile::tempdir().unwrap();
    fs::write(data_dir.path().join("fruit.json"), r#"[{"title": "apple", "icon": 1}]"#).unwrap();
    let scratch = tempfile::tempdir().unwrap();
    let scenarios = scratch.path().join("scenarios.yml");
    fs::write(&scenarios, "scenarios:\n  - name: noop\n    steps: []\n").unwrap();
    let mut cli = cli_for(data_dir.path(), &scenarios, scratch.path());
    cli.scenarios = vec!["missing".to_string()];

    let err = run(&cli, no_env).unwrap_err();
    assert!(matches!(err, CliError::Scenario(_)));
}

#[test]
fn stepless_scenarios_pass_and_write_report() {
    let data_dir = tempfile::tempdir().unwrap();
    fs::write(data_dir.path().join("fruit.json"), r#"[{"title": "apple", "icon": 1}]"#).unwrap();
    let scratch = tempfile::tempdir().unwrap();
    let scenarios = scratch.path().join("scenarios.yml");
    fs::write(&scenarios, "scenarios:\n  - name: noop\n    steps: []\n").unwrap();

    let code = run(&cli_for(data_dir.path(), &scenarios, scratch.path()), no_env).unwrap();
    assert_eq!(code, ExitCode::SUCCESS);

    let report: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(scratch.path().join("report.json")).unwrap())
            .unwrap();
    assert_eq!(report["passed"], 1);
    assert_eq!(report["cases"][0]["id"], "noop");

    let audit = fs::read_to_string(scratch.path().join("audit.jsonl")).unwrap();
    assert!(audit.lines().any(|line| line.contains("\"session_ready\"")));
}

#[test]
fn report_file_write_failures_surface() {
    let scratch = tempfile::tempdir().unwrap();
    let target = scratch.path().join("missing").join("report.json");
    let err = write_report(&RunReport::default(), Some(&target)).unwrap_err();
    assert!(matches!(err, CliError::Output(_)));
}
