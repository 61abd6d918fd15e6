// crates/suggest-contract-cli/src/main.rs
// ============================================================================
// Module: Suggest Contract CLI Entry Point
// Description: Runs the scenario matrix against a deployed suggestion service.
// Purpose: Validate options, open the session, execute cases, and report.
// Dependencies: clap, serde_json, suggest-contract-core, thiserror.
// ============================================================================

//! ## Overview
//! `suggest-contract` validates the required run options, loads registry
//! data and scenarios once, then runs every selected case. The JSON run
//! report goes to stdout (or `--report`), progress lines and audit events go
//! to stderr (or `--audit-log`).
//!
//! Exit codes: `0` when every case passed, `1` when any case failed, `2`
//! when the run could not start.

// ============================================================================
// SECTION: Modules
// ============================================================================

#[cfg(test)]
mod main_tests;

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use suggest_contract_core::AuditSink;
use suggest_contract_core::CaseOutcome;
use suggest_contract_core::ConfigError;
use suggest_contract_core::FileAuditSink;
use suggest_contract_core::RunOptions;
use suggest_contract_core::RunReport;
use suggest_contract_core::ScenarioError;
use suggest_contract_core::ScenarioMatrix;
use suggest_contract_core::ScenarioRunner;
use suggest_contract_core::SessionContext;
use suggest_contract_core::SessionError;
use suggest_contract_core::StderrAuditSink;
use suggest_contract_core::StepError;
use suggest_contract_core::audit::SessionAuditEvent;
use suggest_contract_core::config::read_env_strict;
use thiserror::Error;

// ============================================================================
// SECTION: CLI Types
// ============================================================================

/// Top-level CLI definition.
///
/// Every required option may also come from its environment variable; a
/// non-blank flag wins.
#[derive(Parser, Debug, Default)]
#[command(name = "suggest-contract", version, about = "Contract tests for a suggestion service")]
struct Cli {
    /// Scenario file (`SCENARIOS_FILE`).
    #[arg(long, value_name = "PATH")]
    scenarios_file: Option<String>,
    /// Base URL of the service under test (`SERVICE_URL`).
    #[arg(long, value_name = "URL")]
    service_url: Option<String>,
    /// Registry API root URL (`REGISTRY_URL`).
    #[arg(long, value_name = "URL")]
    registry_url: Option<String>,
    /// Registry bucket (`REGISTRY_BUCKET`).
    #[arg(long, value_name = "BUCKET")]
    registry_bucket: Option<String>,
    /// Registry collection (`REGISTRY_COLLECTION`).
    #[arg(long, value_name = "COLLECTION")]
    registry_collection: Option<String>,
    /// Directory of registry data files (`REGISTRY_DATA_DIR`).
    #[arg(long, value_name = "DIR")]
    registry_data_dir: Option<String>,
    /// Base URL of published attachments (`REGISTRY_ATTACHMENTS_URL`).
    #[arg(long, value_name = "URL")]
    registry_attachments_url: Option<String>,
    /// Outbound request timeout in seconds (`CONTRACT_REQUEST_TIMEOUT_SEC`).
    #[arg(long = "request-timeout-sec", value_name = "SECONDS")]
    request_timeout_sec: Option<String>,
    /// Audit log file; stderr when unset (`CONTRACT_AUDIT_LOG`).
    #[arg(long, value_name = "PATH")]
    audit_log: Option<String>,
    /// Write the JSON run report here instead of stdout.
    #[arg(long, value_name = "PATH")]
    report: Option<PathBuf>,
    /// Run only the named scenario; repeatable.
    #[arg(long = "scenario", value_name = "NAME")]
    scenarios: Vec<String>,
}

impl Cli {
    /// Maps flags onto the core run options.
    fn run_options(&self) -> RunOptions {
        RunOptions {
            scenarios_file: self.scenarios_file.clone(),
            service_url: self.service_url.clone(),
            registry_url: self.registry_url.clone(),
            registry_bucket: self.registry_bucket.clone(),
            registry_collection: self.registry_collection.clone(),
            registry_data_dir: self.registry_data_dir.clone(),
            registry_attachments_url: self.registry_attachments_url.clone(),
            request_timeout_secs: self.request_timeout_sec.clone(),
            audit_log: self.audit_log.clone(),
        }
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Errors that stop a run before or after case execution.
#[derive(Debug, Error)]
enum CliError {
    /// Run options are missing or malformed.
    #[error("usage error: {0}")]
    Config(#[from] ConfigError),
    /// The audit log could not be opened.
    #[error("cannot open audit log {}: {reason}", path.display())]
    Audit {
        /// Audit log path.
        path: PathBuf,
        /// Open failure detail.
        reason: String,
    },
    /// Registry data or the registry client could not be set up.
    #[error("session setup failed: {0}")]
    Session(#[from] SessionError),
    /// The scenario file or selection is invalid.
    #[error("scenario error: {0}")]
    Scenario(#[from] ScenarioError),
    /// The service client could not be built.
    #[error("runner error: {0}")]
    Runner(#[from] StepError),
    /// The report could not be written.
    #[error("cannot write report: {0}")]
    Output(String),
}

/// CLI result alias for fallible operations.
type CliResult<T> = Result<T, CliError>;

/// Exit code for runs with at least one failed case.
const EXIT_CASE_FAILED: u8 = 1;
/// Exit code for runs that could not start or report.
const EXIT_SETUP_FAILED: u8 = 2;

// ============================================================================
// SECTION: Entry Point
// ============================================================================

/// CLI entry point returning an exit code.
fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(&cli, read_env_strict) {
        Ok(code) => code,
        Err(err) => emit_error(&err.to_string()),
    }
}

/// Executes one contract run.
fn run<F>(cli: &Cli, lookup: F) -> CliResult<ExitCode>
where
    F: Fn(&str) -> Result<Option<String>, ConfigError>,
{
    let options = cli.run_options().validate_with(lookup)?;
    let audit = open_audit_sink(options.audit_log.as_deref())?;
    let context = SessionContext::open(&options, audit)?;
    let matrix = ScenarioMatrix::from_file(&options.scenarios_file)?.select(&cli.scenarios)?;
    context.audit().record_session(&SessionAuditEvent::new(
        context.environment().clone(),
        context.records().len(),
        matrix.len(),
    ));

    let runner = ScenarioRunner::new(&context)?;
    let report = runner.run(&matrix);
    for case in &report.cases {
        let line = match (case.outcome, &case.error) {
            (CaseOutcome::Failed, Some(error)) => format!("FAIL {}: {error}", case.id),
            (CaseOutcome::Failed, None) => format!("FAIL {}", case.id),
            (CaseOutcome::Passed, _) => format!("PASS {}", case.id),
        };
        let _ = write_stderr_line(&line);
    }
    let _ = write_stderr_line(&format!("{} passed, {} failed", report.passed, report.failed));
    write_report(&report, cli.report.as_deref())?;

    if report.is_success() {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::from(EXIT_CASE_FAILED))
    }
}

/// Opens the configured audit sink.
fn open_audit_sink(path: Option<&Path>) -> CliResult<Box<dyn AuditSink>> {
    match path {
        Some(path) => {
            let sink = FileAuditSink::new(path).map_err(|err| CliError::Audit {
                path: path.to_path_buf(),
                reason: err.to_string(),
            })?;
            Ok(Box::new(sink))
        }
        None => Ok(Box::new(StderrAuditSink)),
    }
}

/// Writes the JSON run report to a file or stdout.
fn write_report(report: &RunReport, path: Option<&Path>) -> CliResult<()> {
    let payload =
        serde_json::to_string_pretty(report).map_err(|err| CliError::Output(err.to_string()))?;
    match path {
        Some(path) => fs::write(path, format!("{payload}\n"))
            .map_err(|err| CliError::Output(format!("{}: {err}", path.display()))),
        None => write_stdout_line(&payload).map_err(|err| CliError::Output(err.to_string())),
    }
}

// ============================================================================
// SECTION: Output Helpers
// ============================================================================

/// Writes a single line to stdout.
fn write_stdout_line(message: &str) -> std::io::Result<()> {
    let mut stdout = std::io::stdout();
    writeln!(&mut stdout, "{message}")
}

/// Writes a single line to stderr.
fn write_stderr_line(message: &str) -> std::io::Result<()> {
    let mut stderr = std::io::stderr();
    writeln!(&mut stderr, "{message}")
}

/// Emits an error message to stderr and returns the setup-failure exit code.
fn emit_error(message: &str) -> ExitCode {
    let _ = write_stderr_line(message);
    ExitCode::from(EXIT_SETUP_FAILED)
}
