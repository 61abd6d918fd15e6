// crates/suggest-contract-core/src/audit.rs
// ============================================================================
// Module: Harness Audit Logging
// Description: Structured audit events for contract runs.
// Purpose: Emit JSON-lines events for session setup, registry calls, and cases.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! Audit events are serialized as one JSON object per line. Sinks swallow
//! write failures so that logging never changes a case outcome.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs::OpenOptions;
use std::io;
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use serde::Serialize;

use crate::environment::RegistryEnvironment;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Outcome label shared by audit events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditOutcome {
    /// Operation succeeded.
    Ok,
    /// Operation failed.
    Error,
}

/// Session setup event, emitted once fixtures and scenarios are loaded.
#[derive(Debug, Clone, Serialize)]
pub struct SessionAuditEvent {
    /// Event identifier.
    pub event: &'static str,
    /// Event timestamp (milliseconds since epoch).
    pub timestamp_ms: u128,
    /// Registry coordinates for the run.
    pub environment: RegistryEnvironment,
    /// Number of loaded registry records.
    pub records: usize,
    /// Number of test cases in the matrix.
    pub cases: usize,
}

/// Registry interaction event (lookup or upload).
#[derive(Debug, Clone, Serialize)]
pub struct RegistryAuditEvent {
    /// Event identifier.
    pub event: &'static str,
    /// Event timestamp (milliseconds since epoch).
    pub timestamp_ms: u128,
    /// Registry record identifier.
    pub record_id: String,
    /// Suggestion title or attachment filename that drove the call.
    pub subject: String,
    /// Call outcome.
    pub outcome: AuditOutcome,
    /// Failure detail when the call failed.
    pub error: Option<String>,
}

/// Test case completion event.
#[derive(Debug, Clone, Serialize)]
pub struct CaseAuditEvent {
    /// Event identifier.
    pub event: &'static str,
    /// Event timestamp (milliseconds since epoch).
    pub timestamp_ms: u128,
    /// Test case identifier (scenario name).
    pub case_id: String,
    /// Case outcome.
    pub outcome: AuditOutcome,
    /// Number of steps executed.
    pub steps_run: usize,
    /// Wall-clock duration in milliseconds.
    pub duration_ms: u128,
    /// Failure detail when the case failed.
    pub error: Option<String>,
}

/// Returns the current time in milliseconds since the epoch.
fn now_millis() -> u128 {
    SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_millis()
}

impl SessionAuditEvent {
    /// Creates a session event with a consistent timestamp.
    #[must_use]
    pub fn new(environment: RegistryEnvironment, records: usize, cases: usize) -> Self {
        Self {
            event: "session_ready",
            timestamp_ms: now_millis(),
            environment,
            records,
            cases,
        }
    }
}

impl RegistryAuditEvent {
    /// Creates a registry lookup event.
    #[must_use]
    pub fn lookup(record_id: &str, title: &str, error: Option<String>) -> Self {
        Self::build("registry_lookup", record_id, title, error)
    }

    /// Creates a registry upload event.
    #[must_use]
    pub fn upload(record_id: &str, filename: &str, error: Option<String>) -> Self {
        Self::build("registry_upload", record_id, filename, error)
    }

    /// Builds an event with the outcome derived from the error.
    fn build(event: &'static str, record_id: &str, subject: &str, error: Option<String>) -> Self {
        Self {
            event,
            timestamp_ms: now_millis(),
            record_id: record_id.to_string(),
            subject: subject.to_string(),
            outcome: if error.is_some() { AuditOutcome::Error } else { AuditOutcome::Ok },
            error,
        }
    }
}

impl CaseAuditEvent {
    /// Creates a case completion event.
    #[must_use]
    pub fn new(case_id: &str, steps_run: usize, duration_ms: u128, error: Option<String>) -> Self {
        Self {
            event: "case_finished",
            timestamp_ms: now_millis(),
            case_id: case_id.to_string(),
            outcome: if error.is_some() { AuditOutcome::Error } else { AuditOutcome::Ok },
            steps_run,
            duration_ms,
            error,
        }
    }
}

// ============================================================================
// SECTION: Trait
// ============================================================================

/// Audit sink for harness events.
pub trait AuditSink: Send + Sync {
    /// Record a session setup event.
    fn record_session(&self, event: &SessionAuditEvent);

    /// Record a registry interaction event.
    fn record_registry(&self, _event: &RegistryAuditEvent) {}

    /// Record a case completion event.
    fn record_case(&self, _event: &CaseAuditEvent) {}
}

/// Audit sink that logs JSON lines to stderr.
pub struct StderrAuditSink;

impl AuditSink for StderrAuditSink {
    fn record_session(&self, event: &SessionAuditEvent) {
        write_stderr(event);
    }

    fn record_registry(&self, event: &RegistryAuditEvent) {
        write_stderr(event);
    }

    fn record_case(&self, event: &CaseAuditEvent) {
        write_stderr(event);
    }
}

/// Writes one JSON line to stderr, ignoring failures.
fn write_stderr<T: Serialize>(event: &T) {
    if let Ok(payload) = serde_json::to_string(event) {
        let _ = writeln!(std::io::stderr(), "{payload}");
    }
}

/// Audit sink that logs JSON lines to a file.
pub struct FileAuditSink {
    /// File handle used for append-only logging.
    file: Mutex<std::fs::File>,
}

impl FileAuditSink {
    /// Opens the audit log file in append mode.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened.
    pub fn new(path: &Path) -> io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            file: Mutex::new(file),
        })
    }

    /// Appends one JSON line, ignoring failures.
    fn write_line<T: Serialize>(&self, event: &T) {
        if let Ok(payload) = serde_json::to_string(event)
            && let Ok(mut file) = self.file.lock()
        {
            let _ = writeln!(file, "{payload}");
            let _ = file.flush();
        }
    }
}

impl AuditSink for FileAuditSink {
    fn record_session(&self, event: &SessionAuditEvent) {
        self.write_line(event);
    }

    fn record_registry(&self, event: &RegistryAuditEvent) {
        self.write_line(event);
    }

    fn record_case(&self, event: &CaseAuditEvent) {
        self.write_line(event);
    }
}

/// No-op audit sink.
pub struct NoopAuditSink;

impl AuditSink for NoopAuditSink {
    fn record_session(&self, _event: &SessionAuditEvent) {}
}

// ============================================================================
// SECTION: Tests
// ============================================================================
