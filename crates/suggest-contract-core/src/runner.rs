// crates/suggest-contract-core/src/runner.rs
// ============================================================================
// Module: Scenario Runner
// Description: Executes test cases step by step against the service under test.
// Purpose: Turn the scenario matrix into isolated pass/fail results.
// Dependencies: reqwest, serde, serde_json, thiserror
// ============================================================================

//! ## Overview
//! Cases run sequentially; steps within a case run in order and the first
//! failing step fails the case. A failed case never stops its siblings.
//! Expected response content is normalized before comparison: a
//! `request_id` key only asserts presence, and expected suggestions with a
//! `null` icon get the icon URL resolved through the registry.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::thread;
use std::time::Instant;

use reqwest::Method;
use reqwest::StatusCode;
use reqwest::blocking::Client;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::audit::CaseAuditEvent;
use crate::audit::RegistryAuditEvent;
use crate::context::SessionContext;
use crate::icon::IconResolver;
use crate::icon::ResolveError;
use crate::registry::RegistryError;
use crate::scenario::ScenarioMatrix;
use crate::scenario::TestCase;
use crate::scenario::step::ExpectedResponse;
use crate::scenario::step::RegistryUpload;
use crate::scenario::step::ServiceRequest;
use crate::scenario::step::Step;
use crate::scenario::step::StepRequest;
use crate::scenario::step::delay_duration;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Step failures; each one fails only the case it belongs to.
///
/// Step numbers are 1-based.
#[derive(Debug, Error)]
pub enum StepError {
    /// The step does not match the step schema.
    #[error("step {step}: invalid step: {reason}")]
    InvalidStep {
        /// Step number.
        step: usize,
        /// Schema failure detail.
        reason: String,
    },
    /// The request could not be sent or timed out.
    #[error("step {step}: request to {url} failed: {reason}")]
    Transport {
        /// Step number.
        step: usize,
        /// Request URL.
        url: String,
        /// Transport failure detail.
        reason: String,
    },
    /// The response status differs from the expected status.
    #[error("step {step}: expected status {expected}, got {actual}: {body}")]
    Status {
        /// Step number.
        step: usize,
        /// Expected status code.
        expected: u16,
        /// Actual status code.
        actual: u16,
        /// Response body, for diagnosis.
        body: String,
    },
    /// The response body is not the expected JSON document.
    #[error("step {step}: response body is not valid JSON: {reason}")]
    InvalidBody {
        /// Step number.
        step: usize,
        /// Decode failure detail.
        reason: String,
    },
    /// The response content differs from the expected content.
    #[error("step {step}: content mismatch\nexpected: {expected}\nactual: {actual}")]
    ContentMismatch {
        /// Step number.
        step: usize,
        /// Normalized expected content.
        expected: String,
        /// Normalized actual content.
        actual: String,
    },
    /// An expected icon URL could not be resolved.
    #[error("step {step}: {source}")]
    Resolve {
        /// Step number.
        step: usize,
        /// Resolution failure.
        source: ResolveError,
    },
    /// A registry upload failed.
    #[error("step {step}: upload of {filename} failed: {source}")]
    Registry {
        /// Step number.
        step: usize,
        /// Data-file name being uploaded.
        filename: String,
        /// Registry failure.
        source: RegistryError,
    },
    /// A registry step names a data file that was not loaded.
    #[error("step {step}: data file {filename} was not loaded")]
    UnknownDataFile {
        /// Step number.
        step: usize,
        /// Unknown data-file name.
        filename: String,
    },
    /// The HTTP client could not be constructed.
    #[error("http client error: {0}")]
    Client(String),
}

// ============================================================================
// SECTION: Reports
// ============================================================================

/// Case outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CaseOutcome {
    /// Every step passed.
    Passed,
    /// A step failed.
    Failed,
}

/// Result of one case.
#[derive(Debug, Clone, Serialize)]
pub struct CaseReport {
    /// Case identifier.
    pub id: String,
    /// Case outcome.
    pub outcome: CaseOutcome,
    /// Number of steps executed, including a failing one.
    pub steps_run: usize,
    /// Wall-clock duration in milliseconds.
    pub duration_ms: u128,
    /// Failure detail for failed cases.
    pub error: Option<String>,
}

/// Result of a whole run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunReport {
    /// Case results in matrix order.
    pub cases: Vec<CaseReport>,
    /// Number of passed cases.
    pub passed: usize,
    /// Number of failed cases.
    pub failed: usize,
}

impl RunReport {
    /// Returns true when every case passed.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.failed == 0
    }

    /// Appends a case result.
    fn push(&mut self, report: CaseReport) {
        match report.outcome {
            CaseOutcome::Passed => self.passed += 1,
            CaseOutcome::Failed => self.failed += 1,
        }
        self.cases.push(report);
    }
}

// ============================================================================
// SECTION: Runner
// ============================================================================

/// Executes test cases against a shared session context.
pub struct ScenarioRunner<'a> {
    /// Shared session state.
    context: &'a SessionContext,
    /// HTTP client for the service under test.
    client: Client,
}

impl<'a> ScenarioRunner<'a> {
    /// Creates a runner whose requests honor the session timeout.
    ///
    /// # Errors
    ///
    /// Returns [`StepError::Client`] when the HTTP client cannot be constructed.
    pub fn new(context: &'a SessionContext) -> Result<Self, StepError> {
        let client = Client::builder()
            .timeout(context.request_timeout())
            .build()
            .map_err(|err| StepError::Client(err.to_string()))?;
        Ok(Self {
            context,
            client,
        })
    }

    /// Runs every case in matrix order.
    #[must_use]
    pub fn run(&self, matrix: &ScenarioMatrix) -> RunReport {
        let mut report = RunReport::default();
        for case in matrix.cases() {
            report.push(self.run_case(case));
        }
        report
    }

    /// Runs one case, stopping at its first failing step.
    #[must_use]
    pub fn run_case(&self, case: &TestCase) -> CaseReport {
        let started = Instant::now();
        let resolver = self.context.icon_resolver();
        let mut steps_run = 0;
        let mut error = None;
        for (index, value) in case.steps().iter().enumerate() {
            steps_run += 1;
            if let Err(err) = self.run_step(index + 1, value, &resolver) {
                error = Some(err.to_string());
                break;
            }
        }
        let duration_ms = started.elapsed().as_millis();
        self.context.audit().record_case(&CaseAuditEvent::new(
            case.id(),
            steps_run,
            duration_ms,
            error.clone(),
        ));
        CaseReport {
            id: case.id().to_string(),
            outcome: if error.is_some() { CaseOutcome::Failed } else { CaseOutcome::Passed },
            steps_run,
            duration_ms,
            error,
        }
    }

    /// Types and executes one step.
    fn run_step(
        &self,
        step: usize,
        value: &serde_yaml::Value,
        resolver: &IconResolver<'_>,
    ) -> Result<(), StepError> {
        let parsed = Step::parse(value).map_err(|err| StepError::InvalidStep {
            step,
            reason: err.to_string(),
        })?;
        if let Some(seconds) = parsed.request.delay() {
            let delay = delay_duration(seconds).ok_or_else(|| StepError::InvalidStep {
                step,
                reason: format!("delay must be a non-negative number of seconds, got {seconds}"),
            })?;
            thread::sleep(delay);
        }
        match &parsed.request {
            StepRequest::Suggest(request) => {
                let expected = parsed.response.as_ref().ok_or_else(|| StepError::InvalidStep {
                    step,
                    reason: "service requests need a response section".to_string(),
                })?;
                self.run_service_request(step, request, expected, resolver)
            }
            StepRequest::Registry(upload) => self.run_registry_upload(step, upload),
        }
    }

    /// Sends a request to the service under test and checks the response.
    fn run_service_request(
        &self,
        step: usize,
        request: &ServiceRequest,
        expected: &ExpectedResponse,
        resolver: &IconResolver<'_>,
    ) -> Result<(), StepError> {
        let url = join_path(self.context.service_url(), &request.path);
        let method = Method::from_bytes(request.method.to_ascii_uppercase().as_bytes())
            .map_err(|err| StepError::InvalidStep {
                step,
                reason: format!("invalid method {}: {err}", request.method),
            })?;
        let mut builder = self.client.request(method, &url);
        for header in &request.headers {
            builder = builder.header(header.name.as_str(), header.value.as_str());
        }
        let transport = |err: reqwest::Error| StepError::Transport {
            step,
            url: url.clone(),
            reason: err.to_string(),
        };
        let response = builder.send().map_err(transport)?;
        let status = response.status();
        let body = response.text().map_err(transport)?;

        if status.as_u16() != expected.status_code {
            return Err(StepError::Status {
                step,
                expected: expected.status_code,
                actual: status.as_u16(),
                body,
            });
        }
        if status == StatusCode::NO_CONTENT {
            return ensure_empty_body(step, body);
        }
        let Some(expected_content) = &expected.content else {
            return Ok(());
        };

        let mut actual: Value = serde_json::from_str(&body).map_err(|err| {
            StepError::InvalidBody {
                step,
                reason: err.to_string(),
            }
        })?;
        let mut expected_content = expected_content.clone();
        normalize_request_id(step, &mut expected_content, &mut actual)?;
        fill_expected_icons(step, &mut expected_content, resolver)?;
        if !json_matches(&expected_content, &actual) {
            return Err(StepError::ContentMismatch {
                step,
                expected: render(&expected_content),
                actual: render(&actual),
            });
        }
        Ok(())
    }

    /// Uploads the named data files to the registry.
    fn run_registry_upload(&self, step: usize, upload: &RegistryUpload) -> Result<(), StepError> {
        for filename in &upload.filenames {
            let record = self.context.records().get(filename).ok_or_else(|| {
                StepError::UnknownDataFile {
                    step,
                    filename: filename.clone(),
                }
            })?;
            let result = self.context.registry().upload_record(self.context.environment(), record);
            self.context.audit().record_registry(&RegistryAuditEvent::upload(
                &record.id,
                filename,
                result.as_ref().err().map(ToString::to_string),
            ));
            result.map_err(|source| StepError::Registry {
                step,
                filename: filename.clone(),
                source,
            })?;
        }
        Ok(())
    }
}

// ============================================================================
// SECTION: Normalization
// ============================================================================

/// Key whose value is random per response and only checked for presence.
const REQUEST_ID_KEY: &str = "request_id";

/// Drops `request_id` from both sides after checking the actual one is set.
fn normalize_request_id(
    step: usize,
    expected: &mut Value,
    actual: &mut Value,
) -> Result<(), StepError> {
    let Some(expected) = expected.as_object_mut() else {
        return Ok(());
    };
    if expected.remove(REQUEST_ID_KEY).is_none() {
        return Ok(());
    }
    let removed = actual.as_object_mut().and_then(|actual| actual.remove(REQUEST_ID_KEY));
    match removed {
        Some(value) if !value.is_null() => Ok(()),
        _ => Err(StepError::ContentMismatch {
            step,
            expected: format!("a non-null {REQUEST_ID_KEY}"),
            actual: render(actual),
        }),
    }
}

/// Resolves `null` icons of expected suggestions through the registry.
fn fill_expected_icons(
    step: usize,
    expected: &mut Value,
    resolver: &IconResolver<'_>,
) -> Result<(), StepError> {
    let Some(suggestions) = expected.get_mut("suggestions").and_then(Value::as_array_mut) else {
        return Ok(());
    };
    for suggestion in suggestions.iter_mut().filter_map(Value::as_object_mut) {
        if !suggestion.get("icon").is_some_and(Value::is_null) {
            continue;
        }
        let title = suggestion.get("title").and_then(Value::as_str).ok_or_else(|| {
            StepError::InvalidStep {
                step,
                reason: "expected suggestion with a null icon needs a title".to_string(),
            }
        })?;
        let url = resolver.resolve(title).map_err(|source| StepError::Resolve {
            step,
            source,
        })?;
        suggestion.insert("icon".to_string(), Value::String(url));
    }
    Ok(())
}

/// Rejects a body on a response that must carry none.
fn ensure_empty_body(step: usize, body: String) -> Result<(), StepError> {
    if body.is_empty() {
        return Ok(());
    }
    Err(StepError::ContentMismatch {
        step,
        expected: String::new(),
        actual: body,
    })
}

/// Compares JSON documents structurally, treating `1` and `1.0` as equal.
fn json_matches(expected: &Value, actual: &Value) -> bool {
    match (expected, actual) {
        (Value::Number(left), Value::Number(right)) => {
            if left == right {
                return true;
            }
            if left.is_f64() || right.is_f64() {
                return left.as_f64().zip(right.as_f64()).is_some_and(|(left, right)| {
                    (left - right).abs() <= f64::EPSILON * left.abs().max(right.abs())
                });
            }
            false
        }
        (Value::Array(left), Value::Array(right)) => {
            left.len() == right.len()
                && left.iter().zip(right).all(|(left, right)| json_matches(left, right))
        }
        (Value::Object(left), Value::Object(right)) => {
            left.len() == right.len()
                && left
                    .iter()
                    .all(|(key, left)| right.get(key).is_some_and(|right| json_matches(left, right)))
        }
        _ => expected == actual,
    }
}

/// Joins a request path onto the service base URL.
fn join_path(base: &str, path: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), path.trim_start_matches('/'))
}

/// Renders JSON for failure messages.
fn render(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}

// ============================================================================
// SECTION: Tests
// ============================================================================
