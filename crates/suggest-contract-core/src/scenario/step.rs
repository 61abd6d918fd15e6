// crates/suggest-contract-core/src/scenario/step.rs
// ============================================================================
// Module: Scenario Steps
// Description: Typed view of scenario steps for the executor.
// Purpose: Describe requests against the service or the registry and their expectations.
// Dependencies: serde, serde_json, serde_yaml
// ============================================================================

//! ## Overview
//! Steps stay untyped YAML inside the scenario matrix and are typed here
//! only when a case runs, so a malformed step fails its own case. The
//! `service` key selects the target: `suggest` (alias `merino`) or
//! `registry` (alias `kinto`).

use std::time::Duration;

use serde::Deserialize;
use serde_json::Value as JsonValue;
use serde_yaml::Value;

/// One executable step.
#[derive(Debug, Clone, Deserialize)]
pub struct Step {
    /// Request to issue.
    pub request: StepRequest,
    /// Expected response; required for service requests.
    #[serde(default)]
    pub response: Option<ExpectedResponse>,
}

impl Step {
    /// Types an opaque step value.
    ///
    /// # Errors
    ///
    /// Returns the YAML error when the step does not match the step schema.
    pub fn parse(value: &Value) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_value(value.clone())
    }
}

/// Step target, selected by the `service` key.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "service", rename_all = "snake_case")]
pub enum StepRequest {
    /// Request against the suggestion service under test.
    #[serde(alias = "merino")]
    Suggest(ServiceRequest),
    /// Upload of loaded data files to the registry.
    #[serde(alias = "kinto")]
    Registry(RegistryUpload),
}

impl StepRequest {
    /// Returns the delay to wait before issuing the request.
    #[must_use]
    pub const fn delay(&self) -> Option<f64> {
        match self {
            Self::Suggest(request) => request.delay,
            Self::Registry(upload) => upload.delay,
        }
    }
}

/// HTTP request against the service under test.
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceRequest {
    /// HTTP method.
    #[serde(default = "default_method")]
    pub method: String,
    /// Path and query, joined onto the service URL.
    pub path: String,
    /// Request headers in order.
    #[serde(default)]
    pub headers: Vec<Header>,
    /// Seconds to wait before sending.
    #[serde(default)]
    pub delay: Option<f64>,
}

/// Default HTTP method for service requests.
fn default_method() -> String {
    "GET".to_string()
}

/// HTTP header entry.
#[derive(Debug, Clone, Deserialize)]
pub struct Header {
    /// Header name.
    pub name: String,
    /// Header value.
    pub value: String,
}

/// Registry upload of loaded data files.
#[derive(Debug, Clone, Deserialize)]
pub struct RegistryUpload {
    /// Data-file names from the loaded record set.
    pub filenames: Vec<String>,
    /// Seconds to wait before uploading.
    #[serde(default)]
    pub delay: Option<f64>,
}

/// Expected service response.
#[derive(Debug, Clone, Deserialize)]
pub struct ExpectedResponse {
    /// Expected HTTP status code.
    pub status_code: u16,
    /// Expected JSON body, compared after normalization.
    #[serde(default)]
    pub content: Option<JsonValue>,
}

/// Converts a step delay into a duration, rejecting negative or non-finite values.
pub(crate) fn delay_duration(seconds: f64) -> Option<Duration> {
    Duration::try_from_secs_f64(seconds).ok()
}
