// crates/suggest-contract-core/src/registry/client.rs
// ============================================================================
// Module: Registry Client
// Description: Lookup and upload of registry records over HTTP.
// Purpose: Provide the harness boundary to the remote registry.
// Dependencies: reqwest, serde, thiserror, url
// ============================================================================

//! ## Overview
//! [`HttpRegistryClient`] speaks the Kinto-style records API rooted at the
//! environment's server URL:
//! `{server}/buckets/{bucket}/collections/{collection}/records/{id}`.
//! Invariants:
//! - Every request is bounded by the configured timeout.
//! - Failures are never retried here; a failure fails the calling case.
//! - Attachment bytes are uploaded exactly as loaded.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::time::Duration;

use reqwest::StatusCode;
use reqwest::blocking::Client;
use reqwest::blocking::multipart::Form;
use reqwest::blocking::multipart::Part;
use serde::Deserialize;
use serde_json::json;
use thiserror::Error;
use url::Url;

use super::model::RequestRecord;
use super::model::ResponseRecord;
use crate::environment::RegistryEnvironment;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Registry call errors.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// The registry has no record with the requested id.
    #[error("registry record {record_id} not found")]
    NotFound {
        /// Requested record id.
        record_id: String,
    },
    /// The request could not be sent or timed out.
    #[error("registry request to {url} failed: {reason}")]
    Transport {
        /// Request URL.
        url: String,
        /// Transport failure detail.
        reason: String,
    },
    /// The registry answered with an unexpected status.
    #[error("registry request to {url} returned http status {status}")]
    Status {
        /// Request URL.
        url: String,
        /// Response status code.
        status: u16,
    },
    /// The registry response body was malformed.
    #[error("registry response from {url} is malformed: {reason}")]
    Decode {
        /// Request URL.
        url: String,
        /// Decode failure detail.
        reason: String,
    },
    /// The registry URL cannot be extended with record path segments.
    #[error("invalid registry url {0}")]
    InvalidUrl(String),
    /// The HTTP client could not be constructed.
    #[error("registry client error: {0}")]
    Client(String),
}

// ============================================================================
// SECTION: Trait
// ============================================================================

/// Boundary to the remote registry.
pub trait RegistryClient: Send + Sync {
    /// Fetches the published view of a record.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::NotFound`] when the record does not exist and
    /// other [`RegistryError`] variants on transport or decode failures.
    fn get_record(
        &self,
        environment: &RegistryEnvironment,
        record_id: &str,
    ) -> Result<ResponseRecord, RegistryError>;

    /// Creates or replaces a record and uploads its attachment.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError`] when either request fails.
    fn upload_record(
        &self,
        environment: &RegistryEnvironment,
        record: &RequestRecord,
    ) -> Result<(), RegistryError>;
}

// ============================================================================
// SECTION: HTTP Client
// ============================================================================

/// Response envelope wrapping a record.
#[derive(Debug, Deserialize)]
struct RecordEnvelope {
    /// Wrapped record.
    data: ResponseRecord,
}

/// Blocking HTTP registry client.
#[derive(Debug, Clone)]
pub struct HttpRegistryClient {
    /// HTTP client used for registry requests.
    client: Client,
}

impl HttpRegistryClient {
    /// Builds a client whose requests are bounded by `timeout`.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Client`] when the HTTP client cannot be constructed.
    pub fn new(timeout: Duration) -> Result<Self, RegistryError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| RegistryError::Client(err.to_string()))?;
        Ok(Self {
            client,
        })
    }

    /// Creates a registry client with a preconfigured HTTP client.
    #[must_use]
    pub const fn with_client(client: Client) -> Self {
        Self {
            client,
        }
    }
}

impl RegistryClient for HttpRegistryClient {
    fn get_record(
        &self,
        environment: &RegistryEnvironment,
        record_id: &str,
    ) -> Result<ResponseRecord, RegistryError> {
        let url = record_url(environment, record_id, &[])?;
        let response = self
            .client
            .get(url.as_str())
            .send()
            .map_err(|err| transport_error(&url, &err))?;
        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(RegistryError::NotFound {
                record_id: record_id.to_string(),
            });
        }
        if !status.is_success() {
            return Err(RegistryError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        let envelope: RecordEnvelope = response.json().map_err(|err| RegistryError::Decode {
            url: url.to_string(),
            reason: err.to_string(),
        })?;
        Ok(envelope.data)
    }

    fn upload_record(
        &self,
        environment: &RegistryEnvironment,
        record: &RequestRecord,
    ) -> Result<(), RegistryError> {
        let url = record_url(environment, &record.id, &[])?;
        let response = self
            .client
            .put(url.as_str())
            .json(&json!({ "data": { "id": record.id } }))
            .send()
            .map_err(|err| transport_error(&url, &err))?;
        ensure_success(&url, response.status())?;

        let attachment = &record.attachment;
        let part = Part::bytes(attachment.content.clone())
            .file_name(attachment.filename.clone())
            .mime_str(attachment.mimetype)
            .map_err(|err| RegistryError::Client(err.to_string()))?;
        let form = Form::new().part("attachment", part);
        let url = record_url(environment, &record.id, &["attachment"])?;
        let response = self
            .client
            .post(url.as_str())
            .multipart(form)
            .send()
            .map_err(|err| transport_error(&url, &err))?;
        ensure_success(&url, response.status())
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Builds the record URL, percent-encoding each path segment.
fn record_url(
    environment: &RegistryEnvironment,
    record_id: &str,
    suffix: &[&str],
) -> Result<Url, RegistryError> {
    let mut url = Url::parse(environment.server())
        .map_err(|err| RegistryError::InvalidUrl(format!("{}: {err}", environment.server())))?;
    {
        let mut segments = url
            .path_segments_mut()
            .map_err(|()| RegistryError::InvalidUrl(environment.server().to_string()))?;
        segments.pop_if_empty().extend([
            "buckets",
            environment.bucket(),
            "collections",
            environment.collection(),
            "records",
            record_id,
        ]);
        segments.extend(suffix);
    }
    Ok(url)
}

/// Maps a reqwest failure into a transport error.
fn transport_error(url: &Url, err: &reqwest::Error) -> RegistryError {
    let reason = if err.is_timeout() { format!("timed out: {err}") } else { err.to_string() };
    RegistryError::Transport {
        url: url.to_string(),
        reason,
    }
}

/// Rejects non-success statuses.
fn ensure_success(url: &Url, status: StatusCode) -> Result<(), RegistryError> {
    if status.is_success() {
        Ok(())
    } else {
        Err(RegistryError::Status {
            url: url.to_string(),
            status: status.as_u16(),
        })
    }
}
