// crates/suggest-contract-core/src/context.rs
// ============================================================================
// Module: Session Context
// Description: Read-only state shared by every test case in a run.
// Purpose: Thread environment, records, and clients into cases explicitly.
// Dependencies: thiserror
// ============================================================================

//! ## Overview
//! [`SessionContext`] is built once after the gatekeeper passes and is then
//! only borrowed. Because nothing in it is mutated after construction, cases
//! may share it across threads without locking.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::time::Duration;

use thiserror::Error;

use crate::audit::AuditSink;
use crate::config::ValidatedOptions;
use crate::environment::RegistryEnvironment;
use crate::icon::IconResolver;
use crate::registry::HttpRegistryClient;
use crate::registry::LoadError;
use crate::registry::RegistryClient;
use crate::registry::RegistryError;
use crate::registry::RegistryRecords;
use crate::registry::load_records;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Session setup errors; any of these aborts the run.
#[derive(Debug, Error)]
pub enum SessionError {
    /// Registry fixture data could not be loaded.
    #[error(transparent)]
    Load(#[from] LoadError),
    /// The registry client could not be built.
    #[error(transparent)]
    Registry(#[from] RegistryError),
}

// ============================================================================
// SECTION: Context
// ============================================================================

/// Session-scoped, read-only harness state.
pub struct SessionContext {
    /// Registry coordinates.
    environment: RegistryEnvironment,
    /// Loaded registry records.
    records: RegistryRecords,
    /// Base URL for published attachments.
    attachments_url: String,
    /// Base URL of the service under test.
    service_url: String,
    /// Timeout applied to outbound requests.
    request_timeout: Duration,
    /// Registry boundary.
    registry: Box<dyn RegistryClient>,
    /// Audit sink for harness events.
    audit: Box<dyn AuditSink>,
}

impl SessionContext {
    /// Builds a context from already loaded parts.
    #[must_use]
    pub fn new(
        options: &ValidatedOptions,
        records: RegistryRecords,
        registry: Box<dyn RegistryClient>,
        audit: Box<dyn AuditSink>,
    ) -> Self {
        Self {
            environment: options.environment(),
            records,
            attachments_url: options.registry_attachments_url.clone(),
            service_url: options.service_url.clone(),
            request_timeout: options.request_timeout,
            registry,
            audit,
        }
    }

    /// Loads registry data and builds the HTTP registry client.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError`] when the data directory yields no usable
    /// records or the client cannot be constructed.
    pub fn open(
        options: &ValidatedOptions,
        audit: Box<dyn AuditSink>,
    ) -> Result<Self, SessionError> {
        let records = load_records(&options.registry_data_dir)?;
        let registry = HttpRegistryClient::new(options.request_timeout)?;
        Ok(Self::new(options, records, Box::new(registry), audit))
    }

    /// Returns the registry coordinates.
    #[must_use]
    pub const fn environment(&self) -> &RegistryEnvironment {
        &self.environment
    }

    /// Returns the loaded registry records.
    #[must_use]
    pub const fn records(&self) -> &RegistryRecords {
        &self.records
    }

    /// Returns the base URL of the service under test.
    #[must_use]
    pub fn service_url(&self) -> &str {
        &self.service_url
    }

    /// Returns the outbound request timeout.
    #[must_use]
    pub const fn request_timeout(&self) -> Duration {
        self.request_timeout
    }

    /// Returns the registry boundary.
    #[must_use]
    pub fn registry(&self) -> &dyn RegistryClient {
        self.registry.as_ref()
    }

    /// Returns the audit sink.
    #[must_use]
    pub fn audit(&self) -> &dyn AuditSink {
        self.audit.as_ref()
    }

    /// Builds an icon resolver borrowing this context.
    #[must_use]
    pub fn icon_resolver(&self) -> IconResolver<'_> {
        IconResolver::new(
            &self.records,
            &self.environment,
            self.registry.as_ref(),
            &self.attachments_url,
            self.audit.as_ref(),
        )
    }
}
