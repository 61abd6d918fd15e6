// crates/suggest-contract-core/src/lib.rs
// ============================================================================
// Module: Suggest Contract Core
// Description: Scenario-driven contract harness for a suggestion service.
// Purpose: Load registry fixtures, expand scenarios, and resolve published icons.
// Dependencies: reqwest, serde, serde_json, serde_yaml, thiserror, url
// ============================================================================

//! ## Overview
//! This crate validates a deployed suggestion service against a known registry
//! state. Session setup runs once: the configuration gatekeeper validates the
//! required run options, the registry data loader builds the in-memory record
//! set, and the scenario matrix builder expands the scenario file into test
//! cases. Each case then runs against a shared, read-only [`SessionContext`].
//!
//! Invariants:
//! - Session-setup failures abort the run before any case executes.
//! - Per-case failures are isolated and never affect sibling cases.
//! - Shared session state is immutable after construction.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod audit;
pub mod config;
pub mod context;
pub mod environment;
pub mod icon;
pub mod registry;
pub mod runner;
pub mod scenario;

// ============================================================================
// SECTION: Re-exports
// ============================================================================

pub use audit::AuditSink;
pub use audit::FileAuditSink;
pub use audit::NoopAuditSink;
pub use audit::StderrAuditSink;
pub use config::ConfigError;
pub use config::RequiredOption;
pub use config::RunOptions;
pub use config::ValidatedOptions;
pub use context::SessionContext;
pub use context::SessionError;
pub use environment::RegistryEnvironment;
pub use icon::IconResolver;
pub use icon::ResolveError;
pub use registry::HttpRegistryClient;
pub use registry::LoadError;
pub use registry::RegistryClient;
pub use registry::RegistryError;
pub use registry::RegistryRecords;
pub use registry::RequestAttachment;
pub use registry::RequestRecord;
pub use registry::ResponseAttachment;
pub use registry::ResponseRecord;
pub use registry::Suggestion;
pub use registry::load_records;
pub use runner::CaseOutcome;
pub use runner::CaseReport;
pub use runner::RunReport;
pub use runner::ScenarioRunner;
pub use runner::StepError;
pub use scenario::Scenario;
pub use scenario::ScenarioError;
pub use scenario::ScenarioMatrix;
pub use scenario::TestCase;
pub use scenario::load_scenarios;
pub use scenario::parse_scenarios;
