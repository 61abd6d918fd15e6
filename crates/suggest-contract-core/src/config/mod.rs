// crates/suggest-contract-core/src/config/mod.rs
// ============================================================================
// Module: Run Configuration
// Description: Required-option gatekeeper for contract runs.
// Purpose: Validate run options before any scenario or data file is touched.
// Dependencies: thiserror, url
// ============================================================================

//! ## Overview
//! Run options are sourced from explicit flags first and matching environment
//! variables second. The gatekeeper rejects the run when any of the seven
//! required options is missing, so later components can rely on a fully
//! populated [`ValidatedOptions`].

// ============================================================================
// SECTION: Modules
// ============================================================================

mod options;

// ============================================================================
// SECTION: Tests
// ============================================================================


// ============================================================================
// SECTION: Re-exports
// ============================================================================

pub use options::ConfigError;
pub use options::DEFAULT_REQUEST_TIMEOUT;
pub use options::OptionalEnv;
pub use options::RequiredOption;
pub use options::RunOptions;
pub use options::ValidatedOptions;
pub use options::read_env_strict;
