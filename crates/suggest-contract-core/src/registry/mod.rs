// crates/suggest-contract-core/src/registry/mod.rs
// ============================================================================
// Module: Registry
// Description: Registry record model, local fixture loader, and HTTP client.
// Purpose: Mirror the records a run seeds into and reads back from the registry.
// Dependencies: reqwest, serde, serde_json, thiserror, url
// ============================================================================

//! ## Overview
//! Local data files become [`RequestRecord`]s, one per file, each owning one
//! attachment whose bytes are kept verbatim. [`RegistryClient`] is the
//! boundary to the remote registry: a lookup by record id returning a
//! [`ResponseRecord`], and an upload of a [`RequestRecord`].

// ============================================================================
// SECTION: Modules
// ============================================================================

mod client;
mod loader;
mod model;

// ============================================================================
// SECTION: Tests
// ============================================================================


// ============================================================================
// SECTION: Re-exports
// ============================================================================

pub use client::HttpRegistryClient;
pub use client::RegistryClient;
pub use client::RegistryError;
pub use loader::DATA_FILE_EXTENSION;
pub use loader::LoadError;
pub use loader::load_records;
pub use model::ATTACHMENT_MIMETYPE;
pub use model::ICON_RECORD_PREFIX;
pub use model::RegistryRecords;
pub use model::RequestAttachment;
pub use model::RequestRecord;
pub use model::ResponseAttachment;
pub use model::ResponseRecord;
pub use model::Suggestion;
