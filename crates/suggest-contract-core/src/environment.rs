// crates/suggest-contract-core/src/environment.rs
// ============================================================================
// Module: Registry Environment
// Description: Immutable registry coordinates for a harness run.
// Purpose: Provide one canonical source of server, bucket, and collection.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! [`RegistryEnvironment`] is built once from validated options and only
//! borrowed afterwards. Every registry call takes its coordinates from here.

use serde::Serialize;

/// Coordinates identifying where registry records live.
///
/// # Invariants
/// - Built once per run from validated options and never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegistryEnvironment {
    /// Registry API root URL.
    server: String,
    /// Bucket identifier.
    bucket: String,
    /// Collection identifier.
    collection: String,
}

impl RegistryEnvironment {
    /// Creates a registry environment from validated values.
    #[must_use]
    pub fn new(
        server: impl Into<String>,
        bucket: impl Into<String>,
        collection: impl Into<String>,
    ) -> Self {
        Self {
            server: server.into(),
            bucket: bucket.into(),
            collection: collection.into(),
        }
    }

    /// Returns the registry API root URL.
    #[must_use]
    pub fn server(&self) -> &str {
        &self.server
    }

    /// Returns the bucket identifier.
    #[must_use]
    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    /// Returns the collection identifier.
    #[must_use]
    pub fn collection(&self) -> &str {
        &self.collection
    }
}

impl std::fmt::Display for RegistryEnvironment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} (bucket={}, collection={})", self.server, self.bucket, self.collection)
    }
}
