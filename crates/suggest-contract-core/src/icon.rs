// crates/suggest-contract-core/src/icon.rs
// ============================================================================
// Module: Icon Resolver
// Description: Maps a suggestion title to its published icon URL.
// Purpose: Round-trip through the registry to compute expected icon URLs.
// Dependencies: thiserror
// ============================================================================

//! ## Overview
//! Resolution runs in three steps: find the suggestion by exact title in the
//! loaded records, look up the `icon-<id>` record in the registry, then join
//! the published location onto the attachments base URL.
//! Invariants:
//! - An unknown title is an error, never an empty URL.
//! - Every call performs one fresh registry lookup; nothing is cached.

// ============================================================================
// SECTION: Imports
// ============================================================================

use thiserror::Error;

use crate::audit::AuditSink;
use crate::audit::RegistryAuditEvent;
use crate::environment::RegistryEnvironment;
use crate::registry::RegistryClient;
use crate::registry::RegistryError;
use crate::registry::RegistryRecords;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Icon resolution errors.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Error)]
pub enum ResolveError {
    /// No loaded suggestion carries the title.
    #[error("no suggestion titled '{title}' in the loaded registry data")]
    TitleNotFound {
        /// Requested title.
        title: String,
    },
    /// The registry lookup for the icon record failed.
    #[error("icon lookup for '{title}' (record {record_id} in {environment}) failed: {source}")]
    Lookup {
        /// Requested title.
        title: String,
        /// Icon record id that was looked up.
        record_id: String,
        /// Registry coordinates of the lookup.
        environment: String,
        /// Underlying registry failure.
        source: RegistryError,
    },
}

// ============================================================================
// SECTION: Resolver
// ============================================================================

/// Resolves suggestion titles into published icon URLs.
///
/// Borrows the session's read-only state, so concurrent resolvers are safe.
pub struct IconResolver<'a> {
    /// Loaded registry records.
    records: &'a RegistryRecords,
    /// Registry coordinates.
    environment: &'a RegistryEnvironment,
    /// Registry boundary.
    client: &'a dyn RegistryClient,
    /// Base URL for published attachments.
    attachments_url: &'a str,
    /// Audit sink for lookup events.
    audit: &'a dyn AuditSink,
}

impl<'a> IconResolver<'a> {
    /// Creates a resolver over borrowed session state.
    #[must_use]
    pub fn new(
        records: &'a RegistryRecords,
        environment: &'a RegistryEnvironment,
        client: &'a dyn RegistryClient,
        attachments_url: &'a str,
        audit: &'a dyn AuditSink,
    ) -> Self {
        Self {
            records,
            environment,
            client,
            attachments_url,
            audit,
        }
    }

    /// Returns the published icon URL for the suggestion with `title`.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError::TitleNotFound`] when no loaded suggestion has
    /// the title, and [`ResolveError::Lookup`] when the registry call fails.
    pub fn resolve(&self, title: &str) -> Result<String, ResolveError> {
        let suggestion =
            self.records.find_suggestion(title).ok_or_else(|| ResolveError::TitleNotFound {
                title: title.to_string(),
            })?;
        let record_id = suggestion.icon_record_id();
        match self.client.get_record(self.environment, &record_id) {
            Ok(record) => {
                self.audit.record_registry(&RegistryAuditEvent::lookup(&record_id, title, None));
                Ok(join_location(self.attachments_url, &record.attachment.location))
            }
            Err(source) => {
                self.audit.record_registry(&RegistryAuditEvent::lookup(
                    &record_id,
                    title,
                    Some(source.to_string()),
                ));
                Err(ResolveError::Lookup {
                    title: title.to_string(),
                    record_id,
                    environment: self.environment.to_string(),
                    source,
                })
            }
        }
    }
}

/// Joins a published location onto the attachments base URL.
fn join_location(base: &str, location: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), location.trim_start_matches('/'))
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    #![allow(
        clippy::expect_used,
        clippy::unwrap_used,
        reason = "Test-only assertions favor direct unwrap/expect for clarity."
    )]

    use std::collections::BTreeMap;
    use std::sync::Mutex;

    use super::IconResolver;
    use super::ResolveError;
    use super::join_location;
    use crate::audit::NoopAuditSink;
    use crate::environment::RegistryEnvironment;
    use crate::registry::ATTACHMENT_MIMETYPE;
    use crate::registry::RegistryClient;
    use crate::registry::RegistryError;
    use crate::registry::RegistryRecords;
    use crate::registry::RequestAttachment;
    use crate::registry::RequestRecord;
    use crate::registry::ResponseAttachment;
    use crate::registry::ResponseRecord;
    use crate::registry::Suggestion;

    /// Registry stub answering from a fixed id-to-location table.
    struct TableRegistry {
        locations: BTreeMap<String, String>,
        lookups: Mutex<Vec<String>>,
    }

    impl TableRegistry {
        fn new(entries: &[(&str, &str)]) -> Self {
            Self {
                locations: entries
                    .iter()
                    .map(|(id, location)| ((*id).to_string(), (*location).to_string()))
                    .collect(),
                lookups: Mutex::new(Vec::new()),
            }
        }
    }

    impl RegistryClient for TableRegistry {
        fn get_record(
            &self,
            _environment: &RegistryEnvironment,
            record_id: &str,
        ) -> Result<ResponseRecord, RegistryError> {
            self.lookups.lock().unwrap().push(record_id.to_string());
            let location = self.locations.get(record_id).ok_or_else(|| RegistryError::NotFound {
                record_id: record_id.to_string(),
            })?;
            Ok(ResponseRecord {
                id: record_id.to_string(),
                attachment: ResponseAttachment {
                    location: location.clone(),
                    filename: None,
                    mimetype: None,
                    hash: None,
                    size: None,
                },
            })
        }

        fn upload_record(
            &self,
            _environment: &RegistryEnvironment,
            _record: &RequestRecord,
        ) -> Result<(), RegistryError> {
            Ok(())
        }
    }

    fn record(stem: &str, suggestions: &[(&str, &str)]) -> (String, RequestRecord) {
        let suggestions = suggestions
            .iter()
            .map(|(title, icon)| Suggestion {
                title: (*title).to_string(),
                icon: (*icon).to_string(),
                extra: serde_json::Map::new(),
            })
            .collect();
        let filename = format!("{stem}.json");
        (
            filename.clone(),
            RequestRecord {
                id: stem.to_string(),
                attachment: RequestAttachment {
                    filename,
                    content: Vec::new(),
                    mimetype: ATTACHMENT_MIMETYPE,
                    suggestions,
                },
            },
        )
    }

    fn records() -> RegistryRecords {
        RegistryRecords::from_map(
            [record("fruit", &[("apple", "1001")]), record("nuts", &[("pecan", "2002")])]
                .into_iter()
                .collect(),
        )
    }

    #[test]
    fn resolves_title_through_icon_record() {
        let records = records();
        let environment = RegistryEnvironment::new("http://registry/v1", "main", "quicksuggest");
        let registry = TableRegistry::new(&[("icon-1001", "main/icons/apple.png")]);
        let resolver = IconResolver::new(
            &records,
            &environment,
            &registry,
            "http://cdn.example/attachments",
            &NoopAuditSink,
        );

        let url = resolver.resolve("apple").unwrap();
        assert_eq!(url, "http://cdn.example/attachments/main/icons/apple.png");
        assert_eq!(*registry.lookups.lock().unwrap(), vec!["icon-1001".to_string()]);
    }

    #[test]
    fn resolves_only_from_the_file_defining_the_title() {
        let records = records();
        let environment = RegistryEnvironment::new("http://registry/v1", "main", "quicksuggest");
        let registry =
            TableRegistry::new(&[("icon-1001", "apple.png"), ("icon-2002", "pecan.png")]);
        let resolver =
            IconResolver::new(&records, &environment, &registry, "http://cdn", &NoopAuditSink);

        assert_eq!(resolver.resolve("pecan").unwrap(), "http://cdn/pecan.png");
        assert_eq!(resolver.resolve("apple").unwrap(), "http://cdn/apple.png");
    }

    #[test]
    fn unknown_title_is_not_found_without_lookup() {
        let records = records();
        let environment = RegistryEnvironment::new("http://registry/v1", "main", "quicksuggest");
        let registry = TableRegistry::new(&[]);
        let resolver =
            IconResolver::new(&records, &environment, &registry, "http://cdn", &NoopAuditSink);

        let err = resolver.resolve("banana").unwrap_err();
        assert!(matches!(err, ResolveError::TitleNotFound { ref title } if title == "banana"));
        assert!(registry.lookups.lock().unwrap().is_empty());
    }

    #[test]
    fn lookup_failure_carries_record_and_environment() {
        let records = records();
        let environment = RegistryEnvironment::new("http://registry/v1", "main", "quicksuggest");
        let registry = TableRegistry::new(&[]);
        let resolver =
            IconResolver::new(&records, &environment, &registry, "http://cdn", &NoopAuditSink);

        let err = resolver.resolve("apple").unwrap_err();
        let message = err.to_string();
        assert!(message.contains("icon-1001"), "{message}");
        assert!(message.contains("quicksuggest"), "{message}");
        assert!(matches!(
            err,
            ResolveError::Lookup { source: RegistryError::NotFound { .. }, .. }
        ));
    }

    #[test]
    fn join_location_avoids_double_slashes() {
        assert_eq!(join_location("http://cdn/", "/a/b.png"), "http://cdn/a/b.png");
        assert_eq!(join_location("http://cdn", "a/b.png"), "http://cdn/a/b.png");
    }
}
