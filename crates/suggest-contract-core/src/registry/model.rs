// crates/suggest-contract-core/src/registry/model.rs
// ============================================================================
// Module: Registry Model
// Description: Typed registry records, attachments, and suggestions.
// Purpose: Represent local fixture data and the registry's published view.
// Dependencies: serde, serde_json
// ============================================================================

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use serde::Deserialize;
use serde::Deserializer;
use serde::Serialize;
use serde::de::Error as _;
use serde_json::Map;
use serde_json::Value;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// MIME type of every uploaded suggestion attachment.
pub const ATTACHMENT_MIMETYPE: &str = "application/json";

/// Prefix joined with a suggestion's icon id to form the icon record id.
pub const ICON_RECORD_PREFIX: &str = "icon-";

// ============================================================================
// SECTION: Suggestions
// ============================================================================

/// One suggestion as authored in a registry data file.
///
/// Fields other than `title` and `icon` are kept as opaque payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Suggestion {
    /// Suggestion title; the correlation key for icon lookup.
    pub title: String,
    /// Icon identifier, normalized to its decimal string form.
    #[serde(deserialize_with = "deserialize_icon_id")]
    pub icon: String,
    /// Remaining fields, preserved but not interpreted.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Suggestion {
    /// Returns the registry record id holding this suggestion's icon.
    #[must_use]
    pub fn icon_record_id(&self) -> String {
        format!("{ICON_RECORD_PREFIX}{}", self.icon)
    }
}

/// Accepts icon ids authored either as strings or as integers.
fn deserialize_icon_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(id) => Ok(id),
        Value::Number(id) if id.is_u64() || id.is_i64() => Ok(id.to_string()),
        other => Err(D::Error::custom(format!("icon must be a string or integer, got {other}"))),
    }
}

// ============================================================================
// SECTION: Request Records
// ============================================================================

/// Attachment uploaded on behalf of one data file.
///
/// # Invariants
/// - `filename` equals the data file's base name.
/// - `content` is byte-identical to the data file.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestAttachment {
    /// Attachment filename.
    pub filename: String,
    /// Raw attachment bytes.
    pub content: Vec<u8>,
    /// Attachment MIME type.
    pub mimetype: &'static str,
    /// Suggestions parsed from `content`, in file order.
    pub suggestions: Vec<Suggestion>,
}

/// Record pushed to, or matched against, the registry.
///
/// # Invariants
/// - `id` is the data file's stem.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestRecord {
    /// Record identifier.
    pub id: String,
    /// Owned attachment.
    pub attachment: RequestAttachment,
}

/// Loaded request records keyed by data-file name.
///
/// # Invariants
/// - Iteration follows data-file name order.
/// - Suggestion titles are unique across all records.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RegistryRecords {
    /// Records keyed by data-file name.
    records: BTreeMap<String, RequestRecord>,
}

impl RegistryRecords {
    /// Wraps an already validated record map.
    pub(crate) const fn from_map(records: BTreeMap<String, RequestRecord>) -> Self {
        Self {
            records,
        }
    }

    /// Returns the record loaded from the named data file.
    #[must_use]
    pub fn get(&self, file_name: &str) -> Option<&RequestRecord> {
        self.records.get(file_name)
    }

    /// Returns the number of loaded records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns true when no records are loaded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Iterates over `(data-file name, record)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &RequestRecord)> {
        self.records.iter().map(|(name, record)| (name.as_str(), record))
    }

    /// Returns the first suggestion with the given title, in enumeration order.
    #[must_use]
    pub fn find_suggestion(&self, title: &str) -> Option<&Suggestion> {
        self.records
            .values()
            .flat_map(|record| record.attachment.suggestions.iter())
            .find(|suggestion| suggestion.title == title)
    }
}

// ============================================================================
// SECTION: Response Records
// ============================================================================

/// Registry's published view of a record.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ResponseRecord {
    /// Record identifier.
    pub id: String,
    /// Published attachment descriptor.
    pub attachment: ResponseAttachment,
}

/// Published attachment descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ResponseAttachment {
    /// Server-assigned location, relative to the attachments base URL.
    pub location: String,
    /// Published filename.
    #[serde(default)]
    pub filename: Option<String>,
    /// Published MIME type.
    #[serde(default)]
    pub mimetype: Option<String>,
    /// Content hash reported by the registry.
    #[serde(default)]
    pub hash: Option<String>,
    /// Attachment size in bytes.
    #[serde(default)]
    pub size: Option<u64>,
}
