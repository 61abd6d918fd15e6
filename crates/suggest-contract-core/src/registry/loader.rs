// crates/suggest-contract-core/src/registry/loader.rs
// ============================================================================
// Module: Registry Data Loader
// Description: Discovers and parses locally staged registry data files.
// Purpose: Build the session's read-only record set.
// Dependencies: serde_json, thiserror
// ============================================================================

//! ## Overview
//! Every `*.json` file directly inside the data directory becomes one
//! [`RequestRecord`]. Attachment bytes are the file bytes, never
//! re-serialized, so published hashes match what was authored.
//! Invariants:
//! - An empty or unreadable directory is fatal; no vacuous runs.
//! - Suggestion titles are unique across the loaded set.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::path::PathBuf;

use thiserror::Error;

use super::model::ATTACHMENT_MIMETYPE;
use super::model::RegistryRecords;
use super::model::RequestAttachment;
use super::model::RequestRecord;
use super::model::Suggestion;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// File extension identifying registry data files.
pub const DATA_FILE_EXTENSION: &str = "json";

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Errors raised while loading registry data files.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Error)]
pub enum LoadError {
    /// The data directory yielded no data files.
    #[error("no registry data files found in {}: {reason}", dir.display())]
    MissingData {
        /// Data directory that was scanned.
        dir: PathBuf,
        /// Why nothing was found.
        reason: String,
    },
    /// A data file could not be read.
    #[error("failed to read registry data file {}: {reason}", path.display())]
    Io {
        /// Offending file.
        path: PathBuf,
        /// I/O failure detail.
        reason: String,
    },
    /// A data file is not a JSON array of suggestions.
    #[error("invalid registry data file {}: {reason}", path.display())]
    Parse {
        /// Offending file.
        path: PathBuf,
        /// Parse failure detail.
        reason: String,
    },
    /// A data file name is not valid UTF-8.
    #[error("registry data file name is not valid UTF-8: {}", path.display())]
    InvalidFileName {
        /// Offending file.
        path: PathBuf,
    },
    /// Two suggestions share a title.
    #[error("suggestion title '{title}' appears in both {first} and {second}")]
    DuplicateTitle {
        /// Duplicated title.
        title: String,
        /// Data file where the title was first seen.
        first: String,
        /// Data file repeating the title.
        second: String,
    },
}

// ============================================================================
// SECTION: Loader
// ============================================================================

/// Loads every registry data file found directly inside `dir`.
///
/// # Errors
///
/// Returns [`LoadError::MissingData`] when the directory is unreadable or
/// holds no data files, and other [`LoadError`] variants when a file cannot
/// be read, parsed, or repeats a suggestion title.
pub fn load_records(dir: &Path) -> Result<RegistryRecords, LoadError> {
    let files = discover_data_files(dir)?;
    if files.is_empty() {
        return Err(LoadError::MissingData {
            dir: dir.to_path_buf(),
            reason: format!("no *.{DATA_FILE_EXTENSION} files"),
        });
    }

    let mut records = BTreeMap::new();
    for path in files {
        let (file_name, record) = load_record(&path)?;
        records.insert(file_name, record);
    }
    check_unique_titles(&records)?;
    Ok(RegistryRecords::from_map(records))
}

/// Lists data files directly inside `dir`, sorted by path.
fn discover_data_files(dir: &Path) -> Result<Vec<PathBuf>, LoadError> {
    let missing = |reason: String| LoadError::MissingData {
        dir: dir.to_path_buf(),
        reason,
    };
    let entries = fs::read_dir(dir).map_err(|err| missing(err.to_string()))?;
    let mut files = Vec::new();
    for entry in entries {
        let path = entry.map_err(|err| missing(err.to_string()))?.path();
        let is_data_file =
            path.extension().is_some_and(|extension| extension == DATA_FILE_EXTENSION);
        if is_data_file && path.is_file() {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Reads and parses one data file into its record.
fn load_record(path: &Path) -> Result<(String, RequestRecord), LoadError> {
    let invalid_name = || LoadError::InvalidFileName {
        path: path.to_path_buf(),
    };
    let file_name = path.file_name().and_then(|name| name.to_str()).ok_or_else(invalid_name)?;
    let stem = path.file_stem().and_then(|stem| stem.to_str()).ok_or_else(invalid_name)?;

    let content = fs::read(path).map_err(|err| LoadError::Io {
        path: path.to_path_buf(),
        reason: err.to_string(),
    })?;
    let suggestions: Vec<Suggestion> =
        serde_json::from_slice(&content).map_err(|err| LoadError::Parse {
            path: path.to_path_buf(),
            reason: err.to_string(),
        })?;

    let record = RequestRecord {
        id: stem.to_string(),
        attachment: RequestAttachment {
            filename: file_name.to_string(),
            content,
            mimetype: ATTACHMENT_MIMETYPE,
            suggestions,
        },
    };
    Ok((file_name.to_string(), record))
}

/// Rejects suggestion titles repeated within or across data files.
fn check_unique_titles(records: &BTreeMap<String, RequestRecord>) -> Result<(), LoadError> {
    let mut seen: HashMap<&str, &str> = HashMap::new();
    for (file_name, record) in records {
        for suggestion in &record.attachment.suggestions {
            if let Some(first) = seen.insert(suggestion.title.as_str(), file_name.as_str()) {
                return Err(LoadError::DuplicateTitle {
                    title: suggestion.title.clone(),
                    first: first.to_string(),
                    second: file_name.clone(),
                });
            }
        }
    }
    Ok(())
}
