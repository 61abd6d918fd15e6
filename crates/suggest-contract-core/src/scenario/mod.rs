// crates/suggest-contract-core/src/scenario/mod.rs
// ============================================================================
// Module: Scenario Matrix
// Description: Scenario file parsing and test-case matrix expansion.
// Purpose: Turn the declarative scenario file into named, ordered test cases.
// Dependencies: serde, serde_yaml, thiserror
// ============================================================================

//! ## Overview
//! The scenario file holds a top-level `scenarios` list; each entry has a
//! unique `name` and an ordered list of `steps`. The matrix builder turns the
//! list into one [`TestCase`] per scenario, keyed by name, carrying its steps
//! unmodified. Steps stay opaque here; [`step`] types them at execution time.
//! Invariants:
//! - Case ids are unique and non-empty.
//! - Case order and step order follow the scenario file.
//! - The matrix is built once and never extended afterwards.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod step;

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests;

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::HashSet;
use std::fs;
use std::path::Path;
use std::path::PathBuf;

use serde::Deserialize;
use serde_yaml::Value;
use thiserror::Error;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Scenario file and matrix errors.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Error)]
pub enum ScenarioError {
    /// The scenario file could not be read.
    #[error("failed to read scenario file {}: {reason}", path.display())]
    Io {
        /// Scenario file path.
        path: PathBuf,
        /// I/O failure detail.
        reason: String,
    },
    /// The scenario file is not a valid scenario document.
    #[error("invalid scenario file: {0}")]
    Parse(String),
    /// A scenario has a blank name.
    #[error("scenario at position {0} has an empty name")]
    EmptyName(usize),
    /// Two scenarios share a name.
    #[error("duplicate scenario name '{0}'")]
    DuplicateName(String),
    /// A selected case id does not exist.
    #[error("unknown scenario(s) selected: {}", .0.join(", "))]
    UnknownSelection(Vec<String>),
}

// ============================================================================
// SECTION: Scenario Types
// ============================================================================

/// Named, ordered sequence of steps.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Scenario {
    /// Scenario name; the test-case id.
    pub name: String,
    /// Optional human-readable description.
    #[serde(default)]
    pub description: Option<String>,
    /// Ordered steps, interpreted by the executor.
    pub steps: Vec<Value>,
}

/// Top-level scenario document.
#[derive(Debug, Deserialize)]
struct ScenarioFile {
    /// Scenario definitions in file order.
    scenarios: Vec<Scenario>,
}

/// Reads and parses the scenario file.
///
/// # Errors
///
/// Returns [`ScenarioError`] when the file cannot be read or parsed.
pub fn load_scenarios(path: &Path) -> Result<Vec<Scenario>, ScenarioError> {
    let raw = fs::read_to_string(path).map_err(|err| ScenarioError::Io {
        path: path.to_path_buf(),
        reason: err.to_string(),
    })?;
    parse_scenarios(&raw)
}

/// Parses a scenario document.
///
/// # Errors
///
/// Returns [`ScenarioError::Parse`] when the document is malformed.
pub fn parse_scenarios(raw: &str) -> Result<Vec<Scenario>, ScenarioError> {
    let file: ScenarioFile =
        serde_yaml::from_str(raw).map_err(|err| ScenarioError::Parse(err.to_string()))?;
    Ok(file.scenarios)
}

// ============================================================================
// SECTION: Matrix
// ============================================================================

/// One executable test case.
#[derive(Debug, Clone, PartialEq)]
pub struct TestCase {
    /// Case identifier (scenario name).
    id: String,
    /// Steps handed to the test body.
    steps: Vec<Value>,
}

impl TestCase {
    /// Returns the case identifier.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Returns the ordered steps.
    #[must_use]
    pub fn steps(&self) -> &[Value] {
        &self.steps
    }
}

/// Static, ordered test-execution matrix.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScenarioMatrix {
    /// Cases in scenario-file order.
    cases: Vec<TestCase>,
}

impl ScenarioMatrix {
    /// Expands scenarios into test cases.
    ///
    /// # Errors
    ///
    /// Returns [`ScenarioError::EmptyName`] or [`ScenarioError::DuplicateName`]
    /// when case ids would be blank or collide.
    pub fn build(scenarios: Vec<Scenario>) -> Result<Self, ScenarioError> {
        let mut seen = HashSet::with_capacity(scenarios.len());
        let mut cases = Vec::with_capacity(scenarios.len());
        for (index, scenario) in scenarios.into_iter().enumerate() {
            if scenario.name.trim().is_empty() {
                return Err(ScenarioError::EmptyName(index));
            }
            if !seen.insert(scenario.name.clone()) {
                return Err(ScenarioError::DuplicateName(scenario.name));
            }
            cases.push(TestCase {
                id: scenario.name,
                steps: scenario.steps,
            });
        }
        Ok(Self {
            cases,
        })
    }

    /// Loads the scenario file and expands it.
    ///
    /// # Errors
    ///
    /// Returns [`ScenarioError`] when loading or expansion fails.
    pub fn from_file(path: &Path) -> Result<Self, ScenarioError> {
        Self::build(load_scenarios(path)?)
    }

    /// Keeps only the named cases, preserving matrix order.
    ///
    /// An empty selection keeps every case.
    ///
    /// # Errors
    ///
    /// Returns [`ScenarioError::UnknownSelection`] when a name matches no case.
    pub fn select(self, names: &[String]) -> Result<Self, ScenarioError> {
        if names.is_empty() {
            return Ok(self);
        }
        let unknown: Vec<String> = names
            .iter()
            .filter(|name| !self.cases.iter().any(|case| &case.id == *name))
            .cloned()
            .collect();
        if !unknown.is_empty() {
            return Err(ScenarioError::UnknownSelection(unknown));
        }
        let cases = self.cases.into_iter().filter(|case| names.contains(&case.id)).collect();
        Ok(Self {
            cases,
        })
    }

    /// Returns the cases in order.
    #[must_use]
    pub fn cases(&self) -> &[TestCase] {
        &self.cases
    }

    /// Returns the case ids in order.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.cases.iter().map(TestCase::id)
    }

    /// Returns the number of cases.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cases.len()
    }

    /// Returns true when the matrix has no cases.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cases.is_empty()
    }
}
