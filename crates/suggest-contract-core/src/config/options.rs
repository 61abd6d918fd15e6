// crates/suggest-contract-core/src/config/options.rs
// ============================================================================
// Module: Run Options
// Description: Flag and environment backed run options with strict validation.
// Purpose: Fail fast on missing or malformed configuration.
// Dependencies: thiserror, url
// ============================================================================

//! ## Overview
//! Environment values are read with strict UTF-8 enforcement. Empty or
//! whitespace-only values count as unset. All missing required options are
//! reported together, in declaration order.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;
use url::Url;

use crate::environment::RegistryEnvironment;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default timeout applied to every outbound HTTP request.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

// ============================================================================
// SECTION: Option Keys
// ============================================================================

/// Options that must be set before a run can start.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequiredOption {
    /// Path to the scenario file.
    ScenariosFile,
    /// Base URL of the suggestion service under test.
    ServiceUrl,
    /// Registry API root URL.
    RegistryUrl,
    /// Registry bucket identifier.
    RegistryBucket,
    /// Registry collection identifier.
    RegistryCollection,
    /// Local directory holding registry data files.
    RegistryDataDir,
    /// Base URL under which registry attachments are published.
    RegistryAttachmentsUrl,
}

impl RequiredOption {
    /// All required options in declaration order.
    pub const ALL: [Self; 7] = [
        Self::ScenariosFile,
        Self::ServiceUrl,
        Self::RegistryUrl,
        Self::RegistryBucket,
        Self::RegistryCollection,
        Self::RegistryDataDir,
        Self::RegistryAttachmentsUrl,
    ];

    /// Returns the canonical option name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ScenariosFile => "scenarios_file",
            Self::ServiceUrl => "service_url",
            Self::RegistryUrl => "registry_url",
            Self::RegistryBucket => "registry_bucket",
            Self::RegistryCollection => "registry_collection",
            Self::RegistryDataDir => "registry_data_dir",
            Self::RegistryAttachmentsUrl => "registry_attachments_url",
        }
    }

    /// Returns the environment variable consulted when the flag is absent.
    #[must_use]
    pub const fn env_var(self) -> &'static str {
        match self {
            Self::ScenariosFile => "SCENARIOS_FILE",
            Self::ServiceUrl => "SERVICE_URL",
            Self::RegistryUrl => "REGISTRY_URL",
            Self::RegistryBucket => "REGISTRY_BUCKET",
            Self::RegistryCollection => "REGISTRY_COLLECTION",
            Self::RegistryDataDir => "REGISTRY_DATA_DIR",
            Self::RegistryAttachmentsUrl => "REGISTRY_ATTACHMENTS_URL",
        }
    }

    /// Returns the command-line flag for the option.
    #[must_use]
    pub const fn flag(self) -> &'static str {
        match self {
            Self::ScenariosFile => "--scenarios-file",
            Self::ServiceUrl => "--service-url",
            Self::RegistryUrl => "--registry-url",
            Self::RegistryBucket => "--registry-bucket",
            Self::RegistryCollection => "--registry-collection",
            Self::RegistryDataDir => "--registry-data-dir",
            Self::RegistryAttachmentsUrl => "--registry-attachments-url",
        }
    }

    /// Returns true when the option holds a URL.
    const fn is_url(self) -> bool {
        matches!(self, Self::ServiceUrl | Self::RegistryUrl | Self::RegistryAttachmentsUrl)
    }
}

impl std::fmt::Display for RequiredOption {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "'{}' ({} or {})", self.as_str(), self.flag(), self.env_var())
    }
}

/// Environment keys for optional run settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionalEnv {
    /// Request timeout override in seconds (positive integer).
    RequestTimeout,
    /// Audit log file path.
    AuditLog,
}

impl OptionalEnv {
    /// Returns the canonical environment variable name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::RequestTimeout => "CONTRACT_REQUEST_TIMEOUT_SEC",
            Self::AuditLog => "CONTRACT_AUDIT_LOG",
        }
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Configuration errors raised before any test case is collected.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// One or more required options are unset.
    #[error("required option not set: {}", join_missing(.0))]
    Missing(Vec<RequiredOption>),
    /// An environment value is not valid UTF-8.
    #[error("{0} must be valid UTF-8")]
    InvalidUtf8(String),
    /// A URL-valued option does not hold an absolute http(s) URL.
    #[error("option '{option}' must be an absolute http(s) URL: {reason}")]
    InvalidUrl {
        /// Option name.
        option: &'static str,
        /// Parse failure detail.
        reason: String,
    },
    /// A timeout value is not a positive integer.
    #[error("{0} must be a positive integer number of seconds")]
    InvalidTimeout(String),
}

/// Formats missing options for the usage error.
fn join_missing(missing: &[RequiredOption]) -> String {
    missing.iter().map(ToString::to_string).collect::<Vec<_>>().join(", ")
}

// ============================================================================
// SECTION: Raw Options
// ============================================================================

/// Run options as supplied on the command line; `None` means the flag was absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunOptions {
    /// Scenario file path.
    pub scenarios_file: Option<String>,
    /// Service-under-test base URL.
    pub service_url: Option<String>,
    /// Registry API root URL.
    pub registry_url: Option<String>,
    /// Registry bucket.
    pub registry_bucket: Option<String>,
    /// Registry collection.
    pub registry_collection: Option<String>,
    /// Local registry data directory.
    pub registry_data_dir: Option<String>,
    /// Registry attachments base URL.
    pub registry_attachments_url: Option<String>,
    /// Request timeout in seconds.
    pub request_timeout_secs: Option<String>,
    /// Audit log file path.
    pub audit_log: Option<String>,
}

impl RunOptions {
    /// Returns the flag value supplied for a required option.
    fn flag_value(&self, option: RequiredOption) -> Option<&str> {
        let value = match option {
            RequiredOption::ScenariosFile => &self.scenarios_file,
            RequiredOption::ServiceUrl => &self.service_url,
            RequiredOption::RegistryUrl => &self.registry_url,
            RequiredOption::RegistryBucket => &self.registry_bucket,
            RequiredOption::RegistryCollection => &self.registry_collection,
            RequiredOption::RegistryDataDir => &self.registry_data_dir,
            RequiredOption::RegistryAttachmentsUrl => &self.registry_attachments_url,
        };
        value.as_deref()
    }

    /// Validates options against the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when a required option is missing or any value
    /// fails validation.
    pub fn validate(&self) -> Result<ValidatedOptions, ConfigError> {
        self.validate_with(read_env_strict)
    }

    /// Validates options using the provided environment lookup.
    ///
    /// Flags take precedence over environment values. Blank values on either
    /// side count as unset.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when a required option is missing or any value
    /// fails validation.
    pub fn validate_with<F>(&self, lookup: F) -> Result<ValidatedOptions, ConfigError>
    where
        F: Fn(&str) -> Result<Option<String>, ConfigError>,
    {
        let mut resolved = Vec::with_capacity(RequiredOption::ALL.len());
        let mut missing = Vec::new();
        for option in RequiredOption::ALL {
            match resolve_value(self.flag_value(option), option.env_var(), &lookup)? {
                Some(value) => resolved.push((option, value)),
                None => missing.push(option),
            }
        }
        if !missing.is_empty() {
            return Err(ConfigError::Missing(missing));
        }
        for (option, value) in &resolved {
            if option.is_url() {
                validate_url(*option, value)?;
            }
        }

        let timeout_env = OptionalEnv::RequestTimeout.as_str();
        let request_timeout =
            match resolve_value(self.request_timeout_secs.as_deref(), timeout_env, &lookup)? {
                Some(raw) => parse_timeout_seconds(timeout_env, &raw)?,
                None => DEFAULT_REQUEST_TIMEOUT,
            };
        let audit_log =
            resolve_value(self.audit_log.as_deref(), OptionalEnv::AuditLog.as_str(), &lookup)?
                .map(PathBuf::from);

        let take = |option: RequiredOption| {
            resolved
                .iter()
                .find(|(candidate, _)| *candidate == option)
                .map(|(_, value)| value.clone())
                .unwrap_or_default()
        };
        Ok(ValidatedOptions {
            scenarios_file: PathBuf::from(take(RequiredOption::ScenariosFile)),
            service_url: take(RequiredOption::ServiceUrl),
            registry_url: take(RequiredOption::RegistryUrl),
            registry_bucket: take(RequiredOption::RegistryBucket),
            registry_collection: take(RequiredOption::RegistryCollection),
            registry_data_dir: PathBuf::from(take(RequiredOption::RegistryDataDir)),
            registry_attachments_url: take(RequiredOption::RegistryAttachmentsUrl),
            request_timeout,
            audit_log,
        })
    }
}

// ============================================================================
// SECTION: Validated Options
// ============================================================================

/// Fully populated run options.
///
/// # Invariants
/// - Every required option holds a non-blank value.
/// - URL-valued options parse as absolute http(s) URLs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedOptions {
    /// Scenario file path.
    pub scenarios_file: PathBuf,
    /// Service-under-test base URL.
    pub service_url: String,
    /// Registry API root URL.
    pub registry_url: String,
    /// Registry bucket.
    pub registry_bucket: String,
    /// Registry collection.
    pub registry_collection: String,
    /// Local registry data directory.
    pub registry_data_dir: PathBuf,
    /// Registry attachments base URL.
    pub registry_attachments_url: String,
    /// Timeout applied to outbound HTTP requests.
    pub request_timeout: Duration,
    /// Optional audit log path; stderr when unset.
    pub audit_log: Option<PathBuf>,
}

impl ValidatedOptions {
    /// Builds the registry environment from the validated coordinates.
    #[must_use]
    pub fn environment(&self) -> RegistryEnvironment {
        RegistryEnvironment::new(
            self.registry_url.clone(),
            self.registry_bucket.clone(),
            self.registry_collection.clone(),
        )
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Reads an environment variable and enforces UTF-8 validity.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidUtf8`] when the variable contains invalid UTF-8.
pub fn read_env_strict(name: &str) -> Result<Option<String>, ConfigError> {
    std::env::var_os(name).map_or(Ok(None), |raw| {
        raw.into_string().map(Some).map_err(|_| ConfigError::InvalidUtf8(name.to_string()))
    })
}

/// Resolves a value from its flag first, then its environment variable.
fn resolve_value<F>(
    flag: Option<&str>,
    env_name: &str,
    lookup: &F,
) -> Result<Option<String>, ConfigError>
where
    F: Fn(&str) -> Result<Option<String>, ConfigError>,
{
    if let Some(value) = flag.and_then(non_blank) {
        return Ok(Some(value));
    }
    Ok(lookup(env_name)?.as_deref().and_then(non_blank))
}

/// Returns the trimmed value unless it is blank.
fn non_blank(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() { None } else { Some(trimmed.to_string()) }
}

/// Checks that a URL option is an absolute http(s) URL.
fn validate_url(option: RequiredOption, raw: &str) -> Result<(), ConfigError> {
    let url = Url::parse(raw).map_err(|err| ConfigError::InvalidUrl {
        option: option.as_str(),
        reason: err.to_string(),
    })?;
    match url.scheme() {
        "http" | "https" => Ok(()),
        scheme => Err(ConfigError::InvalidUrl {
            option: option.as_str(),
            reason: format!("unsupported scheme {scheme}"),
        }),
    }
}

/// Parses a positive timeout value in whole seconds.
fn parse_timeout_seconds(name: &str, raw: &str) -> Result<Duration, ConfigError> {
    let secs: u64 =
        raw.trim().parse().map_err(|_| ConfigError::InvalidTimeout(name.to_string()))?;
    if secs == 0 {
        return Err(ConfigError::InvalidTimeout(name.to_string()));
    }
    Ok(Duration::from_secs(secs))
}
