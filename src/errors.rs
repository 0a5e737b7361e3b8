/*!
 * Error types for the modlang application.
 *
 * This module contains custom error types for the different phases of a run,
 * using the thiserror crate for ergonomic error definitions. Per-item failures
 * (a corrupt archive, a single bad key, a failed API batch) are logged and
 * skipped by the components themselves; only whole-phase failures surface as
 * one of these errors.
 */

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur when working with provider APIs
#[derive(Error, Debug)]
pub enum ProviderError {
    /// Error when making an API request fails
    #[error("API request failed: {0}")]
    RequestFailed(String),

    /// Error when parsing an API response fails
    #[error("Failed to parse API response: {0}")]
    ParseError(String),

    /// Error returned by the API itself
    #[error("API responded with error: {status_code} - {message}")]
    ApiError {
        /// HTTP status code
        status_code: u16,
        /// Error message from the API
        message: String,
    },

    /// Error establishing or maintaining a connection
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// Error related to rate limiting
    #[error("Rate limit exceeded: {0}")]
    RateLimitExceeded(String),

    /// Error with authentication or account verification
    #[error("Authentication error: {0}")]
    AuthenticationError(String),
}

/// Configuration problems detected before any work starts
#[derive(Error, Debug)]
pub enum ConfigError {
    /// A required path does not exist
    #[error("{what} does not exist: {path:?}")]
    MissingPath {
        /// Human readable name of the setting
        what: &'static str,
        /// The offending path
        path: PathBuf,
    },

    /// A setting has an unusable value
    #[error("Invalid setting '{setting}': {reason}")]
    InvalidSetting {
        /// Setting name
        setting: &'static str,
        /// Why it was rejected
        reason: String,
    },
}

/// Errors raised while scanning archives and aggregating language data
#[derive(Error, Debug)]
pub enum ExtractionError {
    /// An archive could not be opened or read
    #[error("Failed to read archive {path:?}: {reason}")]
    Archive {
        /// Archive path
        path: PathBuf,
        /// Underlying failure
        reason: String,
    },

    /// No language namespaces were found in any input archive
    #[error("No language files were found in {0} archive(s)")]
    NoNamespaces(usize),
}

/// Errors raised by the dictionary providers
#[derive(Error, Debug)]
pub enum DictionaryError {
    /// Personal dictionary file could not be read or written
    #[error("Dictionary file error for {path:?}: {source}")]
    Io {
        /// Dictionary file path
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Personal dictionary file is not valid JSON
    #[error("Dictionary file {path:?} is malformed: {source}")]
    Format {
        /// Dictionary file path
        path: PathBuf,
        /// Underlying JSON error
        #[source]
        source: serde_json::Error,
    },

    /// Community dictionary store error
    #[error("Community dictionary error: {0}")]
    Store(#[from] rusqlite::Error),
}

/// Errors raised while writing the output pack
#[derive(Error, Debug)]
pub enum BuildError {
    /// Filesystem failure while staging or finalizing output
    #[error("I/O error while building pack: {0}")]
    Io(#[from] std::io::Error),

    /// Archive writer failure
    #[error("Archive error while building pack: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// Manifest serialization failure
    #[error("Failed to serialize pack manifest: {0}")]
    Manifest(#[from] serde_json::Error),

    /// Two language files map to the same path inside the pack
    #[error("Two language files map to pack entry {0}")]
    DuplicateEntry(String),

    /// Temporary output could not be moved into place
    #[error("Failed to move staged output to {path:?}: {reason}")]
    Finalize {
        /// Destination path
        path: PathBuf,
        /// Underlying failure
        reason: String,
    },
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Invalid configuration
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Extraction phase failure
    #[error("Extraction error: {0}")]
    Extraction(#[from] ExtractionError),

    /// Dictionary loading failure
    #[error("Dictionary error: {0}")]
    Dictionary(#[from] DictionaryError),

    /// Error from a provider
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// Output build failure
    #[error("Build error: {0}")]
    Build(#[from] BuildError),

    /// Any other error
    #[error("Unknown error: {0}")]
    Unknown(String),
}

impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::Unknown(error.to_string())
    }
}
