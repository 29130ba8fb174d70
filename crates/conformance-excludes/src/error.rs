//! Error types for the excludes engine.
//!
//! Load-time structural errors (duplicate declarations, unreadable manifests)
//! are fatal and abort before any classification. `DuplicateOutcome` is fatal
//! only to the offending record; the run itself continues.

use std::path::PathBuf;

use thiserror::Error;

use crate::outcome::Outcome;

/// Errors that can occur while building a registry or recording outcomes
#[derive(Error, Debug)]
pub enum ExcludesError {
    /// Two enabled exclusions claim the same test — ambiguous authorship
    #[error("duplicate exclusion for '{identifier}' (existing reason: \"{existing}\", conflicting reason: \"{incoming}\")")]
    DuplicateExclusion {
        identifier: String,
        existing: String,
        incoming: String,
    },

    /// An exclusion was declared without a documented reason
    #[error("exclusion for '{identifier}' has no reason")]
    MissingReason { identifier: String },

    /// A test reported a result twice within one run; the first wins
    #[error("duplicate outcome for '{identifier}': kept {first:?}, rejected {second:?}")]
    DuplicateOutcome {
        identifier: String,
        first: Outcome,
        second: Outcome,
    },

    /// Manifest file could not be read
    #[error("failed to read manifest '{path}': {source}")]
    ManifestIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Manifest file is not valid TOML
    #[error("failed to parse manifest '{path}': {source}")]
    ManifestParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Result type alias for excludes operations
pub type ExcludesResult<T> = Result<T, ExcludesError>;
