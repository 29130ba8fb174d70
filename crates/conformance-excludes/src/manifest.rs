//! TOML exclusion manifests.
//!
//! One manifest per upstream suite. Entries are data, not executable
//! toggles: retiring an exclusion means flipping `enabled = false` (keeping
//! it auditable) or deleting the entry, and both show up cleanly in a diff.
//!
//! ```toml
//! suite = "TestProcess"
//!
//! [[exclude]]
//! test = "test_argv0_noarg"
//! reason = "hangs"
//!
//! [[exclude]]
//! test = "test_execopts_gid"
//! reason = "throws NotImplementedError rather than passing"
//! enabled = false
//! ```

use std::path::Path;

use serde::Deserialize;

use crate::error::{ExcludesError, ExcludesResult};
use crate::registry::{ExclusionEntry, ExclusionRegistry};

/// Exclusion declarations for one upstream suite
#[derive(Debug, Clone, Deserialize)]
pub struct ExclusionManifest {
    /// Suite name used to qualify test identifiers
    pub suite: String,
    /// Declared exclusions
    #[serde(default, rename = "exclude")]
    pub excludes: Vec<ManifestEntry>,
}

/// One declaration line in a manifest
#[derive(Debug, Clone, Deserialize)]
pub struct ManifestEntry {
    /// Unqualified test name within the suite
    pub test: String,
    /// Why the test cannot pass
    pub reason: String,
    /// Whether the exclusion currently applies (defaults to true)
    #[serde(default = "default_true")]
    pub enabled: bool,
}

fn default_true() -> bool {
    true
}

impl ExclusionManifest {
    /// Load a manifest from a TOML file
    pub fn load(path: &Path) -> ExcludesResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| ExcludesError::ManifestIo {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_str(&content).map_err(|source| match source {
            ExcludesError::ManifestParse { source, .. } => ExcludesError::ManifestParse {
                path: path.to_path_buf(),
                source,
            },
            other => other,
        })
    }

    /// Parse a manifest from TOML text
    pub fn from_str(content: &str) -> ExcludesResult<Self> {
        toml::from_str(content).map_err(|source| ExcludesError::ManifestParse {
            path: "<inline>".into(),
            source,
        })
    }

    /// Qualified identifier for one entry, `"<suite>::<test>"`
    pub fn qualify(&self, test: &str) -> String {
        format!("{}::{}", self.suite, test)
    }

    /// Build a registry from this manifest's declarations
    pub fn into_registry(self) -> ExcludesResult<ExclusionRegistry> {
        let suite = self.suite;
        ExclusionRegistry::from_declarations(self.excludes.into_iter().map(|entry| {
            ExclusionEntry {
                identifier: format!("{}::{}", suite, entry.test),
                reason: entry.reason,
                enabled: entry.enabled,
            }
        }))
    }
}

/// Load several manifest files into one merged registry.
///
/// Conflicting enabled declarations across files fail here, at load time,
/// before any outcome is classified.
pub fn load_registry<P: AsRef<Path>>(paths: &[P]) -> ExcludesResult<ExclusionRegistry> {
    let mut registry = ExclusionRegistry::new();
    for path in paths {
        let manifest = ExclusionManifest::load(path.as_ref())?;
        registry.merge(manifest.into_registry()?)?;
    }
    Ok(registry)
}
