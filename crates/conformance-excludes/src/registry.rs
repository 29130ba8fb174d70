//! Exclusion registry: which tests are known not to pass, and why.
//!
//! The registry is built once at load time, before any test executes, and is
//! read-only afterwards. Declarations may come from several manifest files;
//! merging two sources that both claim the same test (both enabled) is an
//! ambiguity the maintainer must resolve, so it fails the load rather than
//! silently picking a winner.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{ExcludesError, ExcludesResult};

/// One declared exclusion: a test known not to pass, with a documented reason.
///
/// A disabled entry is "known but inactive": it does not affect
/// classification but stays discoverable for audit, which distinguishes
/// "we decided this no longer applies" from "never declared".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExclusionEntry {
    /// Suite-qualified test identifier, e.g. `"TestProcess::test_argv0"`
    pub identifier: String,
    /// Why the test cannot pass; documentation only, never matched on
    pub reason: String,
    /// Whether the exclusion currently applies
    pub enabled: bool,
}

impl ExclusionEntry {
    /// Create an enabled entry
    pub fn new(identifier: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            reason: reason.into(),
            enabled: true,
        }
    }

    /// Create a disabled entry (kept for audit, ignored by classification)
    pub fn disabled(identifier: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            enabled: false,
            ..Self::new(identifier, reason)
        }
    }
}

/// Mapping from test identifier to its declared exclusion.
///
/// Keys are unique: no two enabled entries may share an identifier, across
/// any number of merged sources.
#[derive(Debug, Clone, Default)]
pub struct ExclusionRegistry {
    entries: BTreeMap<String, ExclusionEntry>,
}

impl ExclusionRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry from already-parsed declarations.
    ///
    /// Fails fast on the first duplicate enabled declaration.
    pub fn from_declarations<I>(declarations: I) -> ExcludesResult<Self>
    where
        I: IntoIterator<Item = ExclusionEntry>,
    {
        let mut registry = Self::new();
        for entry in declarations {
            registry.register_entry(entry)?;
        }
        Ok(registry)
    }

    /// Declare a test as excluded.
    ///
    /// Errors with [`ExcludesError::DuplicateExclusion`] when an enabled
    /// entry already exists for `identifier` and the new one is enabled too.
    /// Collisions involving a disabled entry are logged no-ops: the first
    /// declaration wins and the load continues, since manifests are additive
    /// and may be merged from several sources.
    pub fn register(
        &mut self,
        identifier: impl Into<String>,
        reason: impl Into<String>,
        enabled: bool,
    ) -> ExcludesResult<()> {
        self.register_entry(ExclusionEntry {
            identifier: identifier.into(),
            reason: reason.into(),
            enabled,
        })
    }

    /// Declare a test as excluded, from an already-built entry.
    pub fn register_entry(&mut self, entry: ExclusionEntry) -> ExcludesResult<()> {
        if entry.reason.trim().is_empty() {
            return Err(ExcludesError::MissingReason {
                identifier: entry.identifier,
            });
        }

        if let Some(existing) = self.entries.get(&entry.identifier) {
            if existing.enabled && entry.enabled {
                return Err(ExcludesError::DuplicateExclusion {
                    identifier: entry.identifier,
                    existing: existing.reason.clone(),
                    incoming: entry.reason,
                });
            }
            warn!(
                identifier = %entry.identifier,
                kept = %existing.reason,
                dropped = %entry.reason,
                "ignoring re-declared exclusion"
            );
            return Ok(());
        }

        self.entries.insert(entry.identifier.clone(), entry);
        Ok(())
    }

    /// Whether an enabled exclusion exists for `identifier`
    pub fn is_excluded(&self, identifier: &str) -> bool {
        self.entries
            .get(identifier)
            .map(|e| e.enabled)
            .unwrap_or(false)
    }

    /// The declared reason, or `None` if the test is not (actively) excluded
    pub fn reason_for(&self, identifier: &str) -> Option<&str> {
        self.entries
            .get(identifier)
            .filter(|e| e.enabled)
            .map(|e| e.reason.as_str())
    }

    /// The entry for `identifier`, enabled or not
    pub fn entry(&self, identifier: &str) -> Option<&ExclusionEntry> {
        self.entries.get(identifier)
    }

    /// Union another registry into this one.
    ///
    /// Two enabled entries for the same identifier from different sources are
    /// a hard error regardless of merge order.
    pub fn merge(&mut self, other: ExclusionRegistry) -> ExcludesResult<()> {
        for (_, entry) in other.entries {
            self.register_entry(entry)?;
        }
        Ok(())
    }

    /// All entries, enabled and disabled, in identifier order
    pub fn entries(&self) -> impl Iterator<Item = &ExclusionEntry> {
        self.entries.values()
    }

    /// Identifiers of all enabled exclusions, in order
    pub fn excluded_identifiers(&self) -> impl Iterator<Item = &str> {
        self.entries
            .values()
            .filter(|e| e.enabled)
            .map(|e| e.identifier.as_str())
    }

    /// Disabled entries, for audit reporting
    pub fn disabled_entries(&self) -> impl Iterator<Item = &ExclusionEntry> {
        self.entries.values().filter(|e| !e.enabled)
    }

    /// Number of entries, enabled and disabled
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the registry holds no entries at all
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
