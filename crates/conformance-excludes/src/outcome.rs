//! Raw per-test outcomes as reported by the external executor.
//!
//! The collector is the one shared-mutable piece of the engine: executor
//! workers may record from many threads, so the map sits behind a single
//! mutex. Each key is written at most once, which makes the coarse lock
//! sufficient.

use std::collections::BTreeMap;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{ExcludesError, ExcludesResult};

/// Raw result of one executed test
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// All assertions held
    Passed,
    /// An assertion failed
    Failed,
    /// The test crashed or raised outside an assertion
    Errored,
    /// The executor chose not to run the test
    Skipped,
}

impl Outcome {
    /// `failed` and `errored` are distinct kinds but identical to the classifier
    pub fn is_failure(self) -> bool {
        matches!(self, Outcome::Failed | Outcome::Errored)
    }
}

/// What was recorded for one test: its outcome plus the executor's error
/// detail, if it reported one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedOutcome {
    pub outcome: Outcome,
    pub detail: Option<String>,
}

/// Collects one outcome per test identifier for a single run.
///
/// `record` is thread-safe; lookups take a snapshot under the same lock.
#[derive(Debug, Default)]
pub struct OutcomeCollector {
    results: Mutex<BTreeMap<String, RecordedOutcome>>,
}

impl OutcomeCollector {
    /// Create an empty collector
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the outcome of one test.
    ///
    /// A second record for the same identifier is a bug in the executor (a
    /// test ran twice in one run); it is rejected with
    /// [`ExcludesError::DuplicateOutcome`] and the first record wins.
    pub fn record(&self, identifier: impl Into<String>, outcome: Outcome) -> ExcludesResult<()> {
        self.record_with_detail(identifier, outcome, None)
    }

    /// Record an outcome together with the executor's error message
    pub fn record_with_detail(
        &self,
        identifier: impl Into<String>,
        outcome: Outcome,
        detail: Option<String>,
    ) -> ExcludesResult<()> {
        let identifier = identifier.into();
        let mut results = self.results.lock();
        if let Some(existing) = results.get(&identifier) {
            warn!(
                identifier = %identifier,
                first = ?existing.outcome,
                second = ?outcome,
                "test reported more than one outcome; keeping the first"
            );
            return Err(ExcludesError::DuplicateOutcome {
                identifier,
                first: existing.outcome,
                second: outcome,
            });
        }
        results.insert(identifier, RecordedOutcome { outcome, detail });
        Ok(())
    }

    /// The recorded outcome, or `None` if the test was never observed
    pub fn outcome_for(&self, identifier: &str) -> Option<Outcome> {
        self.results.lock().get(identifier).map(|r| r.outcome)
    }

    /// Number of recorded outcomes
    pub fn len(&self) -> usize {
        self.results.lock().len()
    }

    /// Whether nothing has been recorded
    pub fn is_empty(&self) -> bool {
        self.results.lock().is_empty()
    }

    /// Copy of the recorded results, in identifier order.
    ///
    /// Classification works from this snapshot so it never holds the lock
    /// while walking the registry.
    pub fn snapshot(&self) -> BTreeMap<String, RecordedOutcome> {
        self.results.lock().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn records_and_looks_up_outcomes() {
        let collector = OutcomeCollector::new();
        collector.record("T::a", Outcome::Passed).unwrap();
        collector
            .record_with_detail("T::b", Outcome::Failed, Some("assertion failed".into()))
            .unwrap();

        assert_eq!(collector.outcome_for("T::a"), Some(Outcome::Passed));
        assert_eq!(collector.outcome_for("T::b"), Some(Outcome::Failed));
        assert_eq!(collector.outcome_for("T::never_ran"), None);
        assert_eq!(collector.len(), 2);

        let snapshot = collector.snapshot();
        assert_eq!(
            snapshot["T::b"].detail.as_deref(),
            Some("assertion failed")
        );
    }

    #[test]
    fn second_record_is_rejected_and_first_wins() {
        let collector = OutcomeCollector::new();
        collector.record("T::a", Outcome::Passed).unwrap();

        let err = collector.record("T::a", Outcome::Failed).unwrap_err();
        assert!(matches!(
            err,
            ExcludesError::DuplicateOutcome {
                first: Outcome::Passed,
                second: Outcome::Failed,
                ..
            }
        ));
        assert_eq!(collector.outcome_for("T::a"), Some(Outcome::Passed));
        assert_eq!(collector.len(), 1);
    }

    #[test]
    fn concurrent_recording_from_worker_threads() {
        let collector = Arc::new(OutcomeCollector::new());
        let mut handles = Vec::new();

        for worker in 0..8 {
            let collector = Arc::clone(&collector);
            handles.push(std::thread::spawn(move || {
                for i in 0..50 {
                    let id = format!("T::test_{worker}_{i}");
                    collector.record(id, Outcome::Passed).unwrap();
                }
            }));
        }
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(collector.len(), 8 * 50);
        assert_eq!(collector.outcome_for("T::test_3_42"), Some(Outcome::Passed));
    }

    #[test]
    fn outcome_serde_uses_snake_case() {
        assert_eq!(serde_json::to_string(&Outcome::Passed).unwrap(), "\"passed\"");
        let outcome: Outcome = serde_json::from_str("\"errored\"").unwrap();
        assert_eq!(outcome, Outcome::Errored);
        assert!(outcome.is_failure());
        assert!(!Outcome::Skipped.is_failure());
    }
}
