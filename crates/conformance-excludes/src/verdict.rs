//! Verdict classification: joining exclusion status with raw outcomes.
//!
//! The policy here is deliberately asymmetric. A non-excluded test that fails
//! is a regression and must fail the run; an excluded test that passes only
//! means the exclusion went stale, so it is reported but never blocks the
//! run. Upstream fixing a test must not break our CI.

use serde::{Deserialize, Serialize};

use crate::outcome::{Outcome, OutcomeCollector};
use crate::registry::ExclusionRegistry;

/// Final classification of one test for one run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    /// Not excluded and passed (or executor-level skip)
    Ok,
    /// Excluded and failed, as declared
    ExpectedFailure,
    /// Not excluded and failed: a real regression, fatal to the run
    UnexpectedFailure,
    /// Excluded but passed: the exclusion is stale, advisory only
    UnexpectedPass,
    /// Never observed, or excluded-and-skipped: nothing to confirm either way
    Unknown,
}

/// One classified test: identifier, verdict, and the context a report needs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassifiedTest {
    pub identifier: String,
    pub verdict: Verdict,
    /// Declared exclusion reason, when the test was excluded
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    /// Executor error detail, when one was reported
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

/// The classification state machine.
///
/// Pure function of exclusion status and raw outcome; `None` means the test
/// was never observed this run.
pub fn classify(excluded: bool, outcome: Option<Outcome>) -> Verdict {
    match (excluded, outcome) {
        (false, Some(Outcome::Passed)) => Verdict::Ok,
        (false, Some(Outcome::Skipped)) => Verdict::Ok,
        (false, Some(o)) if o.is_failure() => Verdict::UnexpectedFailure,
        (false, _) => Verdict::Unknown,
        (true, Some(Outcome::Passed)) => Verdict::UnexpectedPass,
        (true, Some(o)) if o.is_failure() => Verdict::ExpectedFailure,
        (true, _) => Verdict::Unknown,
    }
}

/// Classify every test seen by either the registry or the collector.
///
/// The identifier set is the union of enabled exclusions and recorded
/// outcomes, so an excluded test that never ran still shows up (as
/// [`Verdict::Unknown`]). Each identifier is classified exactly once and the
/// result is ordered by identifier; no verdict short-circuits the pass, so a
/// single report shows every failure.
pub fn classify_run(
    registry: &ExclusionRegistry,
    collector: &OutcomeCollector,
) -> Vec<ClassifiedTest> {
    let outcomes = collector.snapshot();

    let mut identifiers: Vec<&str> = outcomes.keys().map(String::as_str).collect();
    for id in registry.excluded_identifiers() {
        if !outcomes.contains_key(id) {
            identifiers.push(id);
        }
    }
    identifiers.sort_unstable();

    identifiers
        .into_iter()
        .map(|id| {
            let excluded = registry.is_excluded(id);
            let recorded = outcomes.get(id);
            ClassifiedTest {
                identifier: id.to_string(),
                verdict: classify(excluded, recorded.map(|r| r.outcome)),
                reason: registry.reason_for(id).map(str::to_string),
                detail: recorded.and_then(|r| r.detail.clone()),
            }
        })
        .collect()
}
