//! Run summary: aggregate verdicts and decide the run's success signal.

use colored::Colorize;
use serde::{Deserialize, Serialize};

use crate::verdict::{ClassifiedTest, Verdict};

/// A non-excluded test that failed: a real regression
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnexpectedFailure {
    /// Test identifier
    pub identifier: String,
    /// Executor error detail, if reported
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// An excluded test that now passes: its exclusion is a candidate for removal
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaleExclusion {
    /// Test identifier
    pub identifier: String,
    /// The now-stale declared reason
    pub reason: String,
}

/// Aggregated result of one suite run.
///
/// The run fails iff at least one unexpected failure exists; stale exclusions
/// and unknown outcomes are reported but never affect the success signal.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    /// Total classified tests
    pub total: usize,
    /// Tests that passed (or were skipped) as expected
    pub ok: usize,
    /// Excluded tests that failed, as declared
    pub expected_failures: usize,
    /// Tests with no confirmable result this run
    pub unknown_count: usize,
    /// Regressions, with executor detail
    pub unexpected_failures: Vec<UnexpectedFailure>,
    /// Exclusions whose tests now pass
    pub stale_exclusions: Vec<StaleExclusion>,
    /// Identifiers with no confirmable result
    pub unknown: Vec<String>,
}

impl RunSummary {
    /// Aggregate classified tests in a single pass.
    ///
    /// Classification is pure, so summarizing the same input twice yields the
    /// same summary; lists come out sorted by identifier.
    pub fn from_classified(classified: &[ClassifiedTest]) -> Self {
        let mut summary = Self {
            total: classified.len(),
            ..Self::default()
        };

        for test in classified {
            match test.verdict {
                Verdict::Ok => summary.ok += 1,
                Verdict::ExpectedFailure => summary.expected_failures += 1,
                Verdict::UnexpectedFailure => summary.unexpected_failures.push(UnexpectedFailure {
                    identifier: test.identifier.clone(),
                    error: test.detail.clone(),
                }),
                Verdict::UnexpectedPass => summary.stale_exclusions.push(StaleExclusion {
                    identifier: test.identifier.clone(),
                    reason: test.reason.clone().unwrap_or_default(),
                }),
                Verdict::Unknown => {
                    summary.unknown_count += 1;
                    summary.unknown.push(test.identifier.clone());
                }
            }
        }

        summary.unexpected_failures.sort_by(|a, b| a.identifier.cmp(&b.identifier));
        summary.stale_exclusions.sort_by(|a, b| a.identifier.cmp(&b.identifier));
        summary.unknown.sort();
        summary
    }

    /// Whether the run failed: true iff any unexpected failure exists
    pub fn failed(&self) -> bool {
        !self.unexpected_failures.is_empty()
    }

    /// Process exit code: 0 on success, 1 on any unexpected failure
    pub fn exit_code(&self) -> i32 {
        if self.failed() { 1 } else { 0 }
    }

    /// Print a colored summary to stdout
    pub fn print_summary(&self) {
        println!("\n{}", "=== Suite Reconciliation ===".bold().cyan());
        println!("Total:              {}", self.total);
        println!("Ok:                 {}", self.ok);
        println!("Expected failures:  {}", self.expected_failures);
        println!("Unknown:            {}", self.unknown_count);

        if !self.unexpected_failures.is_empty() {
            println!();
            println!(
                "{} ({}):",
                "Unexpected failures".red().bold(),
                self.unexpected_failures.len()
            );
            for failure in &self.unexpected_failures {
                match &failure.error {
                    Some(error) => println!("  {} {} - {}", "-".red(), failure.identifier, error),
                    None => println!("  {} {}", "-".red(), failure.identifier),
                }
            }
        }

        if !self.stale_exclusions.is_empty() {
            println!();
            println!(
                "{} ({}):",
                "Stale exclusions".yellow().bold(),
                self.stale_exclusions.len()
            );
            for stale in &self.stale_exclusions {
                println!(
                    "  {} {} (was: \"{}\")",
                    "+".green(),
                    stale.identifier,
                    stale.reason
                );
            }
        }

        if !self.unknown.is_empty() {
            println!();
            println!("{} ({}):", "Unknown".dimmed().bold(), self.unknown.len());
            for identifier in &self.unknown {
                println!("  {} {}", "?".dimmed(), identifier);
            }
        }

        println!();
        if self.failed() {
            println!("{}", "FAILED".red().bold());
        } else {
            println!("{}", "OK".green().bold());
        }
    }

    /// Export to JSON
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::outcome::{Outcome, OutcomeCollector};
    use crate::registry::{ExclusionEntry, ExclusionRegistry};
    use crate::verdict::classify_run;

    fn summarize(registry: &ExclusionRegistry, collector: &OutcomeCollector) -> RunSummary {
        RunSummary::from_classified(&classify_run(registry, collector))
    }

    #[test]
    fn regression_fails_the_run_and_stale_exclusion_does_not() {
        let registry = ExclusionRegistry::from_declarations([ExclusionEntry::new("A", "slow")])
            .unwrap();
        let collector = OutcomeCollector::new();
        collector.record("A", Outcome::Passed).unwrap();
        collector.record("B", Outcome::Passed).unwrap();
        collector
            .record_with_detail("C", Outcome::Failed, Some("assertion".into()))
            .unwrap();

        let summary = summarize(&registry, &collector);
        assert_eq!(summary.total, 3);
        assert_eq!(summary.ok, 1);
        assert_eq!(summary.unexpected_failures.len(), 1);
        assert_eq!(summary.unexpected_failures[0].identifier, "C");
        assert_eq!(summary.stale_exclusions.len(), 1);
        assert_eq!(summary.stale_exclusions[0].identifier, "A");
        assert_eq!(summary.stale_exclusions[0].reason, "slow");
        assert!(summary.failed());
        assert_eq!(summary.exit_code(), 1);
    }

    #[test]
    fn run_with_only_stale_and_unknown_succeeds() {
        let registry = ExclusionRegistry::from_declarations([
            ExclusionEntry::new("D", "hangs"),
            ExclusionEntry::new("E", "slow"),
        ])
        .unwrap();
        let collector = OutcomeCollector::new();
        collector.record("E", Outcome::Passed).unwrap();

        let summary = summarize(&registry, &collector);
        assert!(!summary.failed());
        assert_eq!(summary.exit_code(), 0);
        assert_eq!(summary.unknown, vec!["D".to_string()]);
        assert_eq!(summary.stale_exclusions.len(), 1);
    }

    #[test]
    fn expected_failures_do_not_fail_the_run() {
        let registry = ExclusionRegistry::from_declarations([ExclusionEntry::new("F", "uses fork")])
            .unwrap();
        let collector = OutcomeCollector::new();
        collector.record("F", Outcome::Errored).unwrap();

        let summary = summarize(&registry, &collector);
        assert_eq!(summary.expected_failures, 1);
        assert!(!summary.failed());
    }

    #[test]
    fn summarizing_twice_is_idempotent() {
        let registry = ExclusionRegistry::from_declarations([ExclusionEntry::new("A", "slow")])
            .unwrap();
        let collector = OutcomeCollector::new();
        collector.record("A", Outcome::Failed).unwrap();
        collector.record("B", Outcome::Passed).unwrap();

        assert_eq!(summarize(&registry, &collector), summarize(&registry, &collector));
    }

    #[test]
    fn summary_round_trips_through_json() {
        let registry = ExclusionRegistry::from_declarations([ExclusionEntry::new("A", "slow")])
            .unwrap();
        let collector = OutcomeCollector::new();
        collector.record("A", Outcome::Passed).unwrap();

        let summary = summarize(&registry, &collector);
        let json = summary.to_json().unwrap();
        let parsed: RunSummary = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, summary);
    }
}
