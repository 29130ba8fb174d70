//! # Conformance Excludes
//!
//! Selective test-execution engine for a compatibility suite: reconciles the
//! raw pass/fail stream of an upstream test corpus against a declared set of
//! known exclusions, and classifies every test into a verdict.
//!
//! The engine never runs tests itself. An external executor produces one
//! [`Outcome`] per test; this crate joins those outcomes with the
//! [`ExclusionRegistry`] and reports regressions (a non-excluded test failed)
//! as fatal while stale exclusions (an excluded test now passes) stay
//! advisory, so upstream progress never blocks a run.

#![warn(clippy::all)]

pub mod error;
pub mod manifest;
pub mod outcome;
pub mod registry;
pub mod report;
pub mod verdict;

pub use error::{ExcludesError, ExcludesResult};
pub use manifest::ExclusionManifest;
pub use outcome::{Outcome, OutcomeCollector};
pub use registry::{ExclusionEntry, ExclusionRegistry};
pub use report::{RunSummary, StaleExclusion, UnexpectedFailure};
pub use verdict::{classify, classify_run, ClassifiedTest, Verdict};
