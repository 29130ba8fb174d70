//! Reconciliation binary: join an executor's outcome log with the declared
//! exclusion manifests and report verdicts.
//!
//! Exit code is the one CLI contract the engine dictates: 0 iff no
//! unexpected failures.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use clap::Parser;
use colored::Colorize;
use serde::Deserialize;
use tracing::warn;
use tracing_subscriber::filter::EnvFilter;

use conformance_excludes::{
    classify_run, manifest, ExcludesError, Outcome, OutcomeCollector, RunSummary, Verdict,
};

#[derive(Parser, Debug)]
#[command(name = "excludes")]
#[command(about = "Reconcile suite outcomes against declared exclusions")]
struct Args {
    /// Exclusion manifest file(s), merged into one registry
    #[arg(short, long = "excludes", required = true)]
    excludes: Vec<PathBuf>,

    /// JSONL outcome log from the test executor
    #[arg(short, long)]
    outcomes: PathBuf,

    /// Output the summary as JSON
    #[arg(long)]
    json: bool,

    /// Print a verdict line per test
    #[arg(short, long)]
    verbose: bool,
}

/// One line of the executor's JSONL log
#[derive(Debug, Deserialize)]
struct OutcomeRecord {
    test: String,
    outcome: Outcome,
    #[serde(default)]
    error: Option<String>,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("warn".parse().unwrap()))
        .init();

    let args = Args::parse();

    let registry = match manifest::load_registry(&args.excludes) {
        Ok(registry) => registry,
        Err(e) => {
            eprintln!("{} {}", "error:".red().bold(), e);
            std::process::exit(2);
        }
    };

    let collector = OutcomeCollector::new();
    if let Err(e) = record_outcomes(&args.outcomes, &collector) {
        eprintln!("{} {}", "error:".red().bold(), e);
        std::process::exit(2);
    }

    let classified = classify_run(&registry, &collector);

    if args.verbose && !args.json {
        for test in &classified {
            let status = match test.verdict {
                Verdict::Ok => "OK".green().to_string(),
                Verdict::ExpectedFailure => "XFAIL".yellow().to_string(),
                Verdict::UnexpectedFailure => "FAIL".red().bold().to_string(),
                Verdict::UnexpectedPass => "STALE".yellow().bold().to_string(),
                Verdict::Unknown => "?".dimmed().to_string(),
            };
            println!("[{}] {}", status, test.identifier);
            if let Some(ref reason) = test.reason {
                println!("  reason: {}", reason);
            }
            if let Some(ref detail) = test.detail {
                println!("  error: {}", detail);
            }
        }
    }

    let summary = RunSummary::from_classified(&classified);

    if args.json {
        match summary.to_json() {
            Ok(json) => println!("{json}"),
            Err(e) => {
                eprintln!("{} failed to serialize summary: {}", "error:".red().bold(), e);
                std::process::exit(2);
            }
        }
    } else {
        summary.print_summary();
    }

    std::process::exit(summary.exit_code());
}

/// Stream the JSONL log into the collector.
///
/// Duplicate records are warned and dropped (first wins); malformed lines
/// abort, since a corrupt log means the run cannot be trusted.
fn record_outcomes(path: &Path, collector: &OutcomeCollector) -> Result<(), String> {
    let file = File::open(path)
        .map_err(|e| format!("failed to open outcome log '{}': {}", path.display(), e))?;

    for (lineno, line) in BufReader::new(file).lines().enumerate() {
        let line = line
            .map_err(|e| format!("failed to read outcome log '{}': {}", path.display(), e))?;
        if line.trim().is_empty() {
            continue;
        }

        let record: OutcomeRecord = serde_json::from_str(&line).map_err(|e| {
            format!(
                "malformed outcome record at {}:{}: {}",
                path.display(),
                lineno + 1,
                e
            )
        })?;

        match collector.record_with_detail(record.test, record.outcome, record.error) {
            Ok(()) => {}
            Err(e @ ExcludesError::DuplicateOutcome { .. }) => {
                warn!("{e}");
            }
            Err(e) => return Err(e.to_string()),
        }
    }

    Ok(())
}
