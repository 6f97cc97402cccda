//! Scan Command - start static and/or dynamic scan rounds
//!
//! `scan all` runs the dynamic round first so the runtime container is
//! deploying while the static projects are being prepared.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use comfy_table::Cell;
use console::style;
use serde::Serialize;

use crate::application::exit_policy::{failed_submissions, scan_exit_code};
use crate::application::use_cases::dynamic_scan::DynamicScanUseCase;
use crate::application::use_cases::static_scan::{StaticScanInput, StaticScanUseCase};
use crate::application::use_cases::{ScanOutcome, SubmissionStatus};
use crate::context::AppContext;
use crate::output::OutputFormat;
use crate::{Cli, Release, ScanType, exit_codes};

/// Arguments for the scan command
#[derive(Args, Debug)]
pub struct ScanArgs {
    /// Scans to start
    #[arg(value_enum)]
    pub scan_type: ScanType,

    /// Path to the source checkout (required for static scans)
    #[arg(short, long)]
    pub source: Option<PathBuf>,

    /// Path to the source working tree (required for static scans)
    #[arg(long, visible_alias = "sw")]
    pub source_working: Option<PathBuf>,

    /// Path to the operator source tree
    #[arg(long)]
    pub source_operator: Option<PathBuf>,

    /// Release line to scan
    #[arg(long = "version", value_enum, default_value = "single")]
    pub release: Release,
}

impl ScanArgs {
    /// Static scan inputs, `None` when a required path is missing
    pub fn static_input(&self) -> Option<StaticScanInput> {
        Some(StaticScanInput {
            source: self.source.clone()?,
            source_working: self.source_working.clone()?,
            source_operator: self.source_operator.clone(),
        })
    }
}

#[derive(Debug, Serialize)]
struct ScanRound {
    kind: &'static str,
    #[serde(flatten)]
    outcome: ScanOutcome,
}

/// Run the scan command
pub async fn run(ctx: &AppContext, _cli: &Cli, args: &ScanArgs) -> Result<i32> {
    let static_input = if args.scan_type.includes_static() {
        match args.static_input() {
            Some(input) => Some(input),
            None => {
                ctx.output
                    .error("--source and --source-working are required for static scans");
                return Ok(exit_codes::CONFIG_ERROR);
            }
        }
    } else {
        None
    };

    tracing::info!("Scanning release {} ({:?})", args.release.as_str(), args.scan_type);
    ctx.output.header("ASoC Scan");

    let mut rounds = Vec::new();
    if args.scan_type.includes_dynamic() {
        let outcome = DynamicScanUseCase::execute(ctx).await?;
        rounds.push(ScanRound { kind: "dynamic", outcome });
    }
    if let Some(input) = static_input {
        let outcome = StaticScanUseCase::execute(ctx, &input).await?;
        rounds.push(ScanRound { kind: "static", outcome });
    }

    let outcomes: Vec<ScanOutcome> = rounds.iter().map(|r| r.outcome.clone()).collect();
    let exit_code = scan_exit_code(&outcomes);

    match ctx.output.format() {
        OutputFormat::Json => ctx.output.json(&rounds)?,
        OutputFormat::Table => print_rounds(ctx, &rounds),
    }

    let failed = failed_submissions(&outcomes);
    if failed > 0 {
        ctx.output
            .warn(&format!("{} scan submission(s) did not start", failed));
    }
    if exit_code == exit_codes::SCANS_PENDING {
        ctx.output
            .warn("Previous scans are still running, nothing new was started for them");
    }

    Ok(exit_code)
}

fn print_rounds(ctx: &AppContext, rounds: &[ScanRound]) {
    let mut table = ctx.output.create_table_with_headers(&["Type", "Scan", "Status"]);
    for round in rounds {
        match &round.outcome {
            ScanOutcome::Started(submissions) => {
                for submission in submissions {
                    let status = match &submission.status {
                        SubmissionStatus::Created => style("created".to_string()).green(),
                        SubmissionStatus::Exhausted => style("retries exhausted".to_string()).red(),
                        SubmissionStatus::Failed(detail) => style(format!("failed: {}", detail)).red(),
                    };
                    table.add_row(vec![
                        Cell::new(round.kind),
                        Cell::new(&submission.name),
                        Cell::new(status),
                    ]);
                }
            }
            ScanOutcome::Pending(names) => {
                for name in names {
                    table.add_row(vec![
                        Cell::new(round.kind),
                        Cell::new(name),
                        Cell::new(style("still running").yellow()),
                    ]);
                }
            }
        }
    }
    ctx.output.table(&table);
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_static_input_requires_both_sources() {
        let cli = Cli::parse_from(["automator", "scan", "static", "-s", "/src"]);
        let crate::Commands::Scan(args) = cli.command else {
            panic!("expected scan");
        };
        assert!(args.static_input().is_none());

        let cli = Cli::parse_from([
            "automator",
            "scan",
            "all",
            "-s",
            "/src",
            "--source-working",
            "/work",
            "--version",
            "10.0",
        ]);
        let crate::Commands::Scan(args) = cli.command else {
            panic!("expected scan");
        };
        assert_eq!(args.release, Release::V10_0);
        let input = args.static_input().expect("input");
        assert_eq!(input.source_working, PathBuf::from("/work"));
        assert!(input.source_operator.is_none());
    }
}
