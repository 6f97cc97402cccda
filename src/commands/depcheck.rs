//! Depcheck Command - OWASP dependency-check of the runtime image jars

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use serde::Serialize;

use crate::application::use_cases::depcheck::DepcheckUseCase;
use crate::context::AppContext;
use crate::output::OutputFormat;
use crate::{Cli, Release, exit_codes};

/// Arguments for the depcheck command
#[derive(Args, Debug)]
pub struct DepcheckArgs {
    /// Release line to check
    #[arg(long = "version", value_enum, default_value = "single")]
    pub release: Release,

    /// Directory the `reports/` tree is written under
    #[arg(short, long, default_value = ".")]
    pub output: PathBuf,
}

#[derive(Debug, Serialize)]
struct DepcheckResult {
    release: &'static str,
    report: PathBuf,
}

/// Run the depcheck command
pub async fn run(ctx: &AppContext, _cli: &Cli, args: &DepcheckArgs) -> Result<i32> {
    tracing::info!("Dependency check of release {}", args.release.as_str());
    let layout = ctx.report_layout(&args.output);
    ctx.output.header("Dependency Check");

    let report = DepcheckUseCase::execute(ctx, &layout).await?;

    match ctx.output.format() {
        OutputFormat::Json => ctx.output.json(&DepcheckResult {
            release: args.release.as_str(),
            report,
        })?,
        OutputFormat::Table => ctx
            .output
            .success(&format!("Dependency report: {}", report.display())),
    }
    Ok(exit_codes::SUCCESS)
}
