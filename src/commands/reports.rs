//! Reports Command - collect reports and issue exports of finished scans

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use comfy_table::Cell;

use crate::application::exit_policy::reports_exit_code;
use crate::application::use_cases::reports::ReportsUseCase;
use crate::context::AppContext;
use crate::output::{OutputFormat, truncate_start};
use crate::{Cli, ScanType};

/// Arguments for the reports command
#[derive(Args, Debug)]
pub struct ReportsArgs {
    /// Reports to collect
    #[arg(value_enum)]
    pub scan_type: ScanType,

    /// Directory the `reports/` tree is written under
    #[arg(short, long, default_value = ".")]
    pub output: PathBuf,
}

/// Run the reports command
pub async fn run(ctx: &AppContext, _cli: &Cli, args: &ReportsArgs) -> Result<i32> {
    let layout = ctx.report_layout(&args.output);
    ctx.output.header("ASoC Reports");

    let summary = ReportsUseCase::execute(ctx, &layout, args.scan_type).await?;

    match ctx.output.format() {
        OutputFormat::Json => ctx.output.json(&summary)?,
        OutputFormat::Table => {
            if summary.files.is_empty() {
                ctx.output.info("No report files were written");
            } else {
                let mut table = ctx.output.create_table_with_headers(&["Type", "File"]);
                for file in &summary.files {
                    table.add_row(vec![
                        Cell::new(file.kind),
                        Cell::new(truncate_start(&file.path.to_string_lossy(), 80)),
                    ]);
                }
                ctx.output.table(&table);
                ctx.output.success(&format!(
                    "{} file(s) under {}",
                    summary.files.len(),
                    layout.dated_dir_root().display()
                ));
            }
        }
    }

    for kind in &summary.not_ready {
        ctx.output
            .warn(&format!("{} scans are not finished yet, reports skipped", kind));
    }
    for failure in &summary.failures {
        ctx.output.warn(failure);
    }

    Ok(reports_exit_code(&summary))
}
