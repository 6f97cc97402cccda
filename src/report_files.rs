//! Report files - on-disk layout and conversions for downloaded reports
//!
//! Reports land in `<output>/reports/<date_str>/<kind>/` and are mirrored into
//! `<output>/reports/latest/<kind>/` after every write.

use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Datelike, Local, NaiveDate, TimeZone};
use rust_xlsxwriter::{Format, Workbook};
use walkdir::WalkDir;

use crate::constants::{ISSUE_HEADER_FIELDS, LATEST_DIR, REPORTS_DIR};
use crate::process::{CommandRunner, shell_quote};

/// Which workflow a report directory belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportKind {
    Static,
    Dynamic,
    Depcheck,
}

impl ReportKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReportKind::Static => "static",
            ReportKind::Dynamic => "dynamic",
            ReportKind::Depcheck => "depcheck",
        }
    }
}

impl fmt::Display for ReportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Date and time labels computed once per run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunStamp {
    /// `YYYY_MM_week_N`
    pub date_str: String,
    /// `yyMMdd_HHMM`, used for upload paths
    pub timestamp: String,
}

impl RunStamp {
    pub fn now() -> Self {
        Self::at(&Local::now())
    }

    pub fn at<Tz: TimeZone>(when: &DateTime<Tz>) -> Self
    where
        Tz::Offset: fmt::Display,
    {
        let date = when.date_naive();
        Self {
            date_str: format!(
                "{}_week_{}",
                when.format("%Y_%m"),
                week_of_month(date)
            ),
            timestamp: when.format("%y%m%d_%H%M").to_string(),
        }
    }
}

/// Week number of the month; months starting on a Sunday count that Sunday as week 0
pub fn week_of_month(date: NaiveDate) -> u32 {
    let first_weekday = date
        .with_day(1)
        .map(|d| d.weekday().num_days_from_monday())
        .unwrap_or(0);
    let adjusted = date.day() + first_weekday;
    let week = adjusted.div_ceil(7);
    if first_weekday == 6 { week - 1 } else { week }
}

/// Paths of the report tree under an output root
#[derive(Debug, Clone)]
pub struct ReportLayout {
    root: PathBuf,
    stamp: RunStamp,
}

impl ReportLayout {
    pub fn new(output: &Path, stamp: RunStamp) -> Self {
        Self {
            root: output.join(REPORTS_DIR),
            stamp,
        }
    }

    pub fn stamp(&self) -> &RunStamp {
        &self.stamp
    }

    /// `reports/<date_str>`
    pub fn dated_dir_root(&self) -> PathBuf {
        self.root.join(&self.stamp.date_str)
    }

    /// `reports/<date_str>/<kind>`
    pub fn dated_dir(&self, kind: ReportKind) -> PathBuf {
        self.dated_dir_root().join(kind.as_str())
    }

    /// `reports/latest/<kind>`
    pub fn latest_dir(&self, kind: ReportKind) -> PathBuf {
        self.root.join(LATEST_DIR).join(kind.as_str())
    }

    /// Create and return the dated directory
    pub fn ensure_dated_dir(&self, kind: ReportKind) -> Result<PathBuf> {
        let dir = self.dated_dir(kind);
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create report directory {:?}", dir))?;
        Ok(dir)
    }

    /// Copy the dated directory over the latest one
    pub fn mirror_to_latest(&self, kind: ReportKind) -> Result<usize> {
        copy_tree(&self.dated_dir(kind), &self.latest_dir(kind))
    }
}

/// Recursively copy files, overwriting existing ones; returns the file count
pub fn copy_tree(from: &Path, to: &Path) -> Result<usize> {
    let mut copied = 0;
    for entry in WalkDir::new(from) {
        let entry = entry.with_context(|| format!("Failed to walk {:?}", from))?;
        let relative = entry.path().strip_prefix(from)?;
        let target = to.join(relative);
        if entry.file_type().is_dir() {
            std::fs::create_dir_all(&target)
                .with_context(|| format!("Failed to create {:?}", target))?;
        } else if entry.file_type().is_file() {
            std::fs::copy(entry.path(), &target)
                .with_context(|| format!("Failed to copy {:?} to {:?}", entry.path(), target))?;
            copied += 1;
        }
    }
    Ok(copied)
}

/// Regular files directly inside a directory, sorted by name
pub fn list_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files: Vec<PathBuf> = WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| e.into_path())
        .collect();
    files.sort();
    Ok(files)
}

/// Render an HTML report to `<stem>_html.pdf` next to it
pub async fn html_to_pdf(runner: &dyn CommandRunner, html: &Path) -> Result<PathBuf> {
    let stem = html
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();
    let pdf = html.with_file_name(format!("{}_html.pdf", stem));
    runner
        .run(&format!(
            "wkhtmltopdf --quiet {} {}",
            shell_quote(&html.to_string_lossy()),
            shell_quote(&pdf.to_string_lossy())
        ))
        .await
        .context("HTML to PDF conversion failed")?;
    Ok(pdf)
}

/// Text of an issue field as it should appear in a CSV cell
fn field_text(item: &serde_json::Value, key: &str) -> String {
    match item.get(key) {
        None | Some(serde_json::Value::Null) => String::new(),
        Some(serde_json::Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

/// Map one vendor issue onto the export columns
///
/// Columns the vendor does not provide are kept as their literal header text so
/// the sheet can be filled in by hand.
pub fn issue_row(item: &serde_json::Value) -> Vec<String> {
    ISSUE_HEADER_FIELDS
        .iter()
        .map(|column| match *column {
            "SourceFile : Location" => format!(
                "{} : {}",
                field_text(item, "SourceFile"),
                field_text(item, "Location")
            ),
            "component" | "intext" | "asv" | "ase" | "asve" | "dispo" | "expl" | "trgt"
            | "compen" | "psirt" => column.to_string(),
            key => field_text(item, key),
        })
        .collect()
}

/// Rows of an issue export response
pub fn issue_rows(export: &serde_json::Value) -> Vec<Vec<String>> {
    export
        .get("Items")
        .and_then(|items| items.as_array())
        .map(|items| items.iter().map(issue_row).collect())
        .unwrap_or_default()
}

pub fn write_issues_csv(path: &Path, rows: &[Vec<String>]) -> Result<()> {
    let mut writer =
        csv::Writer::from_path(path).with_context(|| format!("Failed to create {:?}", path))?;
    writer.write_record(ISSUE_HEADER_FIELDS)?;
    for row in rows {
        writer.write_record(row)?;
    }
    writer.flush()?;
    Ok(())
}

pub fn write_issues_xlsx(path: &Path, rows: &[Vec<String>]) -> Result<()> {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    let bold = Format::new().set_bold();

    for (col, header) in ISSUE_HEADER_FIELDS.iter().enumerate() {
        sheet.write_string_with_format(0, col as u16, *header, &bold)?;
    }
    for (r, row) in rows.iter().enumerate() {
        for (col, value) in row.iter().enumerate() {
            let row_idx = (r + 1) as u32;
            match value.parse::<f64>() {
                Ok(n) if !value.is_empty() => sheet.write_number(row_idx, col as u16, n)?,
                _ => sheet.write_string(row_idx, col as u16, value)?,
            };
        }
    }

    workbook
        .save(path)
        .with_context(|| format!("Failed to write {:?}", path))?;
    Ok(())
}
