//! Report collection
//!
//! Static reports cover the whole static application and are only generated
//! once every static scan is `Ready`. Dynamic reports are generated per ready
//! scan; once all dynamic scans are ready the runtime container is torn down.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Serialize;

use super::export::{ExportScope, ExportUseCase};
use crate::ScanType;
use crate::api_client::{Report, ReportRequest};
use crate::application::services::report_poller::wait_for_report;
use crate::artifactory::upload_dir;
use crate::constants::REPORT_FILE_TYPES;
use crate::context::AppContext;
use crate::report_files::{ReportKind, ReportLayout, html_to_pdf};
use crate::timing::timed;

/// A file written under the report tree
#[derive(Debug, Clone, Serialize)]
pub struct ReportFile {
    pub kind: &'static str,
    pub path: PathBuf,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ReportsSummary {
    pub files: Vec<ReportFile>,
    /// Workflows skipped because their scans have not finished
    pub not_ready: Vec<&'static str>,
    pub failures: Vec<String>,
}

impl ReportsSummary {
    fn push_files(&mut self, kind: ReportKind, paths: Vec<PathBuf>) {
        self.files.extend(paths.into_iter().map(|path| ReportFile {
            kind: kind.as_str(),
            path,
        }));
    }

    fn record(&mut self, kind: ReportKind, result: Result<Option<Vec<PathBuf>>>) {
        match result {
            Ok(Some(paths)) => self.push_files(kind, paths),
            Ok(None) => self.not_ready.push(kind.as_str()),
            Err(e) => {
                tracing::warn!("{} reports failed: {:#}", kind, e);
                self.failures.push(format!("{} reports: {:#}", kind, e));
            }
        }
    }

    async fn export(&mut self, ctx: &AppContext, layout: &ReportLayout, kind: ReportKind, scope: ExportScope) {
        match ExportUseCase::execute(ctx, layout, kind, scope).await {
            Ok(paths) => self.push_files(kind, paths),
            Err(e) => self
                .failures
                .push(format!("{} {} export: {:#}", kind, scope.file_stem(), e)),
        }
    }
}

/// A generated report together with the format it was requested in
struct Pending {
    report: Report,
    file_type: &'static str,
}

pub struct ReportsUseCase;

impl ReportsUseCase {
    pub async fn execute(ctx: &AppContext, layout: &ReportLayout, scan_type: ScanType) -> Result<ReportsSummary> {
        timed("get_reports", Self::run(ctx, layout, scan_type)).await
    }

    async fn run(ctx: &AppContext, layout: &ReportLayout, scan_type: ScanType) -> Result<ReportsSummary> {
        ctx.asoc()?.refresh_token().await.context("ASoC login failed")?;
        let mut summary = ReportsSummary::default();

        match scan_type {
            ScanType::All => {
                summary.record(ReportKind::Static, static_reports(ctx, layout).await);
                summary.record(ReportKind::Dynamic, dynamic_reports(ctx, layout).await);
                summary.export(ctx, layout, ReportKind::Dynamic, ExportScope::Filtered).await;
                summary.export(ctx, layout, ReportKind::Static, ExportScope::Filtered).await;
                summary.export(ctx, layout, ReportKind::Static, ExportScope::Full).await;
            }
            ScanType::Static => {
                summary.record(ReportKind::Static, static_reports(ctx, layout).await);
                summary.export(ctx, layout, ReportKind::Static, ExportScope::Filtered).await;
                summary.export(ctx, layout, ReportKind::Static, ExportScope::Full).await;
            }
            ScanType::Dynamic => {
                summary.record(ReportKind::Dynamic, dynamic_reports(ctx, layout).await);
                summary.export(ctx, layout, ReportKind::Dynamic, ExportScope::Filtered).await;
            }
        }
        Ok(summary)
    }
}

/// Application-wide static reports; `None` while any static scan is unfinished
async fn static_reports(ctx: &AppContext, layout: &ReportLayout) -> Result<Option<Vec<PathBuf>>> {
    let client = ctx.asoc()?;
    let app_id = &ctx.config.asoc.static_app_id;
    let scans = client.list_scans(app_id).await?;

    if let Some(scan) = scans.iter().find(|s| !s.is_ready()) {
        tracing::info!("Static scan {} is {}, skipping reports", scan.name, scan.status());
        return Ok(None);
    }
    let app_name = scans
        .iter()
        .rev()
        .find_map(|s| s.app_name.clone())
        .unwrap_or_else(|| "static_report".to_string());

    let mut generated = Vec::new();
    for file_type in REPORT_FILE_TYPES {
        let request = ReportRequest::full(&app_name, file_type, &ctx.config.asoc.report_locale);
        if let Some(report) = client.generate_app_report(app_id, &request).await? {
            generated.push(Pending { report, file_type });
        }
    }

    let files = collect(ctx, layout, ReportKind::Static, generated).await?;
    Ok(Some(files))
}

/// Per-scan dynamic reports; `None` when no scan was ready
async fn dynamic_reports(ctx: &AppContext, layout: &ReportLayout) -> Result<Option<Vec<PathBuf>>> {
    let client = ctx.asoc()?;
    let scans = client.list_scans(&ctx.config.asoc.dynamic_app_id).await?;

    let mut generated = Vec::new();
    let mut all_done = true;
    for scan in &scans {
        if !scan.is_ready() {
            tracing::info!("Dynamic scan {} is {}", scan.name, scan.status());
            all_done = false;
            continue;
        }
        for file_type in REPORT_FILE_TYPES {
            let request = ReportRequest::full(&scan.name, file_type, &ctx.config.asoc.report_locale);
            if let Some(report) = client.generate_scan_report(&scan.id, &request).await? {
                generated.push(Pending { report, file_type });
            }
        }
    }

    if all_done {
        ctx.docker()
            .cleanup_runtime_container(&ctx.config.docker.runtime_container)
            .await;
    }
    if generated.is_empty() && !all_done {
        return Ok(None);
    }

    let files = collect(ctx, layout, ReportKind::Dynamic, generated).await?;
    Ok(Some(files))
}

/// Wait for, download and publish a batch of generated reports
async fn collect(
    ctx: &AppContext,
    layout: &ReportLayout,
    kind: ReportKind,
    generated: Vec<Pending>,
) -> Result<Vec<PathBuf>> {
    let client = ctx.asoc()?;
    let interval = Duration::from_secs(ctx.config.polling.report_interval_secs);

    let mut files = Vec::new();
    for Pending { report, file_type } in generated {
        let Some(ready) = wait_for_report(client, &report, interval).await else {
            tracing::warn!("Report {} never became ready, not downloading", report.name);
            continue;
        };
        files.extend(download(ctx, layout, kind, &ready, file_type).await?);
    }

    let dir = layout.dated_dir(kind);
    if dir.is_dir() {
        let url = format!(
            "{}/{}/{}",
            ctx.config.artifactory.appscan_url.trim_end_matches('/'),
            layout.stamp().timestamp,
            kind
        );
        match upload_dir(&ctx.http, &ctx.secrets, &dir, &url).await {
            Ok(count) => tracing::info!("Uploaded {} {} report file(s)", count, kind),
            Err(e) => tracing::warn!("Artifactory upload of {} reports failed: {:#}", kind, e),
        }
    }
    Ok(files)
}

/// Save one report as `<Name>.<ext>`, converting HTML to PDF, then mirror to latest
async fn download(
    ctx: &AppContext,
    layout: &ReportLayout,
    kind: ReportKind,
    report: &Report,
    file_type: &str,
) -> Result<Vec<PathBuf>> {
    let bytes = ctx.asoc()?.download_report(&report.id).await?;
    let dir = layout.ensure_dated_dir(kind)?;

    let name = if report.name.is_empty() { &report.id } else { &report.name };
    let path = dir.join(format!("{}.{}", name, file_type.to_lowercase()));
    tokio::fs::write(&path, &bytes)
        .await
        .with_context(|| format!("Failed to write {:?}", path))?;
    tracing::info!("{} file: {:?}", file_type, path);

    let mut files = vec![path.clone()];
    if file_type.eq_ignore_ascii_case("html") {
        match html_to_pdf(ctx.runner.as_ref(), &path).await {
            Ok(pdf) => files.push(pdf),
            Err(e) => tracing::warn!("{:#}", e),
        }
    }

    layout.mirror_to_latest(kind)?;
    Ok(files)
}
