//! Issue export - JSON, CSV and XLSX copies of an application's issues

use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::context::AppContext;
use crate::report_files::{
    ReportKind, ReportLayout, issue_rows, write_issues_csv, write_issues_xlsx,
};
use crate::timing::timed;

/// Open issues only, or every issue including fixed and noise
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportScope {
    Filtered,
    Full,
}

impl ExportScope {
    pub fn file_stem(&self) -> &'static str {
        match self {
            ExportScope::Filtered => "issues_filtered",
            ExportScope::Full => "issues",
        }
    }
}

pub struct ExportUseCase;

impl ExportUseCase {
    /// Export the issues of the static or dynamic application; returns the written files
    pub async fn execute(
        ctx: &AppContext,
        layout: &ReportLayout,
        kind: ReportKind,
        scope: ExportScope,
    ) -> Result<Vec<PathBuf>> {
        timed("asoc_export", Self::run(ctx, layout, kind, scope)).await
    }

    async fn run(
        ctx: &AppContext,
        layout: &ReportLayout,
        kind: ReportKind,
        scope: ExportScope,
    ) -> Result<Vec<PathBuf>> {
        let app_id = match kind {
            ReportKind::Static => &ctx.config.asoc.static_app_id,
            _ => &ctx.config.asoc.dynamic_app_id,
        };

        tracing::info!("Getting the {} issues of the {} application...", scope.file_stem(), kind);
        let export = ctx
            .asoc()?
            .list_issues(app_id, scope == ExportScope::Full)
            .await?;

        let dir = layout.ensure_dated_dir(kind)?;
        let stem = scope.file_stem();

        let json_path = dir.join(format!("{stem}.json"));
        std::fs::write(&json_path, serde_json::to_vec(&export)?)
            .with_context(|| format!("Failed to write {:?}", json_path))?;

        let rows = issue_rows(&export);
        tracing::info!("Export to CSV...");
        let csv_path = dir.join(format!("{stem}.csv"));
        write_issues_csv(&csv_path, &rows)?;

        tracing::info!("Export to excel...");
        let xlsx_path = dir.join(format!("{stem}.xlsx"));
        write_issues_xlsx(&xlsx_path, &rows)?;

        layout.mirror_to_latest(kind)?;
        Ok(vec![json_path, csv_path, xlsx_path])
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::api_client::testing::mount_login;
    use crate::config::Config;
    use crate::context::testing::{context, secrets, stamp};
    use crate::process::testing::RecordingRunner;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_filtered_export_writes_three_files_and_mirrors() -> Result<()> {
        let server = MockServer::start().await;
        mount_login(&server, "t").await;
        Mock::given(method("GET"))
            .and(path("/Issues/Application/dyn"))
            .and(query_param("$orderby", "ScanName"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "Items": [
                    {"ScanName": "SMCFS Scan", "Severity": "High", "SourceFile": "", "Location": "/smcfs", "Id": "1"},
                    {"ScanName": "SBC Scan", "Severity": "Low", "Id": "2"}
                ],
                "Count": 2
            })))
            .expect(1)
            .mount(&server)
            .await;

        let dir = tempfile::tempdir()?;
        let mut config = Config::default();
        config.asoc.endpoint = server.uri();
        config.asoc.dynamic_app_id = "dyn".to_string();
        let ctx = context(config, secrets(&[]), Arc::new(RecordingRunner::default()), dir.path());
        let layout = ReportLayout::new(dir.path(), stamp());

        let files =
            ExportUseCase::execute(&ctx, &layout, ReportKind::Dynamic, ExportScope::Filtered).await?;
        assert_eq!(files.len(), 3);
        assert!(files.iter().all(|f| f.exists()));

        let csv = std::fs::read_to_string(layout.latest_dir(ReportKind::Dynamic).join("issues_filtered.csv"))?;
        assert_eq!(csv.lines().count(), 3);
        assert!(csv.contains(" : /smcfs"));

        let json: serde_json::Value = serde_json::from_slice(&std::fs::read(
            layout.dated_dir(ReportKind::Dynamic).join("issues_filtered.json"),
        )?)?;
        assert_eq!(json["Count"], 2);
        Ok(())
    }

    #[tokio::test]
    async fn test_failed_export_writes_nothing() -> Result<()> {
        let server = MockServer::start().await;
        mount_login(&server, "t").await;
        Mock::given(method("GET"))
            .and(path("/Issues/Application/static"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir()?;
        let mut config = Config::default();
        config.asoc.endpoint = server.uri();
        config.asoc.static_app_id = "static".to_string();
        let ctx = context(config, secrets(&[]), Arc::new(RecordingRunner::default()), dir.path());
        let layout = ReportLayout::new(dir.path(), stamp());

        let result = ExportUseCase::execute(&ctx, &layout, ReportKind::Static, ExportScope::Full).await;
        assert!(result.is_err());
        assert!(!layout.dated_dir(ReportKind::Static).join("issues.json").exists());
        Ok(())
    }
}
