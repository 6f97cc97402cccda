//! Report poll - wait for a generated report to become downloadable

use std::time::Duration;

use crate::api_client::{AsocClient, Report};

/// Poll the report at a fixed interval
///
/// Returns the ready report, or `None` when the vendor stops answering 200 or
/// the request fails. There is no backoff and no overall deadline.
pub async fn wait_for_report(client: &AsocClient, report: &Report, interval: Duration) -> Option<Report> {
    loop {
        match client.report_status(&report.id).await {
            Ok(Some(current)) if current.is_ready() => {
                tracing::info!("Report {} is ready", report.name);
                return Some(current);
            }
            Ok(Some(current)) => {
                tracing::info!(
                    "Report for {} is not ready ({}). Waiting...",
                    report.name,
                    current.status.as_deref().unwrap_or("unknown")
                );
            }
            Ok(None) => {
                tracing::warn!("Stopped waiting for report {}", report.name);
                return None;
            }
            Err(e) => {
                tracing::warn!("Stopped waiting for report {}: {:#}", report.name, e);
                return None;
            }
        }
        tokio::time::sleep(interval).await;
    }
}
