//! IRX submission - upload an archive and start its static scan
//!
//! Uploads fail in a few recoverable ways: the vendor rejects the file with a
//! 400, the bearer token expires (401), or the transport drops. Each of those
//! costs one attempt out of a fixed budget.

use std::path::Path;

use anyhow::{Result, bail};

use crate::api_client::{AsocClient, CreateOutcome, StaticScanRequest, UploadOutcome};

/// Where submitted scans go
#[derive(Debug, Clone)]
pub struct SubmitTarget {
    pub app_id: String,
    pub locale: String,
    pub max_tries: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Scan created on the given attempt
    Created { attempt: u32 },
    /// Every attempt failed
    Exhausted,
}

/// Upload `irx` and create a static scan named `project`
pub async fn submit_irx(
    client: &AsocClient,
    target: &SubmitTarget,
    project: &str,
    irx: &Path,
) -> Result<SubmitOutcome> {
    if !irx.is_file() {
        bail!("IRX file {:?} for {} does not exist", irx, project);
    }
    tracing::info!("Calling ASoC API to create the static scan for {}...", project);

    for attempt in 1..=target.max_tries {
        tracing::info!("TRYING #{} OF {}...", attempt, target.max_tries);

        let file_id = match client.upload_file(irx).await {
            Ok(UploadOutcome::Uploaded(file_id)) => file_id,
            Ok(UploadOutcome::Rejected(body)) => {
                tracing::info!("Error when uploading IRX file: {}. Retrying...", body);
                continue;
            }
            Ok(UploadOutcome::Unauthorized) => {
                tracing::info!("Token expired. Generating a new one and retry...");
                refresh(client).await;
                continue;
            }
            Ok(UploadOutcome::Failed(status)) => {
                tracing::warn!("File upload for {} returned {}", project, status);
                continue;
            }
            Err(e) => {
                tracing::warn!("Error with File Upload: {:#}", e);
                continue;
            }
        };

        let request = StaticScanRequest {
            arsa_file_id: file_id,
            scan_name: project.to_string(),
            app_id: target.app_id.clone(),
            locale: target.locale.clone(),
            execute: true,
            personal: false,
        };
        tracing::debug!("Payload: {:?}", request);

        match client.create_static_scan(&request).await {
            Ok(CreateOutcome::Created(body)) => {
                tracing::info!("Response: {}", body);
                tracing::info!("PROJECT: {} WAS PROCESSED SUCCESSFULLY.", project);
                return Ok(SubmitOutcome::Created { attempt });
            }
            Ok(CreateOutcome::Unauthorized) => {
                tracing::info!("Token expired. Generating a new one and retry...");
                refresh(client).await;
            }
            Ok(CreateOutcome::Failed(status, body)) => {
                tracing::warn!("Scan creation for {} returned {}: {}", project, status, body);
            }
            Err(e) => tracing::warn!("Error creating scan for {}: {:#}", project, e),
        }
    }

    tracing::warn!(
        "Giving up on {} after {} attempts",
        project,
        target.max_tries
    );
    Ok(SubmitOutcome::Exhausted)
}

async fn refresh(client: &AsocClient) {
    if let Err(e) = client.refresh_token().await {
        tracing::warn!("Token refresh failed: {:#}", e);
    }
}
