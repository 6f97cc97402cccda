//! Dynamic scan round
//!
//! Stands up the runtime container from the newest image, then asks the vendor
//! to crawl every configured application through the presence agent.

use anyhow::{Context, Result};

use super::{ScanOutcome, ScanSubmission, SubmissionStatus};
use crate::api_client::{CreateOutcome, DynamicScanRequest};
use crate::application::services::scan_guard::remove_old_scans;
use crate::config::TargetApp;
use crate::context::AppContext;
use crate::images::ImageResolver;
use crate::settings::PRESENCE_ID;
use crate::templates::render_db_config;
use crate::timing::timed;

/// Runtime config files rendered with database settings before the container starts
pub const RENDERED_CONFIGS: [&str; 2] = ["server.xml", "system_overrides.properties"];

pub struct DynamicScanUseCase;

impl DynamicScanUseCase {
    pub async fn execute(ctx: &AppContext) -> Result<ScanOutcome> {
        timed("dynamic_scan", Self::run(ctx)).await
    }

    async fn run(ctx: &AppContext) -> Result<ScanOutcome> {
        let config = &ctx.config;
        let configs_dir = ctx.resolve(&config.dynamic_scan.app_configs_dir);
        for file in RENDERED_CONFIGS {
            render_db_config(&configs_dir.join(file), &ctx.secrets)?;
        }

        let image = ImageResolver::new(&ctx.http, &config.images, &ctx.secrets)
            .latest_image()
            .await?;

        let client = ctx.asoc()?;
        client.refresh_token().await.context("ASoC login failed")?;
        let old = remove_old_scans(client, &config.asoc.dynamic_app_id).await?;
        if old.any_pending() {
            let pending = old.pending_names().into_iter().map(str::to_string).collect();
            return Ok(ScanOutcome::Pending(pending));
        }

        let presence = config.dynamic_scan.presence_command.trim();
        if presence.is_empty() {
            tracing::info!("No presence command configured, assuming the agent is running");
        } else {
            tracing::info!("Starting ASoC presence...");
            ctx.runner
                .run(presence)
                .await
                .context("Failed to start the ASoC presence")?;
        }

        ctx.docker()
            .start_app_container(&image, &configs_dir, &ctx.deployment_probe())
            .await?;

        let mut submissions = Vec::new();
        for target in &config.dynamic_scan.targets {
            tracing::info!("Creating a new scan for {}...", target.name);
            let request = scan_request(ctx, target);
            tracing::debug!("Payload: {:?}", request.scan_name);

            let status = match client.create_dynamic_scan(&request).await {
                Ok(CreateOutcome::Created(_)) => SubmissionStatus::Created,
                Ok(CreateOutcome::Unauthorized) => {
                    SubmissionStatus::Failed("unauthorized".to_string())
                }
                Ok(CreateOutcome::Failed(status, body)) => {
                    tracing::warn!("Scan creation for {} returned {}: {}", target.name, status, body);
                    SubmissionStatus::Failed(format!("{} {}", status, body))
                }
                Err(e) => {
                    tracing::warn!("Scan creation for {} failed: {:#}", target.name, e);
                    SubmissionStatus::Failed(format!("{:#}", e))
                }
            };
            submissions.push(ScanSubmission::new(&target.name, status));
        }

        Ok(ScanOutcome::Started(submissions))
    }
}

/// Staging scan of one deployed application, logging in with its credentials
pub fn scan_request(ctx: &AppContext, target: &TargetApp) -> DynamicScanRequest {
    let config = &ctx.config;
    DynamicScanRequest {
        scan_type: "Staging".to_string(),
        presence_id: ctx.secrets.get(PRESENCE_ID).map(str::to_string),
        include_verified_domains: false,
        starting_url: config.dynamic_scan.target_url(target),
        login_user: target.user.clone(),
        login_password: target.password.clone(),
        extra_field: String::new(),
        http_auth_user_name: target.user.clone(),
        http_auth_password: target.password.clone(),
        only_full_results: true,
        test_optimization_level: "NoOptimization".to_string(),
        thread_num: config.dynamic_scan.thread_num,
        scan_name: format!("{} Scan", target.name),
        enable_mail_notification: false,
        locale: config.asoc.scan_locale.clone(),
        app_id: config.asoc.dynamic_app_id.clone(),
        execute: true,
        personal: false,
        use_automatic_timeout: true,
        fully_automatic: false,
    }
}
