//! Static scan round
//!
//! Every listed project is packaged into an IRX archive by the scanner CLI and
//! submitted to the static application. Artifact projects (jars pulled from
//! Jenkins) and the operator project are submitted first, then the listed
//! projects fan out over a small worker pool.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use futures::StreamExt;
use futures::stream::FuturesUnordered;
use tokio::sync::Semaphore;

use super::{ScanOutcome, ScanSubmission, SubmissionStatus};
use crate::application::services::irx_submitter::{SubmitOutcome, SubmitTarget, submit_irx};
use crate::application::services::scan_guard::remove_old_scans;
use crate::config::ArtifactProject;
use crate::constants::PROJECT_PATH_PLACEHOLDER;
use crate::context::AppContext;
use crate::download::download_to;
use crate::process::shell_quote;
use crate::settings::{JENKINS_TOKEN, JENKINS_USER};
use crate::templates::render_file;
use crate::timing::timed;

/// Source locations for a static scan round
#[derive(Debug, Clone)]
pub struct StaticScanInput {
    /// Checkout whose stale IRX files are removed
    pub source: PathBuf,
    /// Tree the listed projects are resolved against
    pub source_working: PathBuf,
    pub source_operator: Option<PathBuf>,
}

/// One IRX to build and submit
struct IrxJob {
    name: String,
    template: PathBuf,
    project_path: PathBuf,
    out_dir: PathBuf,
}

pub struct StaticScanUseCase;

impl StaticScanUseCase {
    pub async fn execute(ctx: &AppContext, input: &StaticScanInput) -> Result<ScanOutcome> {
        timed("static_scan", Self::run(ctx, input)).await
    }

    async fn run(ctx: &AppContext, input: &StaticScanInput) -> Result<ScanOutcome> {
        let client = ctx.asoc()?;
        let config = &ctx.config;
        client.refresh_token().await.context("ASoC login failed")?;

        let old = remove_old_scans(client, &config.asoc.static_app_id).await?;

        let source = ctx.resolve(&input.source);
        tracing::info!("Removing irx files...");
        ctx.runner
            .run(&format!(
                "cd {} && find . -name \"*.irx\" -type f -delete",
                shell_quote(&source.to_string_lossy())
            ))
            .await?;

        let projects = read_projects(&ctx.resolve(&config.static_scan.projects_file))?;
        tracing::debug!("PROJECTS TO SCAN: {:?}", projects);

        let pending: Vec<String> = projects
            .iter()
            .filter(|p| old.is_pending(p))
            .cloned()
            .collect();
        if !pending.is_empty() {
            for project in &pending {
                tracing::info!("{} is PENDING/RUNNING", project);
            }
            return Ok(ScanOutcome::Pending(pending));
        }

        let tmp = tempfile::Builder::new()
            .prefix("static-scan")
            .tempdir_in(&ctx.working_dir)
            .context("Failed to create temp dir")?;
        let target = SubmitTarget {
            app_id: config.asoc.static_app_id.clone(),
            locale: config.asoc.scan_locale.clone(),
            max_tries: config.polling.upload_max_tries,
        };
        let template = ctx.resolve(&config.static_scan.config_template);

        let mut submissions = Vec::new();
        for artifact in &config.static_scan.artifact_projects {
            tracing::info!("Create Static Scan for {}", artifact.name);
            let submission = match fetch_artifact(ctx, tmp.path(), artifact).await {
                Ok(dir) => {
                    let job = IrxJob {
                        name: artifact.name.clone(),
                        template: template.clone(),
                        project_path: dir.clone(),
                        out_dir: dir,
                    };
                    process_job(ctx, &target, tmp.path(), &job).await
                }
                Err(e) => ScanSubmission::failed(&artifact.name, &e),
            };
            submissions.push(submission);
        }

        if let Some(operator) = &input.source_operator {
            tracing::info!("Create Static Scan for Operator");
            let operator = ctx.resolve(operator);
            let job = IrxJob {
                name: config.static_scan.operator_project_name.clone(),
                template: ctx.resolve(&config.static_scan.operator_config_template),
                project_path: operator.clone(),
                out_dir: operator,
            };
            submissions.push(process_job(ctx, &target, tmp.path(), &job).await);
        }

        let source_working = ctx.resolve(&input.source_working);
        let jobs: Vec<IrxJob> = projects
            .iter()
            .map(|project| IrxJob {
                name: project.clone(),
                template: template.clone(),
                project_path: source_working.join(project),
                out_dir: tmp.path().to_path_buf(),
            })
            .collect();
        submissions.extend(fan_out(ctx, &target, tmp.path(), &jobs).await);

        Ok(ScanOutcome::Started(submissions))
    }
}

/// Project names, one per line; blank lines are skipped
pub fn read_projects(path: &Path) -> Result<Vec<String>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read project list {:?}", path))?;
    Ok(content
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .collect())
}

/// File-system safe name of a project, also the IRX name
pub fn project_file_name(project: &str) -> String {
    project.replace('/', "_")
}

/// Submit jobs over the worker pool, starting one every stagger interval
async fn fan_out(
    ctx: &AppContext,
    target: &SubmitTarget,
    tmp: &Path,
    jobs: &[IrxJob],
) -> Vec<ScanSubmission> {
    let polling = &ctx.config.polling;
    let semaphore = Arc::new(Semaphore::new(polling.static_workers.max(1)));
    let stagger = Duration::from_secs(polling.submission_stagger_secs);

    let mut futures = FuturesUnordered::new();
    for (i, job) in jobs.iter().enumerate() {
        let semaphore = semaphore.clone();
        futures.push(async move {
            tokio::time::sleep(stagger * i as u32).await;
            let Ok(_permit) = semaphore.acquire().await else {
                return (
                    i,
                    ScanSubmission::new(
                        &job.name,
                        SubmissionStatus::Failed("worker pool closed".to_string()),
                    ),
                );
            };
            (i, process_job(ctx, target, tmp, job).await)
        });
    }

    let mut results = Vec::with_capacity(jobs.len());
    while let Some(result) = futures.next().await {
        results.push(result);
    }
    // Completion order varies between runs; report in project list order
    results.sort_by_key(|(i, _)| *i);
    results.into_iter().map(|(_, submission)| submission).collect()
}

async fn process_job(
    ctx: &AppContext,
    target: &SubmitTarget,
    tmp: &Path,
    job: &IrxJob,
) -> ScanSubmission {
    let file_name = project_file_name(&job.name);
    tracing::info!("PROCESSING PROJECT: {} - {}", job.name, file_name);

    let result = async {
        let client = ctx.asoc()?;
        let config_file = tmp.join(format!("appscan-config-{}-tmp.xml", file_name));
        let project_path = job.project_path.to_string_lossy();
        render_file(
            &job.template,
            &config_file,
            &[(PROJECT_PATH_PLACEHOLDER, project_path.as_ref())],
        )?;

        tracing::info!("Generating {}.irx file...", file_name);
        ctx.runner
            .run(&format!(
                "{} -c {} -n {}.irx -d {}",
                ctx.config.static_scan.prepare_command,
                shell_quote(&config_file.to_string_lossy()),
                shell_quote(&file_name),
                shell_quote(&job.out_dir.to_string_lossy())
            ))
            .await?;

        let irx = job.out_dir.join(format!("{}.irx", file_name));
        submit_irx(client, target, &job.name, &irx).await
    }
    .await;

    tracing::info!("FINISHED PROCESSING PROJECT: {} - {}", job.name, file_name);
    match result {
        Ok(SubmitOutcome::Created { .. }) => ScanSubmission::new(&job.name, SubmissionStatus::Created),
        Ok(SubmitOutcome::Exhausted) => ScanSubmission::new(&job.name, SubmissionStatus::Exhausted),
        Err(e) => {
            tracing::warn!("Project {} failed: {:#}", job.name, e);
            ScanSubmission::failed(&job.name, &e)
        }
    }
}

/// Download an artifact project's jar into its own directory under `tmp`
async fn fetch_artifact(ctx: &AppContext, tmp: &Path, artifact: &ArtifactProject) -> Result<PathBuf> {
    let dir = tmp.join(&artifact.dir);
    tracing::info!("Downloading {}...", artifact.file_name);
    let auth = ctx.secrets.basic_auth(JENKINS_USER, JENKINS_TOKEN).ok();
    download_to(
        &ctx.http,
        &artifact.url,
        auth.as_ref(),
        &dir,
        &artifact.file_name,
        !ctx.output.is_quiet(),
    )
    .await?;
    Ok(dir)
}
