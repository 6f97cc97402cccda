//! Dependency check of the third-party jars shipped in the runtime image

use std::io::Cursor;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};

use crate::artifactory::upload_dir;
use crate::constants::THIRD_PARTY_JARS;
use crate::context::AppContext;
use crate::download::fetch_bytes;
use crate::images::ImageResolver;
use crate::process::shell_quote;
use crate::report_files::{ReportKind, ReportLayout};
use crate::timing::timed;

/// Liberty dropins directory inside the runtime image
const DROPINS_DIR: &str = "/opt/ibm/wlp/usr/servers/defaultServer/dropins";

/// Product jars that are not third-party dependencies
const EXCLUDED_JARS: [&str; 5] = [
    "*ui.jar",
    "*platform_*",
    "*xapi.jar",
    "*yfscommon*icons*",
    "*yfscommon*y*",
];

pub const REPORT_FILE: &str = "dependency_report.html";

pub struct DepcheckUseCase;

impl DepcheckUseCase {
    /// Run the dependency check; returns the HTML report path
    pub async fn execute(ctx: &AppContext, layout: &ReportLayout) -> Result<PathBuf> {
        timed("depcheck", async {
            let result = Self::run(ctx, layout).await;

            let container = shell_quote(&ctx.config.docker.depcheck_container);
            ctx.runner
                .run_quiet(&format!("docker rm -f {} 2> /dev/null", container))
                .await;
            ctx.runner.run_quiet("docker volume prune -f 2> /dev/null").await;
            result
        })
        .await
    }

    async fn run(ctx: &AppContext, layout: &ReportLayout) -> Result<PathBuf> {
        let image = ImageResolver::new(&ctx.http, &ctx.config.images, &ctx.secrets)
            .latest_image()
            .await?;

        let docker = ctx.docker();
        if let Err(e) = docker.start_depcheck_container(&image).await {
            tracing::warn!("Depcheck container did not start cleanly: {:#}", e);
        }

        let container = &ctx.config.docker.depcheck_container;
        let tmp = tempfile::Builder::new()
            .prefix("depcheck")
            .tempdir_in(&ctx.working_dir)
            .context("Failed to create the depcheck work directory")?;

        tracing::info!("Getting jars to scan...");
        ctx.runner
            .run(&collect_jars_command(container))
            .await
            .context("Failed to collect the third-party jars")?;

        tracing::info!("Copying 3rd party jars to tempdir...");
        ctx.runner
            .run(&format!(
                "docker cp {}:{}/{}/ {}/",
                shell_quote(container),
                DROPINS_DIR,
                THIRD_PARTY_JARS,
                shell_quote(&tmp.path().to_string_lossy())
            ))
            .await
            .context("Failed to copy the third-party jars")?;

        tracing::info!("Download the latest depcheck...");
        let tool = download_tool(ctx, tmp.path()).await?;

        tracing::info!("Running the scan...");
        let dir = layout.ensure_dated_dir(ReportKind::Depcheck)?;
        let report = dir.join(REPORT_FILE);
        let suppressions = ctx.resolve(&ctx.config.depcheck.suppression_file);
        ctx.runner
            .run(&format!(
                "{} -s {} -o {} --suppression {}",
                shell_quote(&tool.to_string_lossy()),
                shell_quote(&tmp.path().join(THIRD_PARTY_JARS).to_string_lossy()),
                shell_quote(&report.to_string_lossy()),
                shell_quote(&suppressions.to_string_lossy())
            ))
            .await
            .context("Dependency check failed")?;

        layout.mirror_to_latest(ReportKind::Depcheck)?;

        let url = format!(
            "{}/{}",
            ctx.config.artifactory.owasp_url.trim_end_matches('/'),
            layout.stamp().timestamp
        );
        match upload_dir(&ctx.http, &ctx.secrets, &dir, &url).await {
            Ok(count) => tracing::info!("Uploaded {} depcheck file(s)", count),
            Err(e) => tracing::warn!("Artifactory upload of the depcheck report failed: {:#}", e),
        }

        docker.cleanup_runtime_container(container).await;
        Ok(report)
    }
}

/// `docker exec` line copying every third-party jar of the EAR into the dropins jar folder
pub fn collect_jars_command(container: &str) -> String {
    let excludes: String = EXCLUDED_JARS
        .iter()
        .map(|p| format!(" -not -path \"{}\"", p))
        .collect();
    let script = format!(
        "cd {dropins}/smcfs.ear/ && mkdir -p ../{jars} && rm -rf ../{jars}/* && \
         for file in $(find ./*/ -type f -name \"*.jar\"{excludes}); do cp -vf $file {dropins}/{jars}/; done",
        dropins = DROPINS_DIR,
        jars = THIRD_PARTY_JARS,
    );
    format!("docker exec {} bash -lc {}", shell_quote(container), shell_quote(&script))
}

/// Fetch and unpack the latest dependency-check release; returns its launcher script
async fn download_tool(ctx: &AppContext, dir: &Path) -> Result<PathBuf> {
    let config = &ctx.config.depcheck;
    tracing::info!("Downloading updated dependency check tool...");

    let release = fetch_bytes(&ctx.http, &config.release_api_url, None).await?;
    let release: serde_json::Value =
        serde_json::from_slice(&release).context("Release response is not JSON")?;
    let version = release
        .get("tag_name")
        .and_then(|t| t.as_str())
        .map(|t| t.trim_start_matches('v').to_string())
        .ok_or_else(|| anyhow!("No tag_name in {}", config.release_api_url))?;
    tracing::info!("Dependency check version {}", version);

    let url = config.download_url.replace("{version}", &version);
    let archive = fetch_bytes(&ctx.http, &url, None).await?;
    zip::ZipArchive::new(Cursor::new(archive))
        .context("Dependency check release is not a zip")?
        .extract(dir)
        .context("Failed to unpack the dependency check release")?;

    let script = dir.join("dependency-check/bin/dependency-check.sh");
    make_executable(&script)?;
    Ok(script)
}

#[cfg(unix)]
fn make_executable(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;

    let mut permissions = std::fs::metadata(path)
        .with_context(|| format!("{:?} missing from the release", path))?
        .permissions();
    permissions.set_mode(permissions.mode() | 0o755);
    std::fs::set_permissions(path, permissions)
        .with_context(|| format!("Failed to chmod {:?}", path))
}

#[cfg(not(unix))]
fn make_executable(path: &Path) -> Result<()> {
    anyhow::ensure!(path.exists(), "{:?} missing from the release", path);
    Ok(())
}
