//! App Context - services shared by every command
//!
//! Built once per run from the parsed flags: configuration, secrets, the vendor
//! client, the shell runner and the run stamp used for report paths.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result, anyhow};

use crate::Cli;
use crate::api_client::{ApiKey, AsocClient};
use crate::config::Config;
use crate::docker::{DeploymentProbe, Docker};
use crate::download::http_client;
use crate::output::OutputWriter;
use crate::process::{CommandRunner, ShellRunner};
use crate::report_files::{ReportLayout, RunStamp};
use crate::settings::{KEY_ID, KEY_SECRET, Secrets};

pub struct AppContext {
    pub config: Arc<Config>,

    pub secrets: Secrets,

    /// Output writer for user-facing summaries
    pub output: OutputWriter,

    pub runner: Arc<dyn CommandRunner>,

    /// Client for non-vendor downloads (Jenkins, GitHub, Artifactory)
    pub http: reqwest::Client,

    /// Directory holding the templates, app configs and project list
    pub working_dir: PathBuf,

    pub stamp: RunStamp,

    /// `None` when the API key is not configured
    asoc: Option<AsocClient>,
}

impl AppContext {
    /// Create the context from parsed CLI arguments
    pub fn new(cli: &Cli) -> Result<Self> {
        let config = Config::load(cli.config.as_deref())?;
        let secrets = Secrets::load(cli.env_file.as_deref());
        let working_dir =
            std::env::current_dir().context("Failed to determine current working directory")?;

        Self::from_parts(
            config,
            secrets,
            Arc::new(ShellRunner::new()),
            OutputWriter::new(cli.format, cli.quiet),
            working_dir,
            RunStamp::now(),
        )
    }

    pub fn from_parts(
        config: Config,
        secrets: Secrets,
        runner: Arc<dyn CommandRunner>,
        output: OutputWriter,
        working_dir: PathBuf,
        stamp: RunStamp,
    ) -> Result<Self> {
        let asoc = match (secrets.get(KEY_ID), secrets.get(KEY_SECRET)) {
            (Some(key_id), Some(key_secret)) => Some(AsocClient::new(
                config.asoc.endpoint.clone(),
                ApiKey {
                    key_id: key_id.to_string(),
                    key_secret: key_secret.to_string(),
                },
            )?),
            _ => None,
        };

        tracing::debug!(
            "Run stamp {} / {}, working dir {:?}",
            stamp.date_str,
            stamp.timestamp,
            working_dir
        );

        Ok(Self {
            config: Arc::new(config),
            secrets,
            output,
            runner,
            http: http_client()?,
            working_dir,
            stamp,
            asoc,
        })
    }

    /// The vendor client; fails when `KEY_ID`/`KEY_SECRET` are not set
    pub fn asoc(&self) -> Result<&AsocClient> {
        self.asoc
            .as_ref()
            .ok_or_else(|| anyhow!("{} and {} must be set to reach ASoC", KEY_ID, KEY_SECRET))
    }

    pub fn docker(&self) -> Docker<'_> {
        Docker::new(self.runner.as_ref(), &self.config.docker, &self.secrets)
    }

    pub fn deployment_probe(&self) -> DeploymentProbe {
        let polling = &self.config.polling;
        DeploymentProbe {
            url: self.config.dynamic_scan.readiness_url(),
            interval: std::time::Duration::from_secs(polling.deployment_probe_secs),
            timeout: std::time::Duration::from_secs(polling.deployment_probe_timeout_secs),
        }
    }

    /// Report tree rooted at `output`, relative paths resolved against the working dir
    pub fn report_layout(&self, output: &Path) -> ReportLayout {
        ReportLayout::new(&self.resolve(output), self.stamp.clone())
    }

    /// Resolve a configured path against the working directory
    pub fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.working_dir.join(path)
        }
    }
}

#[cfg(test)]
pub mod testing {
    //! Context builder for workflow tests

    use super::*;
    use crate::output::OutputFormat;
    use crate::process::testing::RecordingRunner;

    pub fn stamp() -> RunStamp {
        RunStamp {
            date_str: "2021_08_week_3".to_string(),
            timestamp: "210817_0905".to_string(),
        }
    }

    pub fn secrets(pairs: &[(&str, &str)]) -> Secrets {
        let mut all = vec![(KEY_ID, "id"), (KEY_SECRET, "secret")];
        all.extend_from_slice(pairs);
        Secrets::from_lookup(|key| {
            all.iter()
                .find(|(k, _)| *k == key)
                .map(|(_, v)| v.to_string())
        })
    }

    pub fn context(
        config: Config,
        secrets: Secrets,
        runner: Arc<RecordingRunner>,
        working_dir: &Path,
    ) -> AppContext {
        AppContext::from_parts(
            config,
            secrets,
            runner,
            OutputWriter::new(OutputFormat::Table, true),
            working_dir.to_path_buf(),
            stamp(),
        )
        .expect("context")
    }
}
