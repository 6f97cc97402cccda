//! Configuration - TOML settings for the automator
//!
//! Every section has defaults, so a missing file is not an error. Secrets are
//! not stored here; see [`crate::settings`].

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::constants::DEFAULT_ASOC_ENDPOINT;

/// Top-level configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub asoc: AsocConfig,
    pub polling: PollingConfig,
    pub static_scan: StaticScanConfig,
    pub dynamic_scan: DynamicScanConfig,
    pub docker: DockerConfig,
    pub images: ImagesConfig,
    pub artifactory: ArtifactoryConfig,
    pub depcheck: DepcheckConfig,
}

/// Vendor endpoint and application ids
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AsocConfig {
    pub endpoint: String,
    /// Application holding the static scans
    pub static_app_id: String,
    /// Application holding the dynamic scans
    pub dynamic_app_id: String,
    /// Locale sent with scan creation
    pub scan_locale: String,
    /// Locale sent with report generation
    pub report_locale: String,
}

impl Default for AsocConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ASOC_ENDPOINT.to_string(),
            static_app_id: "14ad3e4d-8c6e-4e1a-a092-1249ef2b5d74".to_string(),
            dynamic_app_id: "fc449ae1-8742-49e9-a06b-fe37988ca2a8".to_string(),
            scan_locale: "en".to_string(),
            report_locale: "en-US".to_string(),
        }
    }
}

/// Intervals and retry budgets
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PollingConfig {
    pub report_interval_secs: u64,
    pub upload_max_tries: u32,
    pub static_workers: usize,
    pub submission_stagger_secs: u64,
    pub deployment_probe_secs: u64,
    pub deployment_probe_timeout_secs: u64,
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            report_interval_secs: 120,
            upload_max_tries: 5,
            static_workers: 3,
            submission_stagger_secs: 5,
            deployment_probe_secs: 10,
            deployment_probe_timeout_secs: 20,
        }
    }
}

/// A project built from a downloaded artifact rather than the source tree
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtifactProject {
    /// Scan name, also used for the IRX file name
    pub name: String,
    /// Sub directory of the temp dir the artifact lands in
    pub dir: String,
    pub url: String,
    pub file_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StaticScanConfig {
    pub projects_file: PathBuf,
    pub config_template: PathBuf,
    pub operator_config_template: PathBuf,
    pub operator_project_name: String,
    /// Command used to package a project into an IRX archive
    pub prepare_command: String,
    pub artifact_projects: Vec<ArtifactProject>,
}

impl Default for StaticScanConfig {
    fn default() -> Self {
        let jenkins = "https://wce-sterling-team-oms-jenkins.swg-devops.com/job";
        Self {
            projects_file: PathBuf::from("projects.list"),
            config_template: PathBuf::from("appscan-config.xml"),
            operator_config_template: PathBuf::from("appscan-config-op.xml"),
            operator_project_name: "ibm-oms-operator".to_string(),
            prepare_command: "source ~/.bashrc && appscan.sh prepare".to_string(),
            artifact_projects: vec![
                ArtifactProject {
                    name: "sba".to_string(),
                    dir: "SBA".to_string(),
                    url: format!("{jenkins}/SBA/lastSuccessfulBuild/artifact/SBA.jar"),
                    file_name: "SBA.jar".to_string(),
                },
                ArtifactProject {
                    name: "iac".to_string(),
                    dir: "IAC".to_string(),
                    url: format!("{jenkins}/IAC/lastSuccessfulBuild/artifact/IAC.jar"),
                    file_name: "IAC.jar".to_string(),
                },
            ],
        }
    }
}

/// A deployed application targeted by a dynamic scan
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TargetApp {
    pub name: String,
    /// Path on the deploy server, e.g. `/smcfs/console/login.jsp`
    pub path: String,
    pub user: String,
    pub password: String,
}

impl TargetApp {
    fn new(name: &str, path: &str, user: &str, password: &str) -> Self {
        Self {
            name: name.to_string(),
            path: path.to_string(),
            user: user.to_string(),
            password: password.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DynamicScanConfig {
    pub deploy_server: String,
    /// Path probed until the deployment answers 200
    pub readiness_path: String,
    pub app_configs_dir: PathBuf,
    pub targets: Vec<TargetApp>,
    pub thread_num: u32,
    /// Command that starts the ASoC presence agent; skipped when empty
    pub presence_command: String,
}

impl Default for DynamicScanConfig {
    fn default() -> Self {
        Self {
            deploy_server: "https://9.42.105.123:9443".to_string(),
            readiness_path: "/smcfs/console/login.jsp".to_string(),
            app_configs_dir: PathBuf::from("app_configs"),
            targets: vec![
                TargetApp::new("SMCFS", "/smcfs/console/login.jsp", "admin", "password"),
                TargetApp::new("SBC", "/sbc/sbc/login.do", "admin", "password"),
                TargetApp::new("SMA", "/sma/sma/container/home.do", "admin", "password"),
                TargetApp::new("ISCCS", "/isccs/isccs/login.do", "admin", "password"),
                TargetApp::new("WSC", "/wsc/wsc/login.do", "csmith", "csmith"),
            ],
            thread_num: 5,
            presence_command: String::new(),
        }
    }
}

impl DynamicScanConfig {
    pub fn target_url(&self, target: &TargetApp) -> String {
        format!("{}{}", self.deploy_server.trim_end_matches('/'), target.path)
    }

    pub fn readiness_url(&self) -> String {
        format!(
            "{}{}",
            self.deploy_server.trim_end_matches('/'),
            self.readiness_path
        )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DockerConfig {
    pub registry: String,
    pub runtime_container: String,
    pub depcheck_container: String,
    pub volume: String,
    /// Host ports published by the runtime container
    pub ports: Vec<u16>,
}

impl Default for DockerConfig {
    fn default() -> Self {
        Self {
            registry: "stg.icr.io".to_string(),
            runtime_container: "rt_scan".to_string(),
            depcheck_container: "depcheck_scan".to_string(),
            volume: "vol_scan".to_string(),
            ports: vec![9080, 9443],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ImagesConfig {
    /// Directory listing of the image security build, holding the twistlock report
    pub build_report_url: String,
    pub case_index_url: String,
    /// Base URL of the CASE archives, `{version}` is substituted
    pub case_archive_url: String,
    /// Path of the resources file inside the CASE archive
    pub case_resources_path: String,
    pub released_image_repo: String,
}

impl Default for ImagesConfig {
    fn default() -> Self {
        let case = "https://raw.githubusercontent.com/IBM/cloud-pak/master/repo/case/ibm-oms-ent-case";
        Self {
            build_report_url: "https://wce-sterling-team-oms-jenkins.swg-devops.com/job/OMS_CD_Development.TwistLock-Scan/lastSuccessfulBuild/artifact/tt_v1.5.0/linux_x86_64".to_string(),
            case_index_url: format!("{case}/index.yaml"),
            case_archive_url: format!("{case}/{{version}}/ibm-oms-ent-case-{{version}}.tgz"),
            case_resources_path: "ibmOmsEntProd/resources.yaml".to_string(),
            released_image_repo: "stg.icr.io/cp/ibm-oms-enterprise/om-app".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ArtifactoryConfig {
    pub appscan_url: String,
    pub owasp_url: String,
}

impl Default for ArtifactoryConfig {
    fn default() -> Self {
        let base = "https://na.artifactory.swg-devops.com:443/artifactory/wce-oms-onprem-dev-generic-local/Security_Scans";
        Self {
            appscan_url: format!("{base}/AppScan"),
            owasp_url: format!("{base}/OWASP"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DepcheckConfig {
    pub release_api_url: String,
    /// Download URL of a release zip, `{version}` is substituted
    pub download_url: String,
    pub suppression_file: PathBuf,
}

impl Default for DepcheckConfig {
    fn default() -> Self {
        Self {
            release_api_url:
                "https://api.github.com/repos/jeremylong/DependencyCheck/releases/latest"
                    .to_string(),
            download_url: "https://github.com/jeremylong/DependencyCheck/releases/download/v{version}/dependency-check-{version}-release.zip".to_string(),
            suppression_file: PathBuf::from("suppressions.xml"),
        }
    }
}

impl Config {
    /// Load configuration from an explicit file, the default search path, or defaults
    pub fn load(path: Option<&Path>) -> Result<Self> {
        if let Some(path) = path {
            return Self::from_file(path);
        }

        for candidate in Self::search_paths() {
            if candidate.is_file() {
                tracing::debug!("Loading configuration from {:?}", candidate);
                return Self::from_file(&candidate);
            }
        }

        tracing::debug!("No config file found, using defaults");
        Ok(Self::default())
    }

    fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read configuration from {:?}", path))?;
        toml::from_str(&content)
            .with_context(|| format!("Failed to parse configuration from {:?}", path))
    }

    /// Configuration search order, first existing file wins
    pub fn search_paths() -> Vec<PathBuf> {
        let mut paths = vec![
            PathBuf::from("automator.toml"),
            PathBuf::from(".automator.toml"),
        ];
        if let Some(dirs) = ProjectDirs::from("dev", "asoc", "asoc-automator") {
            paths.push(dirs.config_dir().join("config.toml"));
        }
        paths
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_workflow_constants() {
        let config = Config::default();
        assert_eq!(config.polling.report_interval_secs, 120);
        assert_eq!(config.polling.upload_max_tries, 5);
        assert_eq!(config.polling.static_workers, 3);
        assert_eq!(config.dynamic_scan.targets.len(), 5);
        assert_eq!(config.asoc.endpoint, DEFAULT_ASOC_ENDPOINT);
    }

    #[test]
    fn test_partial_file_keeps_defaults() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("automator.toml");
        std::fs::write(
            &path,
            "[polling]\nreport_interval_secs = 5\n\n[asoc]\nstatic_app_id = \"abc\"\n",
        )?;

        let config = Config::load(Some(&path))?;
        assert_eq!(config.polling.report_interval_secs, 5);
        assert_eq!(config.polling.upload_max_tries, 5);
        assert_eq!(config.asoc.static_app_id, "abc");
        assert_eq!(config.asoc.endpoint, DEFAULT_ASOC_ENDPOINT);
        Ok(())
    }

    #[test]
    fn test_invalid_file_is_an_error() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("broken.toml");
        std::fs::write(&path, "[polling\n")?;
        assert!(Config::load(Some(&path)).is_err());
        Ok(())
    }

    #[test]
    fn test_target_url_joins_server_and_path() {
        let mut config = DynamicScanConfig::default();
        config.deploy_server = "https://host:9443/".to_string();
        let wsc = config.targets.last().cloned().expect("default targets");
        assert_eq!(config.target_url(&wsc), "https://host:9443/wsc/wsc/login.do");
        assert_eq!(
            config.readiness_url(),
            "https://host:9443/smcfs/console/login.jsp"
        );
    }
}
