//! Docker helpers - runtime and dependency-check containers
//!
//! Containers are driven through the `docker` CLI via [`CommandRunner`]; the
//! deployment probe talks HTTPS to the runtime directly.

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::StatusCode;

use crate::config::DockerConfig;
use crate::process::{CommandRunner, shell_quote};
use crate::settings::{REGISTRY_TOKEN, REGISTRY_USER, Secrets};

/// How the deployment readiness probe behaves
#[derive(Debug, Clone)]
pub struct DeploymentProbe {
    pub url: String,
    pub interval: Duration,
    pub timeout: Duration,
}

pub struct Docker<'a> {
    runner: &'a dyn CommandRunner,
    config: &'a DockerConfig,
    secrets: &'a Secrets,
}

impl<'a> Docker<'a> {
    pub fn new(runner: &'a dyn CommandRunner, config: &'a DockerConfig, secrets: &'a Secrets) -> Self {
        Self {
            runner,
            config,
            secrets,
        }
    }

    pub async fn login(&self) -> Result<()> {
        tracing::info!("#### Login to {} ####", self.config.registry);
        let (user, token) = self.secrets.basic_auth(REGISTRY_USER, REGISTRY_TOKEN)?;
        self.runner
            .run(&format!(
                "printf '%s' {} | docker login -u {} --password-stdin {}",
                shell_quote(&token),
                shell_quote(&user),
                shell_quote(&self.config.registry)
            ))
            .await
            .context("Registry login failed")?;
        Ok(())
    }

    pub async fn logout(&self) {
        tracing::info!("#### Logout of {} ####", self.config.registry);
        self.runner
            .run_quiet(&format!("docker logout {}", shell_quote(&self.config.registry)))
            .await;
    }

    /// Start the runtime container with the rendered configs and wait until it serves
    pub async fn start_app_container(
        &self,
        image: &str,
        configs_dir: &Path,
        probe: &DeploymentProbe,
    ) -> Result<()> {
        let result = async {
            self.login().await?;
            let name = &self.config.runtime_container;
            self.runner
                .run_quiet(&format!("docker rm -f {}", shell_quote(name)))
                .await;

            let command = self.app_run_command(image, configs_dir);
            tracing::info!("#### STARTING RT CONTAINER: {} - {} ####", name, image);
            self.runner.run(&command).await?;
            wait_for_deployment(probe).await
        }
        .await;

        self.logout().await;
        result
    }

    fn app_run_command(&self, image: &str, configs_dir: &Path) -> String {
        let configs = configs_dir.to_string_lossy();
        let mounts = [
            (format!("{configs}/jvm.options"), "/config/jvm.options"),
            (format!("{configs}/server.xml.updated"), "/config/server.xml"),
            (
                format!("{configs}/system_overrides.properties.updated"),
                "/config/dropins/smcfs.ear/properties.jar/system_overrides.properties",
            ),
        ];

        let mut command = format!(
            "docker run -dit --name {}",
            shell_quote(&self.config.runtime_container)
        );
        for (host, container) in &mounts {
            command.push_str(&format!(" -v {}", shell_quote(&format!("{host}:{container}"))));
        }
        for port in &self.config.ports {
            command.push_str(&format!(" -p {port}:{port}"));
        }
        command.push(' ');
        command.push_str(&shell_quote(image));
        command
    }

    /// Start the container the third-party jars are collected from
    pub async fn start_depcheck_container(&self, image: &str) -> Result<()> {
        let result = async {
            self.login().await?;
            let name = &self.config.depcheck_container;
            tracing::info!("#### STARTING RT CONTAINER: {} - {} ####", name, image);
            self.runner
                .run(&format!(
                    "docker run -dit -e LICENSE=accept -e LANG --privileged -v {}:/images --name {} {}",
                    shell_quote(&self.config.volume),
                    shell_quote(name),
                    shell_quote(image)
                ))
                .await?;
            Ok(())
        }
        .await;

        self.logout().await;
        result
    }

    /// Image a container was started from, `None` when the container does not exist
    pub async fn image_of(&self, container: &str) -> Option<String> {
        match self
            .runner
            .run(&format!(
                "docker inspect --format='{{{{.Config.Image}}}}' {}",
                shell_quote(container)
            ))
            .await
        {
            Ok(output) => {
                let image = output.stdout.trim();
                (!image.is_empty()).then(|| image.to_string())
            }
            Err(_) => {
                tracing::warn!("Container {} does not exist", container);
                None
            }
        }
    }

    /// Remove a container, its image unless the sibling container shares it, and unused volumes
    pub async fn cleanup_runtime_container(&self, container: &str) {
        let image = self.image_of(container).await;
        let sibling = if container == self.config.depcheck_container {
            &self.config.runtime_container
        } else {
            &self.config.depcheck_container
        };
        let sibling_image = self.image_of(sibling).await;

        tracing::info!("Removing container {}", container);
        self.runner
            .run_quiet(&format!("docker rm -f {}", shell_quote(container)))
            .await;

        if let Some(image) = image.filter(|i| Some(i) != sibling_image.as_ref()) {
            tracing::info!("Trying to remove image {}", image);
            self.runner
                .run_quiet(&format!("docker rmi {}", shell_quote(&image)))
                .await;
        }

        tracing::info!("Removing un-used volumes");
        self.runner.run_quiet("docker volume prune -f").await;
    }

    /// Best-effort teardown of everything the automator may have started
    pub async fn cleanup(&self) {
        for container in [&self.config.runtime_container, &self.config.depcheck_container] {
            self.runner
                .run_quiet(&format!("docker rm -f {} 2> /dev/null", shell_quote(container)))
                .await;
        }
        self.runner
            .run_quiet("docker network prune -f 2> /dev/null && docker volume prune -f 2> /dev/null")
            .await;
    }
}

/// Poll the deployment until it answers 200; certificate errors are ignored
pub async fn wait_for_deployment(probe: &DeploymentProbe) -> Result<()> {
    let client = reqwest::Client::builder()
        .danger_accept_invalid_certs(true)
        .timeout(probe.timeout)
        .build()
        .context("Failed to create probe client")?;

    tracing::info!("Waiting for deployment at {}", probe.url);
    loop {
        match client.get(&probe.url).send().await {
            Ok(res) if res.status() == StatusCode::OK => break,
            Ok(res) => tracing::debug!("Deployment answered {}", res.status()),
            Err(e) => tracing::debug!("Deployment not reachable: {}", e),
        }
        tokio::time::sleep(probe.interval).await;
    }
    tracing::info!("Deployment is up");
    Ok(())
}
