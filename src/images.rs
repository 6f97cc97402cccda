//! Image resolution - which runtime image to scan
//!
//! The newest image comes from the twistlock report of the image security
//! build. When that report names no app image, the tag of the latest released
//! CASE bundle is used instead.

use std::io::{Cursor, Read};

use anyhow::{Context, Result, anyhow};
use flate2::read::GzDecoder;
use regex::Regex;
use reqwest::Client;

use crate::config::ImagesConfig;
use crate::download::fetch_bytes;
use crate::settings::{JENKINS_TOKEN, JENKINS_USER, Secrets};

pub struct ImageResolver<'a> {
    client: &'a Client,
    config: &'a ImagesConfig,
    secrets: &'a Secrets,
}

impl<'a> ImageResolver<'a> {
    pub fn new(client: &'a Client, config: &'a ImagesConfig, secrets: &'a Secrets) -> Self {
        Self {
            client,
            config,
            secrets,
        }
    }

    /// Newest built app image, falling back to the latest released one
    pub async fn latest_image(&self) -> Result<String> {
        match self.latest_built_image().await {
            Ok(Some(image)) => {
                tracing::info!("Latest built image: {}", image);
                return Ok(image);
            }
            Ok(None) => tracing::warn!("No app image in the twistlock report"),
            Err(e) => tracing::warn!("Could not read the twistlock report: {:#}", e),
        }
        let image = self.latest_released_image().await?;
        tracing::info!("Latest released image: {}", image);
        Ok(image)
    }

    async fn latest_built_image(&self) -> Result<Option<String>> {
        let auth = self.secrets.basic_auth(JENKINS_USER, JENKINS_TOKEN)?;
        let base = self.config.build_report_url.trim_end_matches('/');

        let listing = fetch_bytes(self.client, base, Some(&auth)).await?;
        let listing = String::from_utf8_lossy(&listing);
        let report_name = twistlock_report_name(&listing)
            .ok_or_else(|| anyhow!("No twistlock report linked from {}", base))?;

        let report = fetch_bytes(self.client, &format!("{}/{}", base, report_name), Some(&auth))
            .await?;
        let report: serde_json::Value =
            serde_json::from_slice(&report).context("Twistlock report is not JSON")?;
        Ok(app_image_from_report(&report))
    }

    async fn latest_released_image(&self) -> Result<String> {
        let index = fetch_bytes(self.client, &self.config.case_index_url, None).await?;
        let version = case_latest_version(&index)?;
        tracing::info!("Latest CASE version: {}", version);

        let url = self.config.case_archive_url.replace("{version}", &version);
        let archive = fetch_bytes(self.client, &url, None).await?;
        let tag = image_tag_from_case(&archive, &self.config.case_resources_path)?;
        Ok(format!("{}:{}", self.config.released_image_repo, tag))
    }
}

/// File name of the first `twistlock*.json` link in a directory listing
pub fn twistlock_report_name(listing: &str) -> Option<String> {
    let re = Regex::new(r#"href="(twistlock[^"/]*\.json)""#).ok()?;
    re.captures(listing)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
}

/// First scanned image whose name contains `app`
pub fn app_image_from_report(report: &serde_json::Value) -> Option<String> {
    report
        .pointer("/overview/images/resultsIncluded/noScanErrors/list")?
        .as_array()?
        .iter()
        .filter_map(|img| img.as_str())
        .find(|img| img.contains("app"))
        .map(str::to_string)
}

pub fn case_latest_version(index_yaml: &[u8]) -> Result<String> {
    let index: serde_yaml::Value =
        serde_yaml::from_slice(index_yaml).context("CASE index is not valid YAML")?;
    match index.get("latestVersion") {
        Some(serde_yaml::Value::String(v)) => Ok(v.clone()),
        Some(serde_yaml::Value::Number(n)) => Ok(n.to_string()),
        _ => Err(anyhow!("CASE index has no latestVersion")),
    }
}

/// Read the first container image tag from the resources file of a CASE `.tgz`
pub fn image_tag_from_case(archive: &[u8], resources_path: &str) -> Result<String> {
    let mut tar = tar::Archive::new(GzDecoder::new(Cursor::new(archive)));
    for entry in tar.entries().context("CASE archive is not a tgz")? {
        let mut entry = entry?;
        let path = entry.path()?.to_string_lossy().to_string();
        if !path.contains(resources_path) {
            continue;
        }

        let mut content = Vec::new();
        entry.read_to_end(&mut content)?;
        let resources: serde_yaml::Value =
            serde_yaml::from_slice(&content).context("resources.yaml is not valid YAML")?;
        return resources
            .get("resources")
            .and_then(|r| r.get("resourceDefs"))
            .and_then(|r| r.get("containerImages"))
            .and_then(|r| r.get(0))
            .and_then(|r| r.get("tag"))
            .and_then(|t| t.as_str())
            .map(str::to_string)
            .ok_or_else(|| anyhow!("No container image tag in {}", path));
    }
    Err(anyhow!("{} not found in CASE archive", resources_path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::Secrets;
    use flate2::Compression;
    use flate2::write::GzEncoder;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const RESOURCES: &str = "resources:\n  resourceDefs:\n    containerImages:\n      - tag: 10.0.2109.0-amd64\n        image: om-app\n";

    fn case_tgz() -> Vec<u8> {
        let mut builder = tar::Builder::new(GzEncoder::new(Vec::new(), Compression::default()));
        let mut header = tar::Header::new_gnu();
        header.set_size(RESOURCES.len() as u64);
        header.set_mode(0o644);
        header.set_cksum();
        builder
            .append_data(
                &mut header,
                "ibm-oms-ent-case/inventory/ibmOmsEntProd/resources.yaml",
                RESOURCES.as_bytes(),
            )
            .expect("append");
        builder
            .into_inner()
            .expect("tar")
            .finish()
            .expect("gzip")
    }

    fn jenkins_secrets() -> Secrets {
        Secrets::from_lookup(|key| match key {
            JENKINS_USER => Some("bot".to_string()),
            JENKINS_TOKEN => Some("t".to_string()),
            _ => None,
        })
    }

    #[test]
    fn test_twistlock_report_name() {
        let html = r#"<a href="../">..</a><a href="scan.log">scan.log</a>
            <a href="twistlock_210817.json">twistlock_210817.json</a>"#;
        assert_eq!(
            twistlock_report_name(html).as_deref(),
            Some("twistlock_210817.json")
        );
        assert_eq!(twistlock_report_name("<a href=\"x.json\">x</a>"), None);
    }

    #[test]
    fn test_app_image_from_report() {
        let report = serde_json::json!({"overview": {"images": {"resultsIncluded": {
            "noScanErrors": {"list": ["reg/om-base:1", "reg/om-app:2", "reg/om-app:3"]}
        }}}});
        assert_eq!(app_image_from_report(&report).as_deref(), Some("reg/om-app:2"));
        assert_eq!(app_image_from_report(&serde_json::json!({})), None);
    }

    #[test]
    fn test_image_tag_from_case() -> Result<()> {
        let tag = image_tag_from_case(&case_tgz(), "ibmOmsEntProd/resources.yaml")?;
        assert_eq!(tag, "10.0.2109.0-amd64");
        assert!(image_tag_from_case(&case_tgz(), "other/resources.yaml").is_err());
        Ok(())
    }

    #[tokio::test]
    async fn test_latest_image_prefers_twistlock_report() -> Result<()> {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/build"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(r#"<a href="twistlock_1.json">twistlock_1.json</a>"#),
            )
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/build/twistlock_1.json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "overview": {"images": {"resultsIncluded": {"noScanErrors": {"list": ["reg/om-app:built"]}}}}
            })))
            .mount(&server)
            .await;

        let config = ImagesConfig {
            build_report_url: format!("{}/build", server.uri()),
            ..ImagesConfig::default()
        };
        let client = Client::new();
        let secrets = jenkins_secrets();
        let image = ImageResolver::new(&client, &config, &secrets)
            .latest_image()
            .await?;
        assert_eq!(image, "reg/om-app:built");
        Ok(())
    }

    #[tokio::test]
    async fn test_latest_image_falls_back_to_case() -> Result<()> {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/build"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/case/index.yaml"))
            .respond_with(ResponseTemplate::new(200).set_body_string("latestVersion: 1.0.5\n"))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/case/1.0.5/case-1.0.5.tgz"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(case_tgz()))
            .mount(&server)
            .await;

        let config = ImagesConfig {
            build_report_url: format!("{}/build", server.uri()),
            case_index_url: format!("{}/case/index.yaml", server.uri()),
            case_archive_url: format!("{}/case/{{version}}/case-{{version}}.tgz", server.uri()),
            ..ImagesConfig::default()
        };
        let client = Client::new();
        let secrets = jenkins_secrets();
        let image = ImageResolver::new(&client, &config, &secrets)
            .latest_image()
            .await?;
        assert_eq!(
            image,
            "stg.icr.io/cp/ibm-oms-enterprise/om-app:10.0.2109.0-amd64"
        );
        Ok(())
    }
}
