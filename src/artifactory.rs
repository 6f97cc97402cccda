//! Artifactory upload of report directories

use std::path::Path;

use anyhow::{Context, Result, bail};
use reqwest::Client;

use crate::report_files::list_files;
use crate::settings::{ARTF_TOKEN, ARTF_USER, Secrets};

/// `PUT` every regular file of `dir` to `<base_url>/<file name>`; returns the uploaded count
pub async fn upload_dir(
    client: &Client,
    secrets: &Secrets,
    dir: &Path,
    base_url: &str,
) -> Result<usize> {
    let (user, token) = secrets.basic_auth(ARTF_USER, ARTF_TOKEN)?;
    let base_url = base_url.trim_end_matches('/');

    let mut uploaded = 0;
    for file in list_files(dir)? {
        let Some(name) = file.file_name().map(|n| n.to_string_lossy().to_string()) else {
            continue;
        };
        let body = tokio::fs::read(&file)
            .await
            .with_context(|| format!("Failed to read {:?}", file))?;
        let url = format!("{}/{}", base_url, name);

        let response = client
            .put(&url)
            .basic_auth(&user, Some(&token))
            .body(body)
            .send()
            .await
            .with_context(|| format!("Failed to upload {}", name))?;
        if !response.status().is_success() {
            bail!("Upload of {} to {} returned {}", name, url, response.status());
        }
        tracing::info!("Uploaded {} to {}", name, url);
        uploaded += 1;
    }
    Ok(uploaded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_string, header_exists, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn artifactory_secrets() -> Secrets {
        Secrets::from_lookup(|key| match key {
            ARTF_USER => Some("u".to_string()),
            ARTF_TOKEN => Some("t".to_string()),
            _ => None,
        })
    }

    #[tokio::test]
    async fn test_upload_dir_puts_each_file() -> Result<()> {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/AppScan/210817_0905/static/a.html"))
            .and(header_exists("Authorization"))
            .and(body_string("report"))
            .respond_with(ResponseTemplate::new(201))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("PUT"))
            .and(path("/AppScan/210817_0905/static/b.pdf"))
            .respond_with(ResponseTemplate::new(201))
            .expect(1)
            .mount(&server)
            .await;

        let dir = tempfile::tempdir()?;
        std::fs::write(dir.path().join("a.html"), "report")?;
        std::fs::write(dir.path().join("b.pdf"), "pdf")?;
        std::fs::create_dir(dir.path().join("skipped"))?;

        let count = upload_dir(
            &Client::new(),
            &artifactory_secrets(),
            dir.path(),
            &format!("{}/AppScan/210817_0905/static/", server.uri()),
        )
        .await?;
        assert_eq!(count, 2);
        Ok(())
    }

    #[tokio::test]
    async fn test_upload_requires_credentials() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let err = upload_dir(&Client::new(), &Secrets::default(), dir.path(), "http://x")
            .await
            .unwrap_err();
        assert!(err.to_string().contains(ARTF_USER));
        Ok(())
    }
}
