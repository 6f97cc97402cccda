//! Download helpers - streamed artifact downloads with progress
//!
//! Used for the extra scan artifacts (jars), the CASE archive and the
//! dependency-check release.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, bail};
use futures::StreamExt;
use reqwest::Client;
use tokio::io::AsyncWriteExt;

use crate::constants::{DEFAULT_CONNECT_TIMEOUT_SECS, DEFAULT_TIMEOUT_SECS, USER_AGENT};
use crate::output::ProgressIndicator;

/// Plain HTTP client for non-vendor endpoints
pub fn http_client() -> Result<Client> {
    Client::builder()
        .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
        .connect_timeout(Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS))
        .user_agent(USER_AGENT)
        .build()
        .context("Failed to create HTTP client")
}

/// Stream `url` into `dir/file_name`, returning the written path
pub async fn download_to(
    client: &Client,
    url: &str,
    auth: Option<&(String, String)>,
    dir: &Path,
    file_name: &str,
    show_progress: bool,
) -> Result<PathBuf> {
    tokio::fs::create_dir_all(dir)
        .await
        .with_context(|| format!("Failed to create {:?}", dir))?;
    let target = dir.join(file_name);

    let mut request = client.get(url);
    if let Some((user, token)) = auth {
        request = request.basic_auth(user, Some(token));
    }
    let response = request
        .send()
        .await
        .with_context(|| format!("Failed to request {}", url))?;

    tracing::info!("Download {} returned {}", file_name, response.status());
    if !response.status().is_success() {
        bail!("Download of {} failed with {}", url, response.status());
    }

    let progress = show_progress.then(|| match response.content_length() {
        Some(len) => ProgressIndicator::bar(len, &format!("Downloading {}", file_name)),
        None => ProgressIndicator::spinner(&format!("Downloading {}", file_name)),
    });

    let mut file = tokio::fs::File::create(&target)
        .await
        .with_context(|| format!("Failed to create {:?}", target))?;
    let mut stream = response.bytes_stream();
    while let Some(chunk) = stream.next().await {
        let chunk = chunk.with_context(|| format!("Download of {} interrupted", url))?;
        file.write_all(&chunk).await?;
        if let Some(p) = &progress {
            p.inc(chunk.len() as u64);
        }
    }
    file.flush().await?;

    if let Some(p) = progress {
        p.finish_and_clear();
    }
    Ok(target)
}

/// Fetch a URL into memory
pub async fn fetch_bytes(
    client: &Client,
    url: &str,
    auth: Option<&(String, String)>,
) -> Result<Vec<u8>> {
    let mut request = client.get(url);
    if let Some((user, token)) = auth {
        request = request.basic_auth(user, Some(token));
    }
    let response = request
        .send()
        .await
        .with_context(|| format!("Failed to request {}", url))?;
    if !response.status().is_success() {
        bail!("GET {} returned {}", url, response.status());
    }
    Ok(response.bytes().await?.to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header_exists, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_download_writes_file_with_auth() -> Result<()> {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/artifact/SBA.jar"))
            .and(header_exists("Authorization"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"jar-bytes".to_vec()))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir()?;
        let auth = ("user".to_string(), "token".to_string());
        let path = download_to(
            &http_client()?,
            &format!("{}/artifact/SBA.jar", server.uri()),
            Some(&auth),
            &dir.path().join("SBA"),
            "SBA.jar",
            false,
        )
        .await?;

        assert_eq!(std::fs::read(path)?, b"jar-bytes");
        Ok(())
    }

    #[tokio::test]
    async fn test_download_fails_on_error_status() -> Result<()> {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir()?;
        let result = download_to(
            &http_client()?,
            &format!("{}/missing", server.uri()),
            None,
            dir.path(),
            "missing.jar",
            false,
        )
        .await;
        assert!(result.is_err());
        assert!(!dir.path().join("missing.jar").exists());
        Ok(())
    }
}
