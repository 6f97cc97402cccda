//! API Client - HTTP client for the ASoC REST API
//!
//! Covers the parts of the vendor API the automator drives:
//! - API key login and bearer token refresh
//! - Scan listing, deletion and creation (static and dynamic)
//! - IRX file upload
//! - Report generation, status polling and download
//! - Issue export

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use reqwest::{Client, RequestBuilder, StatusCode, multipart};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::constants::{
    DEFAULT_CONNECT_TIMEOUT_SECS, DEFAULT_TIMEOUT_SECS, FULL_EXPORT_TIMEOUT_SECS,
    OPEN_ISSUES_FILTER, PENDING_STATUSES, READY_STATUS, UPLOAD_FIELD, UPLOAD_TIMEOUT_SECS, USER_AGENT,
};

/// API key pair used to obtain bearer tokens
#[derive(Clone)]
pub struct ApiKey {
    pub key_id: String,
    pub key_secret: String,
}

/// API client for the ASoC service
///
/// Cloning is cheap and clones share the bearer token, so a refresh done by
/// one static-scan worker is seen by the others.
#[derive(Clone)]
pub struct AsocClient {
    client: Client,
    base_url: String,
    api_key: ApiKey,
    token: Arc<RwLock<Option<String>>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct LoginRequest<'a> {
    key_id: &'a str,
    key_secret: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct LoginResponse {
    token: String,
}

/// Latest execution of a scan
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Execution {
    #[serde(default)]
    pub status: String,
}

/// A scan as listed under an application
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Scan {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub app_name: Option<String>,
    #[serde(default)]
    pub latest_execution: Option<Execution>,
}

impl Scan {
    pub fn status(&self) -> &str {
        self.latest_execution
            .as_ref()
            .map(|e| e.status.as_str())
            .unwrap_or("")
    }

    pub fn is_pending(&self) -> bool {
        is_pending_status(self.status())
    }

    pub fn is_ready(&self) -> bool {
        self.status() == READY_STATUS
    }
}

/// Whether a latest-execution status means the scan is still in flight
pub fn is_pending_status(status: &str) -> bool {
    PENDING_STATUSES.contains(&status)
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct FileUploadResponse {
    file_id: String,
}

/// Result of an IRX upload attempt
#[derive(Debug)]
pub enum UploadOutcome {
    /// Upload accepted, carries the vendor file id
    Uploaded(String),
    /// 400, body kept for the log
    Rejected(String),
    /// 401, the bearer token expired
    Unauthorized,
    Failed(StatusCode),
}

/// Result of a scan creation call
#[derive(Debug)]
pub enum CreateOutcome {
    Created(serde_json::Value),
    Unauthorized,
    Failed(StatusCode, String),
}

/// Payload for `POST /Scans/StaticAnalyzer`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct StaticScanRequest {
    #[serde(rename = "ARSAFileId")]
    pub arsa_file_id: String,
    pub scan_name: String,
    pub app_id: String,
    pub locale: String,
    pub execute: bool,
    pub personal: bool,
}

/// Payload for `POST /Scans/DynamicAnalyzer`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct DynamicScanRequest {
    pub scan_type: String,
    pub presence_id: Option<String>,
    pub include_verified_domains: bool,
    pub starting_url: String,
    pub login_user: String,
    pub login_password: String,
    pub extra_field: String,
    pub http_auth_user_name: String,
    pub http_auth_password: String,
    pub only_full_results: bool,
    pub test_optimization_level: String,
    pub thread_num: u32,
    pub scan_name: String,
    pub enable_mail_notification: bool,
    pub locale: String,
    pub app_id: String,
    pub execute: bool,
    pub personal: bool,
    pub use_automatic_timeout: bool,
    pub fully_automatic: bool,
}

/// Body of a report generation request
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct ReportRequest {
    pub configuration: ReportConfiguration,
}

/// Report content switches; the vendor expects string booleans here
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct ReportConfiguration {
    pub summary: String,
    pub details: String,
    pub discussion: String,
    pub overview: String,
    pub table_of_content: String,
    pub advisories: String,
    pub fix_recommendation: String,
    pub history: String,
    pub coverage: String,
    pub is_trial_report: String,
    pub minimize_details: String,
    pub report_file_type: String,
    pub title: String,
    pub locale: String,
}

impl ReportRequest {
    /// Full report of the given type, titled after the scan or application name
    pub fn full(name: &str, file_type: &str, locale: &str) -> Self {
        let on = || "true".to_string();
        Self {
            configuration: ReportConfiguration {
                summary: on(),
                details: on(),
                discussion: on(),
                overview: on(),
                table_of_content: on(),
                advisories: on(),
                fix_recommendation: on(),
                history: on(),
                coverage: on(),
                is_trial_report: on(),
                minimize_details: on(),
                report_file_type: file_type.to_string(),
                title: name.replace(' ', "_").to_lowercase(),
                locale: locale.to_string(),
            },
        }
    }
}

/// A generated report
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Report {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub file_type: Option<String>,
}

impl Report {
    pub fn is_ready(&self) -> bool {
        self.status.as_deref() == Some(READY_STATUS)
    }
}

/// Error response from the vendor
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ErrorResponse {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    code: Option<String>,
}

impl AsocClient {
    /// Create a new API client
    pub fn new(base_url: String, api_key: ApiKey) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .connect_timeout(Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS))
            .user_agent(USER_AGENT)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            token: Arc::new(RwLock::new(None)),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Exchange the API key for a fresh bearer token and store it
    pub async fn refresh_token(&self) -> Result<String> {
        let url = self.url("/Account/ApiKeyLogin");
        let response = self
            .client
            .post(&url)
            .header("Accept", "application/json")
            .json(&LoginRequest {
                key_id: &self.api_key.key_id,
                key_secret: &self.api_key.key_secret,
            })
            .send()
            .await
            .map_err(|e| transport_error(&url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(handle_error_response(status, response).await);
        }

        let login: LoginResponse = response
            .json()
            .await
            .context("Failed to parse login response")?;

        *self.token.write().await = Some(login.token.clone());
        tracing::debug!("Obtained a new bearer token");
        Ok(login.token)
    }

    /// Current bearer token, logging in first when there is none
    pub async fn token(&self) -> Result<String> {
        if let Some(token) = self.token.read().await.clone() {
            return Ok(token);
        }
        self.refresh_token().await
    }

    async fn authorized(&self, builder: RequestBuilder) -> Result<RequestBuilder> {
        let token = self.token().await?;
        Ok(builder
            .header("Accept", "application/json")
            .bearer_auth(token))
    }

    async fn send(&self, builder: RequestBuilder, url: &str) -> Result<reqwest::Response> {
        self.authorized(builder)
            .await?
            .send()
            .await
            .map_err(|e| transport_error(url, e))
    }

    /// List the scans of an application
    pub async fn list_scans(&self, app_id: &str) -> Result<Vec<Scan>> {
        let url = self.url(&format!("/Apps/{}/Scans", app_id));
        let response = self.send(self.client.get(&url), &url).await?;

        let status = response.status();
        if !status.is_success() {
            return Err(handle_error_response(status, response).await);
        }

        response
            .json::<Vec<Scan>>()
            .await
            .context("Failed to parse scan list")
    }

    /// Delete a scan, keeping its issues on the application
    pub async fn delete_scan(&self, scan_id: &str) -> Result<()> {
        let url = self.url(&format!("/Scans/{}", scan_id));
        let builder = self
            .client
            .delete(&url)
            .query(&[("deleteIssues", "false")]);
        let response = self.send(builder, &url).await?;

        let status = response.status();
        if !status.is_success() {
            return Err(handle_error_response(status, response).await);
        }
        Ok(())
    }

    /// Upload an IRX archive
    pub async fn upload_file(&self, path: &Path) -> Result<UploadOutcome> {
        let url = self.url("/FileUpload");
        let file = tokio::fs::File::open(path)
            .await
            .with_context(|| format!("Failed to open {:?}", path))?;
        let length = file
            .metadata()
            .await
            .with_context(|| format!("Failed to stat {:?}", path))?
            .len();
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "upload.irx".to_string());

        let form = multipart::Form::new().part(
            UPLOAD_FIELD,
            multipart::Part::stream_with_length(reqwest::Body::from(file), length).file_name(file_name),
        );
        // Archives run to hundreds of megabytes; stream them and allow a long transfer
        let builder = self
            .client
            .post(&url)
            .multipart(form)
            .timeout(Duration::from_secs(UPLOAD_TIMEOUT_SECS));
        let response = self.send(builder, &url).await?;

        match response.status() {
            StatusCode::CREATED => {
                let body: FileUploadResponse = response
                    .json()
                    .await
                    .context("Failed to parse upload response")?;
                Ok(UploadOutcome::Uploaded(body.file_id))
            }
            StatusCode::BAD_REQUEST => {
                let body = response.text().await.unwrap_or_default();
                Ok(UploadOutcome::Rejected(body))
            }
            StatusCode::UNAUTHORIZED => Ok(UploadOutcome::Unauthorized),
            other => Ok(UploadOutcome::Failed(other)),
        }
    }

    /// Create and execute a static scan from an uploaded IRX
    pub async fn create_static_scan(&self, request: &StaticScanRequest) -> Result<CreateOutcome> {
        let url = self.url("/Scans/StaticAnalyzer");
        let response = self
            .send(self.client.post(&url).json(request), &url)
            .await?;
        create_outcome(response).await
    }

    /// Create and execute a dynamic scan
    pub async fn create_dynamic_scan(&self, request: &DynamicScanRequest) -> Result<CreateOutcome> {
        let url = self.url("/Scans/DynamicAnalyzer");
        let response = self
            .send(self.client.post(&url).json(request), &url)
            .await?;
        create_outcome(response).await
    }

    /// Request a security report for one scan
    pub async fn generate_scan_report(
        &self,
        scan_id: &str,
        request: &ReportRequest,
    ) -> Result<Option<Report>> {
        let url = self.url(&format!("/Reports/Security/Scan/{}", scan_id));
        self.generate_report(&url, request).await
    }

    /// Request a security report covering a whole application
    pub async fn generate_app_report(
        &self,
        app_id: &str,
        request: &ReportRequest,
    ) -> Result<Option<Report>> {
        let url = self.url(&format!("/Reports/Security/Application/{}", app_id));
        self.generate_report(&url, request).await
    }

    async fn generate_report(&self, url: &str, request: &ReportRequest) -> Result<Option<Report>> {
        let response = self.send(self.client.post(url).json(request), url).await?;
        if response.status() != StatusCode::OK {
            tracing::warn!(
                "Report generation at {} returned {}",
                url,
                response.status()
            );
            return Ok(None);
        }
        let report = response
            .json::<Report>()
            .await
            .context("Failed to parse report response")?;
        Ok(Some(report))
    }

    /// Current state of a report; `None` when the vendor answers anything but 200
    pub async fn report_status(&self, report_id: &str) -> Result<Option<Report>> {
        let url = self.url(&format!("/Reports/{}", report_id));
        let response = self.send(self.client.get(&url), &url).await?;
        if response.status() != StatusCode::OK {
            tracing::info!("Report {} status returned {}", report_id, response.status());
            return Ok(None);
        }
        let report = response
            .json::<Report>()
            .await
            .context("Failed to parse report status")?;
        Ok(Some(report))
    }

    /// Download a generated report
    pub async fn download_report(&self, report_id: &str) -> Result<Vec<u8>> {
        let url = self.url(&format!("/Reports/Download/{}", report_id));
        let response = self.send(self.client.get(&url), &url).await?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(handle_error_response(status, response).await);
        }

        let bytes = response
            .bytes()
            .await
            .context("Failed to read report body")?;
        Ok(bytes.to_vec())
    }

    /// Export the issues of an application
    ///
    /// The trimmed export drops fixed and noise issues and sorts by scan name.
    /// The full export can take a long time on the vendor side.
    pub async fn list_issues(&self, app_id: &str, full: bool) -> Result<serde_json::Value> {
        let url = self.url(&format!("/Issues/Application/{}", app_id));
        let builder = if full {
            self.client
                .get(&url)
                .timeout(Duration::from_secs(FULL_EXPORT_TIMEOUT_SECS))
        } else {
            self.client
                .get(&url)
                .query(&[("$filter", OPEN_ISSUES_FILTER), ("$orderby", "ScanName")])
        };
        let response = self.send(builder, &url).await?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(handle_error_response(status, response).await);
        }

        response
            .json::<serde_json::Value>()
            .await
            .context("Failed to parse issue export")
    }
}

async fn create_outcome(response: reqwest::Response) -> Result<CreateOutcome> {
    match response.status() {
        StatusCode::CREATED | StatusCode::OK => {
            let body = response
                .json::<serde_json::Value>()
                .await
                .unwrap_or(serde_json::Value::Null);
            Ok(CreateOutcome::Created(body))
        }
        StatusCode::UNAUTHORIZED => Ok(CreateOutcome::Unauthorized),
        other => {
            let body = response.text().await.unwrap_or_default();
            Ok(CreateOutcome::Failed(other, body))
        }
    }
}

fn transport_error(url: &str, e: reqwest::Error) -> anyhow::Error {
    anyhow!(
        "Failed to send request to {}: {} (is_connect: {}, is_timeout: {})",
        url,
        e,
        e.is_connect(),
        e.is_timeout()
    )
}

/// Turn a non-success vendor response into an error
async fn handle_error_response(status: StatusCode, response: reqwest::Response) -> anyhow::Error {
    let error_msg = match response.json::<ErrorResponse>().await {
        Ok(ErrorResponse {
            message: Some(message),
            code,
        }) => match code {
            Some(code) => format!("{}: {}", code, message),
            None => message,
        },
        _ => format!("Server returned status {}", status),
    };

    match status {
        StatusCode::UNAUTHORIZED => anyhow!("Authentication failed: {}", error_msg),
        StatusCode::FORBIDDEN => anyhow!("Access denied: {}", error_msg),
        StatusCode::TOO_MANY_REQUESTS => anyhow!("Rate limit exceeded: {}", error_msg),
        StatusCode::BAD_REQUEST => anyhow!("Invalid request: {}", error_msg),
        StatusCode::NOT_FOUND => anyhow!("Not found: {}", error_msg),
        StatusCode::INTERNAL_SERVER_ERROR => anyhow!("Server error: {}", error_msg),
        _ => anyhow!("Request failed ({}): {}", status, error_msg),
    }
}

#[cfg(test)]
pub mod testing {
    //! Vendor API fixtures for workflow tests

    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    /// Answer every API key login with `token`
    pub async fn mount_login(server: &MockServer, token: &str) {
        Mock::given(method("POST"))
            .and(path("/Account/ApiKeyLogin"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"Token": token})),
            )
            .mount(server)
            .await;
    }

    pub fn mock_client(server: &MockServer) -> AsocClient {
        AsocClient::new(
            server.uri(),
            ApiKey {
                key_id: "id".to_string(),
                key_secret: "secret".to_string(),
            },
        )
        .expect("client")
    }

    pub fn scan_json(id: &str, name: &str, status: &str) -> serde_json::Value {
        serde_json::json!({
            "Id": id,
            "Name": name,
            "AppName": "OMS Single",
            "LatestExecution": {"Status": status}
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_json, body_string_contains, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn api_key() -> ApiKey {
        ApiKey {
            key_id: "id".to_string(),
            key_secret: "secret".to_string(),
        }
    }

    async fn mount_login(server: &MockServer, token: &str) {
        Mock::given(method("POST"))
            .and(path("/Account/ApiKeyLogin"))
            .and(body_json(serde_json::json!({"KeyId": "id", "KeySecret": "secret"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"Token": token})))
            .mount(server)
            .await;
    }

    #[test]
    fn test_base_url_is_trimmed() -> Result<()> {
        let client = AsocClient::new("https://cloud.appscan.com/api/v2/".to_string(), api_key())?;
        assert_eq!(client.base_url(), "https://cloud.appscan.com/api/v2");
        Ok(())
    }

    #[test]
    fn test_report_request_title_and_type() -> Result<()> {
        let request = ReportRequest::full("SMCFS Scan", "Pdf", "en-US");
        let value = serde_json::to_value(&request)?;
        assert_eq!(value["Configuration"]["Title"], "smcfs_scan");
        assert_eq!(value["Configuration"]["ReportFileType"], "Pdf");
        assert_eq!(value["Configuration"]["TableOfContent"], "true");
        Ok(())
    }

    #[test]
    fn test_static_request_field_names() -> Result<()> {
        let request = StaticScanRequest {
            arsa_file_id: "f1".to_string(),
            scan_name: "proj".to_string(),
            app_id: "app".to_string(),
            locale: "en".to_string(),
            execute: true,
            personal: false,
        };
        let value = serde_json::to_value(&request)?;
        assert_eq!(value["ARSAFileId"], "f1");
        assert_eq!(value["ScanName"], "proj");
        assert_eq!(value["Execute"], true);
        Ok(())
    }

    #[test]
    fn test_scan_status_helpers() -> Result<()> {
        let scans: Vec<Scan> = serde_json::from_value(serde_json::json!([
            {"Id": "1", "Name": "a", "LatestExecution": {"Status": "InQueue"}},
            {"Id": "2", "Name": "b", "AppName": "App", "LatestExecution": {"Status": "Ready"}},
            {"Id": "3", "Name": "c", "LatestExecution": null}
        ]))?;
        assert!(scans[0].is_pending());
        assert!(scans[1].is_ready());
        assert_eq!(scans[1].app_name.as_deref(), Some("App"));
        assert!(!scans[2].is_pending());
        assert!(!scans[2].is_ready());
        Ok(())
    }

    #[tokio::test]
    async fn test_token_is_fetched_once_and_sent() -> Result<()> {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/Account/ApiKeyLogin"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"Token": "t1"})))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/Apps/app/Scans"))
            .and(header("Authorization", "Bearer t1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
            .expect(2)
            .mount(&server)
            .await;

        let client = AsocClient::new(server.uri(), api_key())?;
        assert!(client.list_scans("app").await?.is_empty());
        assert!(client.list_scans("app").await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_upload_maps_status_codes() -> Result<()> {
        let server = MockServer::start().await;
        mount_login(&server, "t").await;
        Mock::given(method("POST"))
            .and(path("/FileUpload"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir()?;
        let irx = dir.path().join("proj.irx");
        std::fs::write(&irx, b"irx")?;

        let client = AsocClient::new(server.uri(), api_key())?;
        assert!(matches!(
            client.upload_file(&irx).await?,
            UploadOutcome::Unauthorized
        ));
        Ok(())
    }

    #[tokio::test]
    async fn test_upload_streams_file_contents() -> Result<()> {
        let server = MockServer::start().await;
        mount_login(&server, "t").await;
        let payload = "irx-entry;".repeat(50_000);
        Mock::given(method("POST"))
            .and(path("/FileUpload"))
            .and(header("Authorization", "Bearer t"))
            .and(body_string_contains("filename=\"proj.irx\""))
            .and(body_string_contains(payload.as_str()))
            .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({"FileId": "f-1"})))
            .expect(1)
            .mount(&server)
            .await;

        let dir = tempfile::tempdir()?;
        let irx = dir.path().join("proj.irx");
        std::fs::write(&irx, &payload)?;

        let client = AsocClient::new(server.uri(), api_key())?;
        match client.upload_file(&irx).await? {
            UploadOutcome::Uploaded(id) => assert_eq!(id, "f-1"),
            other => panic!("unexpected outcome: {:?}", other),
        }
        Ok(())
    }

    #[tokio::test]
    async fn test_upload_of_missing_file_fails_before_sending() -> Result<()> {
        let server = MockServer::start().await;
        mount_login(&server, "t").await;
        Mock::given(method("POST"))
            .and(path("/FileUpload"))
            .respond_with(ResponseTemplate::new(201))
            .expect(0)
            .mount(&server)
            .await;

        let dir = tempfile::tempdir()?;
        let client = AsocClient::new(server.uri(), api_key())?;
        let err = client.upload_file(&dir.path().join("gone.irx")).await.unwrap_err();
        assert!(err.to_string().contains("gone.irx"));
        Ok(())
    }

    #[tokio::test]
    async fn test_filtered_issue_export_sends_odata_query() -> Result<()> {
        let server = MockServer::start().await;
        mount_login(&server, "t").await;
        Mock::given(method("GET"))
            .and(path("/Issues/Application/app"))
            .and(query_param("$filter", OPEN_ISSUES_FILTER))
            .and(query_param("$orderby", "ScanName"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"Items": []})))
            .expect(1)
            .mount(&server)
            .await;

        let client = AsocClient::new(server.uri(), api_key())?;
        let issues = client.list_issues("app", false).await?;
        assert_eq!(issues["Items"], serde_json::json!([]));
        Ok(())
    }

    #[tokio::test]
    async fn test_error_response_is_readable() -> Result<()> {
        let server = MockServer::start().await;
        mount_login(&server, "t").await;
        Mock::given(method("GET"))
            .and(path("/Apps/missing/Scans"))
            .respond_with(
                ResponseTemplate::new(404)
                    .set_body_json(serde_json::json!({"Message": "no such app", "Code": "E404"})),
            )
            .mount(&server)
            .await;

        let client = AsocClient::new(server.uri(), api_key())?;
        let err = client.list_scans("missing").await.unwrap_err();
        assert_eq!(err.to_string(), "Not found: E404: no such app");
        Ok(())
    }
}
