//! Shared constants for the automator
//!
//! Vendor status names, report types and other fixed strings used across the
//! scan and report workflows.

/// Default ASoC REST endpoint
pub const DEFAULT_ASOC_ENDPOINT: &str = "https://cloud.appscan.com/api/v2";

/// Default timeout for vendor HTTP requests in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 600;

/// Timeout for the unfiltered issue export, which the vendor serves slowly
pub const FULL_EXPORT_TIMEOUT_SECS: u64 = 5400;

/// Timeout for streaming an IRX archive to the vendor
pub const UPLOAD_TIMEOUT_SECS: u64 = 3600;

/// Default connection timeout in seconds
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 30;

/// User agent string
pub const USER_AGENT: &str = concat!("asoc-automator/", env!("CARGO_PKG_VERSION"));

/// Latest-execution statuses that mean a scan is still in flight
pub const PENDING_STATUSES: [&str; 5] = ["Running", "InQueue", "Paused", "Pausing", "Stopping"];

/// Status of a finished scan or a generated report
pub const READY_STATUS: &str = "Ready";

/// Report formats requested for every scan
pub const REPORT_FILE_TYPES: [&str; 2] = ["Html", "Pdf"];

/// Placeholder replaced in scanner config templates
pub const PROJECT_PATH_PLACEHOLDER: &str = "PROJECT_PATH";

/// Multipart field name for IRX uploads
pub const UPLOAD_FIELD: &str = "fileToUpload";

/// Issue filter for the trimmed export
pub const OPEN_ISSUES_FILTER: &str = "Status ne 'Fixed' and Status ne 'Noise'";

/// Directory for mirrored copies of the most recent reports
pub const LATEST_DIR: &str = "latest";

/// Root directory for reports under the output path
pub const REPORTS_DIR: &str = "reports";

/// Directory name used inside the depcheck container for collected jars
pub const THIRD_PARTY_JARS: &str = "3rdpartyjars";

/// Column header of the CSV/XLSX issue export
pub const ISSUE_HEADER_FIELDS: [&str; 23] = [
    "ScanName",
    "DateCreated",
    "DiscoveryMethod",
    "Scanner",
    "component",
    "intext",
    "ThreatClassId",
    "Severity",
    "asv",
    "ase",
    "asve",
    "IssueType",
    "SourceFile : Location",
    "Line",
    "dispo",
    "expl",
    "trgt",
    "compen",
    "Cve",
    "psirt",
    "Cvss",
    "Status",
    "Id",
];
