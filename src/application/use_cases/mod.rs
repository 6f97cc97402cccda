//! Use cases - one workflow per command mode

pub mod depcheck;
pub mod dynamic_scan;
pub mod export;
pub mod reports;
pub mod static_scan;

use serde::Serialize;

/// What happened to one scan submission
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "status", content = "detail")]
pub enum SubmissionStatus {
    Created,
    /// Upload or creation kept failing until the retry budget ran out
    Exhausted,
    Failed(String),
}

#[derive(Debug, Clone, Serialize)]
pub struct ScanSubmission {
    pub name: String,
    #[serde(flatten)]
    pub status: SubmissionStatus,
}

impl ScanSubmission {
    pub fn new(name: impl Into<String>, status: SubmissionStatus) -> Self {
        Self {
            name: name.into(),
            status,
        }
    }

    pub fn failed(name: impl Into<String>, error: &anyhow::Error) -> Self {
        Self::new(name, SubmissionStatus::Failed(format!("{:#}", error)))
    }
}

/// Result of a scan round
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScanOutcome {
    Started(Vec<ScanSubmission>),
    /// Scans from the previous round are still running; nothing was started
    Pending(Vec<String>),
}

impl ScanOutcome {
    pub fn is_pending(&self) -> bool {
        matches!(self, ScanOutcome::Pending(_))
    }
}
