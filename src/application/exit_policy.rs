use crate::application::use_cases::reports::ReportsSummary;
use crate::application::use_cases::{ScanOutcome, SubmissionStatus};
use crate::exit_codes;

/// Scan rounds only fail the run when a previous round is still in progress
pub fn scan_exit_code(outcomes: &[ScanOutcome]) -> i32 {
    if outcomes.iter().any(ScanOutcome::is_pending) {
        exit_codes::SCANS_PENDING
    } else {
        exit_codes::SUCCESS
    }
}

/// Count of submissions that did not create a scan
pub fn failed_submissions(outcomes: &[ScanOutcome]) -> usize {
    outcomes
        .iter()
        .filter_map(|o| match o {
            ScanOutcome::Started(submissions) => Some(submissions),
            ScanOutcome::Pending(_) => None,
        })
        .flatten()
        .filter(|s| s.status != SubmissionStatus::Created)
        .count()
}

pub fn reports_exit_code(summary: &ReportsSummary) -> i32 {
    if !summary.not_ready.is_empty() {
        exit_codes::SCANS_PENDING
    } else {
        exit_codes::SUCCESS
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::use_cases::ScanSubmission;

    #[test]
    fn test_pending_round_wins() {
        let outcomes = vec![
            ScanOutcome::Started(vec![ScanSubmission::new("sba", SubmissionStatus::Created)]),
            ScanOutcome::Pending(vec!["SMCFS Scan".to_string()]),
        ];
        assert_eq!(scan_exit_code(&outcomes), exit_codes::SCANS_PENDING);
        assert_eq!(scan_exit_code(&outcomes[..1]), exit_codes::SUCCESS);
    }

    #[test]
    fn test_failed_submissions_are_counted() {
        let outcomes = vec![ScanOutcome::Started(vec![
            ScanSubmission::new("a", SubmissionStatus::Created),
            ScanSubmission::new("b", SubmissionStatus::Exhausted),
            ScanSubmission::new("c", SubmissionStatus::Failed("500".to_string())),
        ])];
        assert_eq!(failed_submissions(&outcomes), 2);
    }

    #[test]
    fn test_reports_not_ready_is_pending() {
        let mut summary = ReportsSummary::default();
        assert_eq!(reports_exit_code(&summary), exit_codes::SUCCESS);
        summary.not_ready.push("static");
        assert_eq!(reports_exit_code(&summary), exit_codes::SCANS_PENDING);
    }
}
