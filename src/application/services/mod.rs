//! Building blocks shared by the scan and report workflows

pub mod irx_submitter;
pub mod report_poller;
pub mod scan_guard;
