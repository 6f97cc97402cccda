//! CLI Commands Module
//!
//! One module per mode. Each parses its own flags, runs the matching use case
//! and prints the summary.

pub mod depcheck;
pub mod reports;
pub mod scan;
