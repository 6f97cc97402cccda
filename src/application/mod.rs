//! Application layer - workflow services and the use cases behind each command

pub mod exit_policy;
pub mod services;
pub mod use_cases;
