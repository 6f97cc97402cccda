//! Settings - secrets read from the environment
//!
//! Credentials for the vendor API, the image registry, Jenkins and Artifactory
//! are never written to the config file. They come from the process
//! environment, optionally preloaded from a `.env` file.

use std::collections::HashMap;
use std::path::Path;

use thiserror::Error;

pub const KEY_ID: &str = "KEY_ID";
pub const KEY_SECRET: &str = "KEY_SECRET";
pub const PRESENCE_ID: &str = "PRESENCE_ID";
pub const REGISTRY_USER: &str = "ENTITLED_REGISTRY_USER";
pub const REGISTRY_TOKEN: &str = "ENTITLED_REGISTRY_TOKEN";
pub const JENKINS_USER: &str = "JENKINS_USER";
pub const JENKINS_TOKEN: &str = "JENKINS_TOKEN";
pub const ARTF_USER: &str = "ARTF_USER";
pub const ARTF_TOKEN: &str = "ARTF_TOKEN";

/// Placeholders in the runtime config files and the variables that fill them
pub const DB_PLACEHOLDERS: [(&str, &str); 6] = [
    ("__DB_HOST__", "DB_HOST"),
    ("__DB_PORT__", "DB_PORT"),
    ("__DB_NAME__", "DB_NAME"),
    ("__DB_USER__", "DB_USER"),
    ("__DB_PASS__", "DB_PASS"),
    ("__DB_SCHEMA__", "DB_SCHEMA"),
];

const ALL_KEYS: [&str; 15] = [
    KEY_ID,
    KEY_SECRET,
    PRESENCE_ID,
    REGISTRY_USER,
    REGISTRY_TOKEN,
    JENKINS_USER,
    JENKINS_TOKEN,
    ARTF_USER,
    ARTF_TOKEN,
    "DB_HOST",
    "DB_PORT",
    "DB_NAME",
    "DB_USER",
    "DB_PASS",
    "DB_SCHEMA",
];

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("environment variable {0} is not set")]
    Missing(String),
}

/// Snapshot of the secrets known to the automator
#[derive(Clone, Default)]
pub struct Secrets {
    values: HashMap<String, String>,
}

impl std::fmt::Debug for Secrets {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut keys: Vec<&String> = self.values.keys().collect();
        keys.sort();
        f.debug_struct("Secrets").field("present", &keys).finish()
    }
}

impl Secrets {
    /// Load a `.env` file (when present) and snapshot the environment
    pub fn load(env_file: Option<&Path>) -> Self {
        let loaded = match env_file {
            Some(path) => dotenv::from_path(path).map(|_| path.to_path_buf()),
            None => dotenv::dotenv(),
        };
        match loaded {
            Ok(path) => tracing::debug!("Loaded environment from {:?}", path),
            Err(e) => tracing::debug!("No .env file loaded: {}", e),
        }

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary lookup
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let values = ALL_KEYS
            .iter()
            .filter_map(|key| {
                lookup(key)
                    .filter(|v| !v.is_empty())
                    .map(|v| (key.to_string(), v))
            })
            .collect();
        Self { values }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    pub fn require(&self, key: &str) -> Result<&str, SettingsError> {
        self.get(key)
            .ok_or_else(|| SettingsError::Missing(key.to_string()))
    }

    /// A `(user, token)` pair for basic auth
    pub fn basic_auth(&self, user: &str, token: &str) -> Result<(String, String), SettingsError> {
        Ok((
            self.require(user)?.to_string(),
            self.require(token)?.to_string(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> Secrets {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Secrets::from_lookup(|k| map.get(k).cloned())
    }

    #[test]
    fn test_require_reports_missing_name() {
        let secrets = lookup(&[(KEY_ID, "id")]);
        assert_eq!(secrets.require(KEY_ID).ok(), Some("id"));
        let err = secrets.require(KEY_SECRET).unwrap_err();
        assert_eq!(err.to_string(), "environment variable KEY_SECRET is not set");
    }

    #[test]
    fn test_empty_values_are_missing() {
        let secrets = lookup(&[(ARTF_USER, ""), (ARTF_TOKEN, "t")]);
        assert!(secrets.basic_auth(ARTF_USER, ARTF_TOKEN).is_err());
    }

    #[test]
    fn test_debug_hides_values() {
        let secrets = lookup(&[(KEY_SECRET, "hunter2")]);
        let printed = format!("{:?}", secrets);
        assert!(printed.contains("KEY_SECRET"));
        assert!(!printed.contains("hunter2"));
    }
}
