//! Old-scan guard
//!
//! A new scan round must not start while the vendor still runs one from the
//! previous round. When nothing is pending the old scans are deleted so the
//! application only holds the new round.

use std::collections::BTreeMap;

use anyhow::Result;

use crate::api_client::{AsocClient, is_pending_status};

/// Scan names of an application mapped to their latest execution status
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OldScans {
    pub statuses: BTreeMap<String, String>,
}

impl OldScans {
    pub fn any_pending(&self) -> bool {
        self.statuses.values().any(|s| is_pending_status(s))
    }

    pub fn is_pending(&self, name: &str) -> bool {
        self.statuses
            .get(name)
            .is_some_and(|s| is_pending_status(s))
    }

    pub fn pending_names(&self) -> Vec<&str> {
        self.statuses
            .iter()
            .filter(|(_, s)| is_pending_status(s))
            .map(|(n, _)| n.as_str())
            .collect()
    }
}

/// Delete the scans of `app_id` unless any of them is still pending
pub async fn remove_old_scans(client: &AsocClient, app_id: &str) -> Result<OldScans> {
    let scans = client.list_scans(app_id).await?;
    let old = OldScans {
        statuses: scans
            .iter()
            .map(|s| (s.name.clone(), s.status().to_string()))
            .collect(),
    };

    if old.any_pending() {
        tracing::warn!("Scan(s) pending: {:?}", old.pending_names());
        return Ok(old);
    }

    for scan in &scans {
        tracing::info!("Removing {} - {}...", scan.name, scan.id);
        if let Err(e) = client.delete_scan(&scan.id).await {
            tracing::warn!("Could not remove {}: {:#}", scan.name, e);
        }
    }
    Ok(old)
}
