// src/health.rs
//! Per-provider health ledger: one shared document mapping provider name to
//! its last known fetch status. Each record is fully overwritten after every
//! attempted fetch, success or failure; no history is retained.

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::store;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderHealthRecord {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub at: DateTime<Utc>,
}

impl ProviderHealthRecord {
    pub fn success(count: usize, duration_ms: u64) -> Self {
        Self {
            ok: true,
            count: Some(count),
            duration_ms: Some(duration_ms),
            error: None,
            at: Utc::now(),
        }
    }

    pub fn failure(error: String, duration_ms: u64) -> Self {
        Self {
            ok: false,
            count: None,
            duration_ms: Some(duration_ms),
            error: Some(error),
            at: Utc::now(),
        }
    }
}

/// Read-modify-write of the whole ledger document. No locking: the pipeline
/// runs as a single active instance (see `store`).
#[derive(Debug, Clone)]
pub struct HealthLedger {
    path: PathBuf,
}

impl HealthLedger {
    pub fn new(state_dir: &std::path::Path) -> Self {
        Self {
            path: state_dir.join("reservoir-health.json"),
        }
    }

    pub fn read_all(&self) -> BTreeMap<String, ProviderHealthRecord> {
        store::read_json(&self.path).unwrap_or_default()
    }

    pub fn record(&self, provider: &str, rec: ProviderHealthRecord) -> Result<()> {
        let mut all = self.read_all();
        all.insert(provider.to_string(), rec);
        store::write_json_atomic(&self.path, &all)
    }

    pub fn last_status(&self, provider: &str) -> Option<ProviderHealthRecord> {
        self.read_all().remove(provider)
    }
}
