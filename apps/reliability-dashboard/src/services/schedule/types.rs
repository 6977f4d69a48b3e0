use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// One concrete run of a cron series, as listed by `/job/submission`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct JobInstance {
    pub cron_id: u64,
    pub job_id: u64,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub last_scheduled_sec: f64,
    #[serde(default)]
    pub history_size: f64,
    #[serde(default)]
    pub hours: f64,
    /// Worker id -> result token; `null` means the worker has not run this job yet.
    #[serde(default)]
    #[schema(value_type = Option<Object>)]
    pub workers: Option<BTreeMap<String, Option<JsonValue>>>,
}

impl JobInstance {
    /// Workers that have reported a result.
    pub fn worker_coverage(&self) -> usize {
        self.workers
            .as_ref()
            .map(|workers| workers.values().filter(|value| value.is_some()).count())
            .unwrap_or(0)
    }

    /// Only an explicit `null` counts as not reported; a worker missing from the map does not.
    pub fn has_reported(&self, worker: &str) -> bool {
        let entry = self.workers.as_ref().and_then(|workers| workers.get(worker));
        !matches!(entry, Some(None))
    }

    /// `historySize` is a real on the wire; the slot count is its rounded value.
    pub fn history_slots(&self) -> usize {
        if self.history_size.is_finite() && self.history_size > 0.0 {
            self.history_size.round() as usize
        } else {
            0
        }
    }
}

/// Comparator progress for one job, as listed by `/analysis`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisSnapshot {
    #[serde(default)]
    pub cron_id: u64,
    pub job_id: u64,
    #[serde(default)]
    pub finished: bool,
    #[serde(default)]
    pub assignee: Option<String>,
    #[serde(default)]
    pub assignee_time: Option<f64>,
    #[serde(default)]
    pub completeness: u32,
    #[serde(default)]
    pub analysis_file: Option<String>,
}

/// Worker id -> last-seen epoch seconds.
pub type Uptime = BTreeMap<String, Option<f64>>;
