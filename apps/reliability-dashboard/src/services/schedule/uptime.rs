use serde::Serialize;

use super::types::Uptime;
use crate::time::epoch_seconds_to_rfc3339;

pub const DEFAULT_STALE_AFTER_SECONDS: f64 = 300.0;

pub fn elapsed_seconds(last_seen: f64, now: f64) -> f64 {
    now - last_seen
}

/// A worker is stale once strictly more than `threshold` seconds have passed.
pub fn is_stale(last_seen: f64, now: f64, threshold: f64) -> bool {
    elapsed_seconds(last_seen, now) > threshold
}

#[derive(Debug, Clone, PartialEq, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WorkerLiveness {
    pub worker: String,
    pub last_seen: f64,
    pub last_seen_at: Option<String>,
    pub elapsed_seconds: i64,
    pub stale: bool,
}

pub fn classify_workers(uptime: &Uptime, now: f64, threshold: f64) -> Vec<WorkerLiveness> {
    uptime
        .iter()
        .map(|(worker, last_seen)| {
            let last_seen = last_seen.unwrap_or(0.0);
            let elapsed = elapsed_seconds(last_seen, now);
            WorkerLiveness {
                worker: worker.clone(),
                last_seen,
                last_seen_at: epoch_seconds_to_rfc3339(last_seen),
                elapsed_seconds: elapsed.round() as i64,
                stale: is_stale(last_seen, now, threshold),
            }
        })
        .collect()
}
