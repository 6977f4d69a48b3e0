use crate::config::DashboardConfig;
use crate::services::analysis::types::ComparisonRecord;
use crate::services::schedule::types::{AnalysisSnapshot, JobInstance, Uptime};
use crate::services::status_poller::build_status_cache;
use crate::services::upstream::{build_http_client, UpstreamClient};
use crate::state::{AppState, StatusCache, StatusStore};
use chrono::{TimeZone, Utc};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

/// Points at the discard port so upstream fetches fail fast.
pub fn test_config() -> DashboardConfig {
    DashboardConfig {
        upstream_base_url: "http://127.0.0.1:9".to_string(),
        status_poll_interval_seconds: 10,
        upstream_timeout_seconds: 2,
        stale_after_seconds: 300,
        cors_origins: Vec::new(),
    }
}

pub fn test_state() -> AppState {
    let config = test_config();
    let http = build_http_client(Duration::from_secs(config.upstream_timeout_seconds))
        .expect("http client");
    AppState {
        upstream: UpstreamClient::new(config.upstream_base_url.clone(), http),
        config,
        status: Arc::new(StatusStore::new()),
    }
}

pub async fn populated_state() -> AppState {
    let state = test_state();
    state.status.replace(populated_cache()).await;
    state
}

/// Two series over two screenshooters: cron 1 ran jobs 7 and 8, cron 2 ran job 9.
pub fn populated_cache() -> StatusCache {
    let jobs = vec![
        job(1, 7, 2.0, &[("ws-1", true), ("ws-2", true)]),
        job(1, 8, 2.0, &[("ws-1", true), ("ws-2", false)]),
        job(2, 9, 1.0, &[]),
    ];
    let analyses = vec![analysis(7, true, 2), analysis(8, false, 1)];
    let screenshooters: Uptime = BTreeMap::from([
        ("ws-1".to_string(), Some(1_700_000_000.0)),
        ("ws-2".to_string(), Some(1_700_000_100.0)),
    ]);
    let comparators: Uptime = BTreeMap::from([("cmp-1".to_string(), Some(1_700_000_000.0))]);
    let refreshed_at = Utc
        .timestamp_opt(1_700_000_200, 0)
        .single()
        .expect("timestamp");
    build_status_cache(jobs, analyses, screenshooters, comparators, 1, refreshed_at)
}

pub fn record(
    resolution: &str,
    print_scope: &str,
    left: (&str, &str),
    right: (&str, &str),
    rmse: f64,
) -> ComparisonRecord {
    ComparisonRecord {
        resolution: resolution.to_string(),
        print_scope: print_scope.to_string(),
        hostname1: "host-a".to_string(),
        hostname2: "host-b".to_string(),
        platform1: left.0.to_string(),
        platform2: right.0.to_string(),
        browser1: left.1.to_string(),
        browser2: right.1.to_string(),
        rmse,
    }
}

/// `workers` maps worker id to whether it has reported for this job.
pub fn job(cron_id: u64, job_id: u64, history_size: f64, workers: &[(&str, bool)]) -> JobInstance {
    JobInstance {
        cron_id,
        job_id,
        url: format!("https://example.org/{cron_id}"),
        last_scheduled_sec: 1_700_000_000.0 + job_id as f64 * 3600.0,
        history_size,
        hours: 1.0,
        workers: Some(
            workers
                .iter()
                .map(|(worker, reported)| {
                    let token = reported.then(|| serde_json::json!(format!("{worker}.zip")));
                    (worker.to_string(), token)
                })
                .collect(),
        ),
    }
}

pub fn analysis(job_id: u64, finished: bool, completeness: u32) -> AnalysisSnapshot {
    AnalysisSnapshot {
        cron_id: 1,
        job_id,
        finished,
        assignee: Some("cmp-1".to_string()),
        assignee_time: Some(1_700_000_000.0),
        completeness,
        analysis_file: Some(format!("jobs/{job_id:020}/analysis.zip")),
    }
}
