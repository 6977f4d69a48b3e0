use std::time::Duration;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use xxhash_rust::xxh3::Xxh3;

use crate::json::{lenient_list_from_slice, lenient_map_from_slice};
use crate::services::schedule::matrix::{worker_detail, ScheduleMatrixBuilder};
use crate::services::schedule::types::{AnalysisSnapshot, JobInstance, Uptime};
use crate::services::upstream::StatusBodies;
use crate::state::{AppState, StatusCache};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollOutcome {
    Refreshed,
    Unchanged,
}

/// Refreshes the job, analysis and uptime snapshots on a fixed interval.
pub struct StatusPollerService {
    state: AppState,
    interval: Duration,
}

impl StatusPollerService {
    pub fn new(state: AppState, interval: Duration) -> Self {
        Self { state, interval }
    }

    pub fn start(self, cancel: CancellationToken) {
        let state = self.state.clone();
        let interval = self.interval;
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    _ = cancel.cancelled() => break,
                    _ = ticker.tick() => {
                        if let Err(err) = poll_status(&state).await {
                            warn!("status poll failed: {err:#}");
                        }
                    }
                }
            }
        });
    }
}

pub async fn poll_status(state: &AppState) -> Result<PollOutcome> {
    let bodies = state.upstream.fetch_status_bodies().await?;
    let input_hash = hash_bodies(&bodies);
    if state.status.input_hash().await == Some(input_hash) {
        debug!(input_hash, "status snapshot unchanged");
        return Ok(PollOutcome::Unchanged);
    }

    let cache = parse_status_cache(&bodies, input_hash, Utc::now())?;
    info!(
        jobs = cache.jobs.len(),
        analyses = cache.analyses.len(),
        series = cache.matrix.rows.len(),
        columns = cache.matrix.columns,
        screenshooters = cache.screenshooters.len(),
        comparators = cache.comparators.len(),
        "status snapshot refreshed"
    );
    state.status.replace(cache).await;
    Ok(PollOutcome::Refreshed)
}

/// Each body is length-prefixed so moving bytes between bodies changes the hash.
pub fn hash_bodies(bodies: &StatusBodies) -> u64 {
    let mut hasher = Xxh3::new();
    for body in [
        &bodies.jobs,
        &bodies.analyses,
        &bodies.screenshooters,
        &bodies.comparators,
    ] {
        hasher.update(&(body.len() as u64).to_le_bytes());
        hasher.update(body);
    }
    hasher.digest()
}

pub fn parse_status_cache(
    bodies: &StatusBodies,
    input_hash: u64,
    refreshed_at: DateTime<Utc>,
) -> Result<StatusCache> {
    let jobs: Vec<JobInstance> =
        lenient_list_from_slice(&bodies.jobs, "jobs").context("invalid job listing")?;
    let analyses: Vec<AnalysisSnapshot> = lenient_list_from_slice(&bodies.analyses, "analyses")
        .context("invalid analysis listing")?;
    let screenshooters: Uptime = lenient_map_from_slice(&bodies.screenshooters, "screenshooters")
        .context("invalid screenshooter uptime")?;
    let comparators: Uptime = lenient_map_from_slice(&bodies.comparators, "comparators")
        .context("invalid comparator uptime")?;
    Ok(build_status_cache(
        jobs,
        analyses,
        screenshooters,
        comparators,
        input_hash,
        refreshed_at,
    ))
}

pub fn build_status_cache(
    jobs: Vec<JobInstance>,
    analyses: Vec<AnalysisSnapshot>,
    screenshooters: Uptime,
    comparators: Uptime,
    input_hash: u64,
    refreshed_at: DateTime<Utc>,
) -> StatusCache {
    let workers: Vec<String> = screenshooters.keys().cloned().collect();
    let matrix = ScheduleMatrixBuilder::new(workers.len()).build(&jobs, &analyses);
    let worker_detail = worker_detail(&jobs, &workers);
    StatusCache {
        input_hash,
        refreshed_at,
        jobs,
        analyses,
        screenshooters,
        comparators,
        matrix,
        worker_detail,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bodies() -> StatusBodies {
        StatusBodies {
            jobs: br#"[{"cronId":1,"jobId":5,"historySize":2,"workers":{"ws-1":"ok","ws-2":null}}]"#
                .to_vec(),
            analyses: br#"[{"cronId":1,"jobId":5,"finished":false,"assignee":"cmp-1","completeness":1}]"#
                .to_vec(),
            screenshooters: br#"{"ws-1":1700000000,"ws-2":1700000100}"#.to_vec(),
            comparators: br#"{"cmp-1":1700000000}"#.to_vec(),
        }
    }

    #[test]
    fn hash_tracks_body_contents() {
        let a = bodies();
        let mut b = bodies();
        assert_eq!(hash_bodies(&a), hash_bodies(&b));

        b.comparators = br#"{"cmp-1":1700000001}"#.to_vec();
        assert_ne!(hash_bodies(&a), hash_bodies(&b));
    }

    #[test]
    fn hash_separates_body_boundaries() {
        let a = StatusBodies {
            jobs: b"ab".to_vec(),
            analyses: b"c".to_vec(),
            ..Default::default()
        };
        let b = StatusBodies {
            jobs: b"a".to_vec(),
            analyses: b"bc".to_vec(),
            ..Default::default()
        };
        assert_ne!(hash_bodies(&a), hash_bodies(&b));
    }

    #[test]
    fn parses_bodies_into_a_matrix() -> Result<()> {
        let cache = parse_status_cache(&bodies(), 1, Utc::now())?;
        assert_eq!(cache.matrix.columns, 2);
        assert_eq!(cache.matrix.total_workers, 2);
        assert_eq!(cache.worker_detail.len(), 1);
        let slot = cache.matrix.rows[0].slots[0].as_ref().expect("slot");
        assert_eq!(slot.worker_coverage, 1);
        Ok(())
    }

    #[test]
    fn one_malformed_entry_does_not_blank_the_snapshot() -> Result<()> {
        let mut partial = bodies();
        partial.jobs = br#"[{"cronId":1,"jobId":5,"historySize":2,"workers":{"ws-1":"ok"}},{"cronId":"x","jobId":6}]"#
            .to_vec();
        partial.analyses = br#"[{"cronId":1,"jobId":5,"finished":null},{"cronId":1,"jobId":5,"finished":true,"assignee":"cmp-1","completeness":1}]"#
            .to_vec();
        let cache = parse_status_cache(&partial, 1, Utc::now())?;
        assert_eq!(cache.jobs.len(), 1);
        assert_eq!(cache.analyses.len(), 1);
        assert!(cache.analyses[0].finished);
        assert_eq!(cache.matrix.rows.len(), 1);
        Ok(())
    }

    #[test]
    fn malformed_bodies_are_reported() {
        let mut broken = bodies();
        broken.analyses = b"{".to_vec();
        let err = parse_status_cache(&broken, 1, Utc::now()).unwrap_err();
        assert!(format!("{err:#}").contains("invalid analysis listing"));
    }
}
