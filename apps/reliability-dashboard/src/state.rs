use crate::config::DashboardConfig;
use crate::services::schedule::matrix::{ScheduleMatrix, WorkerDetailRow};
use crate::services::schedule::types::{AnalysisSnapshot, JobInstance, Uptime};
use crate::services::upstream::UpstreamClient;
use axum::extract::FromRef;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio::sync::RwLock;

/// Parsed scheduler snapshots plus everything derived from them that does not depend on
/// the wall clock.
#[derive(Debug, Clone)]
pub struct StatusCache {
    pub input_hash: u64,
    pub refreshed_at: DateTime<Utc>,
    pub jobs: Vec<JobInstance>,
    pub analyses: Vec<AnalysisSnapshot>,
    pub screenshooters: Uptime,
    pub comparators: Uptime,
    pub matrix: ScheduleMatrix,
    pub worker_detail: Vec<WorkerDetailRow>,
}

#[derive(Debug, Default)]
pub struct StatusStore {
    inner: RwLock<Option<Arc<StatusCache>>>,
}

impl StatusStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn current(&self) -> Option<Arc<StatusCache>> {
        self.inner.read().await.clone()
    }

    pub async fn input_hash(&self) -> Option<u64> {
        self.inner.read().await.as_ref().map(|cache| cache.input_hash)
    }

    pub async fn replace(&self, cache: StatusCache) {
        *self.inner.write().await = Some(Arc::new(cache));
    }
}

#[derive(Clone)]
pub struct AppState {
    pub config: DashboardConfig,
    pub upstream: UpstreamClient,
    pub status: Arc<StatusStore>,
}

impl FromRef<AppState> for Arc<StatusStore> {
    fn from_ref(state: &AppState) -> Arc<StatusStore> {
        state.status.clone()
    }
}
