use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use chrono::{DateTime, Utc};

use crate::error::{AppError, AppResult};
use crate::services::schedule::matrix::{ScheduleMatrix, WorkerDetailRow};
use crate::services::schedule::uptime::{classify_workers, WorkerLiveness};
use crate::state::{AppState, StatusCache};
use crate::time::epoch_seconds;

#[derive(Debug, Clone, serde::Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StatusReport {
    pub generated_at: String,
    pub refreshed_at: String,
    pub stale_after_seconds: u64,
    pub matrix: ScheduleMatrix,
    pub worker_detail: Vec<WorkerDetailRow>,
    pub screenshooters: Vec<WorkerLiveness>,
    pub comparators: Vec<WorkerLiveness>,
}

/// Liveness depends on the request time, so it is derived here rather than cached.
pub(crate) fn status_report(
    cache: &StatusCache,
    now: DateTime<Utc>,
    stale_after_seconds: u64,
) -> StatusReport {
    let now_seconds = epoch_seconds(now);
    let threshold = stale_after_seconds as f64;
    StatusReport {
        generated_at: now.to_rfc3339(),
        refreshed_at: cache.refreshed_at.to_rfc3339(),
        stale_after_seconds,
        matrix: cache.matrix.clone(),
        worker_detail: cache.worker_detail.clone(),
        screenshooters: classify_workers(&cache.screenshooters, now_seconds, threshold),
        comparators: classify_workers(&cache.comparators, now_seconds, threshold),
    }
}

#[utoipa::path(
    get,
    path = "/api/status",
    tag = "status",
    responses(
        (status = 200, description = "Schedule matrix and worker liveness", body = StatusReport),
        (status = 503, description = "No status snapshot has been loaded yet")
    )
)]
pub(crate) async fn get_status(State(state): State<AppState>) -> AppResult<Json<StatusReport>> {
    let Some(cache) = state.status.current().await else {
        return Err(AppError::service_unavailable(
            "Status snapshot not loaded yet",
        ));
    };
    Ok(Json(status_report(
        &cache,
        Utc::now(),
        state.config.stale_after_seconds,
    )))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/status", get(get_status))
}
