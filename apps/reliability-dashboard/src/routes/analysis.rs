use axum::extract::{Path, Query, State};
use axum::routing::get;
use axum::{Json, Router};

use crate::error::{map_upstream_error, AppError, AppResult};
use crate::services::analysis::filter::FilterSet;
use crate::services::analysis::listing::{find_finished, finished_analyses, AnalysisListing};
use crate::services::analysis::report::{build_indicator_report, IndicatorReport};
use crate::state::AppState;

const MAX_RECORD_LIMIT: usize = 5_000;

#[derive(Debug, Clone, Default, serde::Deserialize, utoipa::IntoParams)]
pub(crate) struct IndicatorQuery {
    /// Comma-separated facet keys; a record matches if any of its keys is listed.
    filters: Option<String>,
    /// Maximum number of matching records to return, worst first.
    limit: Option<usize>,
}

impl IndicatorQuery {
    fn filter_set(&self) -> FilterSet {
        self.filters
            .as_deref()
            .map(FilterSet::parse_query)
            .unwrap_or_default()
    }

    fn record_limit(&self) -> Option<usize> {
        self.limit.map(|limit| limit.min(MAX_RECORD_LIMIT))
    }
}

#[utoipa::path(
    get,
    path = "/api/analyses",
    tag = "analysis",
    responses(
        (status = 200, description = "Finished analyses with a published archive", body = Vec<AnalysisListing>),
        (status = 503, description = "No status snapshot has been loaded yet")
    )
)]
pub(crate) async fn list_analyses(
    State(state): State<AppState>,
) -> AppResult<Json<Vec<AnalysisListing>>> {
    let Some(cache) = state.status.current().await else {
        return Err(AppError::service_unavailable(
            "Status snapshot not loaded yet",
        ));
    };
    Ok(Json(finished_analyses(&cache.jobs, &cache.analyses)))
}

#[utoipa::path(
    get,
    path = "/api/analyses/{job_id}/indicators",
    tag = "analysis",
    params(("job_id" = u64, Path, description = "Job id"), IndicatorQuery),
    responses(
        (status = 200, description = "Global and filtered reliability indicators", body = IndicatorReport),
        (status = 404, description = "No finished analysis for this job"),
        (status = 502, description = "Upstream fetch failed"),
        (status = 503, description = "No status snapshot has been loaded yet")
    )
)]
pub(crate) async fn analysis_indicators(
    State(state): State<AppState>,
    Path(job_id): Path<u64>,
    Query(query): Query<IndicatorQuery>,
) -> AppResult<Json<IndicatorReport>> {
    let Some(cache) = state.status.current().await else {
        return Err(AppError::service_unavailable(
            "Status snapshot not loaded yet",
        ));
    };
    let Some(listing) = find_finished(&cache.jobs, &cache.analyses, job_id) else {
        return Err(AppError::not_found(format!(
            "No finished analysis for job {job_id}"
        )));
    };
    // Drop the snapshot before the upstream round trip.
    drop(cache);

    let result = state
        .upstream
        .fetch_analysis_result(&listing.analysis_dir)
        .await
        .map_err(|err| map_upstream_error(err, "analysis result"))?;

    Ok(Json(build_indicator_report(
        job_id,
        &result,
        &query.filter_set(),
        query.record_limit(),
    )))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/analyses", get(list_analyses))
        .route("/analyses/{job_id}/indicators", get(analysis_indicators))
}
