use axum::routing::get;
use axum::{Json, Router};
use utoipa::OpenApi;

use crate::error::{internal_error, AppResult};
use crate::routes::{analysis, health, status};
use crate::services::analysis::facets::{FacetRanking, FacetRankings};
use crate::services::analysis::filter::FilterSet;
use crate::services::analysis::listing::AnalysisListing;
use crate::services::analysis::report::IndicatorReport;
use crate::services::analysis::types::{ComparisonRecord, FacetKind, IndicatorSet};
use crate::services::schedule::matrix::{
    AnalysisCell, AnalysisState, CoverageCell, ScheduleMatrix, ScheduleRow, ScheduleSlot,
    SlotStatus, WorkerDetailRow, WorkerReport,
};
use crate::services::schedule::uptime::WorkerLiveness;
use crate::state::AppState;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Screenshot reliability dashboard",
        description = "Schedule coverage, worker liveness and rendering reliability indicators"
    ),
    paths(
        health::healthz_handler,
        status::get_status,
        analysis::list_analyses,
        analysis::analysis_indicators,
    ),
    components(schemas(
        health::HealthResponse,
        status::StatusReport,
        ScheduleMatrix,
        ScheduleRow,
        ScheduleSlot,
        AnalysisState,
        CoverageCell,
        AnalysisCell,
        SlotStatus,
        WorkerDetailRow,
        WorkerReport,
        WorkerLiveness,
        AnalysisListing,
        IndicatorReport,
        IndicatorSet,
        FacetKind,
        FacetRanking,
        FacetRankings,
        FilterSet,
        ComparisonRecord,
    )),
    tags(
        (name = "health"),
        (name = "status", description = "Schedule matrix and worker uptime"),
        (name = "analysis", description = "Comparator results and reliability indicators")
    )
)]
pub struct ApiDoc;

pub fn openapi_json() -> serde_json::Result<serde_json::Value> {
    serde_json::to_value(ApiDoc::openapi())
}

async fn openapi_handler() -> AppResult<Json<serde_json::Value>> {
    openapi_json().map(Json).map_err(internal_error)
}

pub fn router() -> Router<AppState> {
    Router::new().route("/openapi.json", get(openapi_handler))
}
