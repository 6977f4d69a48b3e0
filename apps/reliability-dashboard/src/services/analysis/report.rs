use serde::Serialize;

use super::facets::{aggregate_filtered, aggregate_indicators, rank_all, ranked_records, FacetRankings};
use super::filter::FilterSet;
use super::types::{AnalysisResult, ComparisonRecord, IndicatorSet};

/// Everything the analysis view shows for one job under the current filters.
#[derive(Debug, Clone, PartialEq, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct IndicatorReport {
    pub job_id: u64,
    pub filters: FilterSet,
    pub global: IndicatorSet,
    pub filtered: IndicatorSet,
    pub rankings: FacetRankings,
    pub total_records: usize,
    pub matching_records: usize,
    pub records: Vec<ComparisonRecord>,
}

/// Runs the global and the filtered aggregation passes over one comparator result.
pub fn build_indicator_report(
    job_id: u64,
    result: &AnalysisResult,
    filters: &FilterSet,
    record_limit: Option<usize>,
) -> IndicatorReport {
    let global = aggregate_indicators(&result.records);
    let filtered = aggregate_filtered(&result.records, filters);
    let rankings = rank_all(&global, &filtered);
    let matching_records = result
        .records
        .iter()
        .filter(|record| filters.matches(record))
        .count();

    tracing::debug!(
        job_id,
        filters = filters.len(),
        total = result.records.len(),
        matching = matching_records,
        "built indicator report"
    );

    IndicatorReport {
        job_id,
        filters: filters.clone(),
        global,
        filtered,
        rankings,
        total_records: result.records.len(),
        matching_records,
        records: ranked_records(&result.records, filters, record_limit),
    }
}
