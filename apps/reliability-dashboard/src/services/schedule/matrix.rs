use std::collections::{BTreeMap, HashMap};

use serde::Serialize;

use super::types::{AnalysisSnapshot, JobInstance};

/// Comparator state of one job: `Indeterminate` when nobody picked it up (or we have no
/// snapshot for it), otherwise the snapshot's `finished` flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisState {
    Indeterminate,
    Unfinished,
    Finished,
}

impl AnalysisState {
    pub fn from_snapshot(snapshot: Option<&AnalysisSnapshot>) -> Self {
        match snapshot {
            Some(snapshot) if snapshot.assignee.is_some() => {
                if snapshot.finished {
                    AnalysisState::Finished
                } else {
                    AnalysisState::Unfinished
                }
            }
            _ => AnalysisState::Indeterminate,
        }
    }
}

/// Screenshot grid cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum CoverageCell {
    Absent,
    Unscheduled,
    Partial,
    Full,
}

/// Comparison grid cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisCell {
    Absent,
    /// Completeness is exactly zero: no worker analysis has come back.
    NoReports,
    /// Assigned to a comparator but not finished.
    Rejected,
    CompletePartial,
    CompleteFull,
    /// Not assigned to any comparator yet.
    Pending,
}

/// Operator-facing summary of one slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum SlotStatus {
    NoData,
    NotScheduled,
    PartialCoverage,
    FullCoveragePendingAnalysis,
    FullCoverageAnalysisComplete,
}

pub fn classify_coverage(coverage: Option<usize>, total_workers: usize) -> CoverageCell {
    match coverage {
        None => CoverageCell::Absent,
        Some(0) => CoverageCell::Unscheduled,
        Some(count) if count == total_workers => CoverageCell::Full,
        Some(_) => CoverageCell::Partial,
    }
}

/// Checks run in a fixed order: a zero completeness wins over the finished flag.
pub fn classify_analysis(
    state: Option<AnalysisState>,
    completeness: Option<u32>,
    total_workers: usize,
) -> AnalysisCell {
    let Some(state) = state else {
        return AnalysisCell::Absent;
    };
    if completeness == Some(0) {
        return AnalysisCell::NoReports;
    }
    match state {
        AnalysisState::Unfinished => AnalysisCell::Rejected,
        AnalysisState::Finished => {
            if completeness.map(|value| value as usize) == Some(total_workers) {
                AnalysisCell::CompleteFull
            } else {
                AnalysisCell::CompletePartial
            }
        }
        AnalysisState::Indeterminate => AnalysisCell::Pending,
    }
}

pub fn classify_slot(
    coverage: Option<usize>,
    total_workers: usize,
    state: AnalysisState,
    completeness: Option<u32>,
) -> SlotStatus {
    match classify_coverage(coverage, total_workers) {
        CoverageCell::Absent => SlotStatus::NoData,
        CoverageCell::Unscheduled => SlotStatus::NotScheduled,
        CoverageCell::Partial => SlotStatus::PartialCoverage,
        CoverageCell::Full => {
            if state == AnalysisState::Finished && completeness != Some(0) {
                SlotStatus::FullCoverageAnalysisComplete
            } else {
                SlotStatus::FullCoveragePendingAnalysis
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleSlot {
    pub job_id: u64,
    pub last_scheduled_sec: f64,
    pub worker_coverage: usize,
    pub analysis_state: AnalysisState,
    pub completeness: Option<u32>,
    pub coverage_cell: CoverageCell,
    pub analysis_cell: AnalysisCell,
    pub status: SlotStatus,
    pub coverage_label: String,
    pub analysis_label: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleRow {
    pub cron_id: u64,
    /// Column `i` is the i-th most recent run; `None` when the series has fewer runs.
    pub slots: Vec<Option<ScheduleSlot>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleMatrix {
    pub columns: usize,
    pub total_workers: usize,
    pub rows: Vec<ScheduleRow>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WorkerReport {
    pub worker: String,
    pub reported: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WorkerDetailRow {
    pub job_id: u64,
    pub workers: Vec<WorkerReport>,
}

fn glyph(cell: AnalysisCell) -> char {
    match cell {
        AnalysisCell::CompletePartial | AnalysisCell::CompleteFull => '\u{2611}',
        AnalysisCell::Rejected => '\u{2612}',
        _ => '\u{2610}',
    }
}

/// Upper bound on grid columns; `historySize` is free-form operator input.
pub const MAX_HISTORY_SLOTS: usize = 1_000;

/// Builds the time-aligned grid of recent runs per cron series.
#[derive(Debug, Clone, Copy)]
pub struct ScheduleMatrixBuilder {
    total_workers: usize,
}

impl ScheduleMatrixBuilder {
    /// `total_workers` is the number of known screenshooters.
    pub fn new(total_workers: usize) -> Self {
        Self { total_workers }
    }

    pub fn build(&self, jobs: &[JobInstance], analyses: &[AnalysisSnapshot]) -> ScheduleMatrix {
        let jobs_by_id = index_jobs(jobs);
        let analyses_by_id: HashMap<u64, &AnalysisSnapshot> = analyses
            .iter()
            .map(|snapshot| (snapshot.job_id, snapshot))
            .collect();
        let series = group_by_series(jobs_by_id.values().copied());
        let requested = jobs_by_id
            .values()
            .map(|job| job.history_slots())
            .max()
            .unwrap_or(0);
        if requested > MAX_HISTORY_SLOTS {
            tracing::warn!(
                requested,
                cap = MAX_HISTORY_SLOTS,
                "historySize exceeds the column cap; truncating the schedule grid"
            );
        }
        let columns = requested.min(MAX_HISTORY_SLOTS);

        let rows = series
            .into_iter()
            .map(|(cron_id, job_ids)| ScheduleRow {
                cron_id,
                slots: (0..columns)
                    .map(|column| {
                        let job = job_ids.get(column).and_then(|id| jobs_by_id.get(id))?;
                        Some(self.slot(job, analyses_by_id.get(&job.job_id).copied()))
                    })
                    .collect(),
            })
            .collect();

        ScheduleMatrix {
            columns,
            total_workers: self.total_workers,
            rows,
        }
    }

    fn slot(&self, job: &JobInstance, snapshot: Option<&AnalysisSnapshot>) -> ScheduleSlot {
        let total = self.total_workers;
        let worker_coverage = job.worker_coverage();
        let analysis_state = AnalysisState::from_snapshot(snapshot);
        let completeness = snapshot.map(|snapshot| snapshot.completeness);

        let coverage_cell = classify_coverage(Some(worker_coverage), total);
        let analysis_cell = classify_analysis(Some(analysis_state), completeness, total);
        let status = classify_slot(Some(worker_coverage), total, analysis_state, completeness);

        let coverage_glyph = if coverage_cell == CoverageCell::Full {
            '\u{2611}'
        } else {
            '\u{2610}'
        };
        let completeness_text = completeness
            .map(|value| value.to_string())
            .unwrap_or_else(|| "?".to_string());

        ScheduleSlot {
            job_id: job.job_id,
            last_scheduled_sec: job.last_scheduled_sec,
            worker_coverage,
            analysis_state,
            completeness,
            coverage_cell,
            analysis_cell,
            status,
            coverage_label: format!("{coverage_glyph} {worker_coverage}/{total} #{}", job.job_id),
            analysis_label: format!(
                "{} {completeness_text}/{total} #{}",
                glyph(analysis_cell),
                job.job_id
            ),
        }
    }
}

/// Later duplicates of a job id replace earlier ones.
fn index_jobs(jobs: &[JobInstance]) -> BTreeMap<u64, &JobInstance> {
    jobs.iter().map(|job| (job.job_id, job)).collect()
}

/// Job ids per cron series, most recent first.
///
/// Instances are visited in ascending job id order and front-inserted, so the feed's own
/// ordering does not matter.
pub fn group_by_series<'a, I>(jobs: I) -> BTreeMap<u64, Vec<u64>>
where
    I: IntoIterator<Item = &'a JobInstance>,
{
    let mut ordered: Vec<&JobInstance> = jobs.into_iter().collect();
    ordered.sort_by_key(|job| job.job_id);

    let mut series: BTreeMap<u64, Vec<u64>> = BTreeMap::new();
    for job in ordered {
        series.entry(job.cron_id).or_default().insert(0, job.job_id);
    }
    series
}

/// Which screenshooters reported for each job, most recent job first.
pub fn worker_detail(jobs: &[JobInstance], screenshooters: &[String]) -> Vec<WorkerDetailRow> {
    index_jobs(jobs)
        .into_values()
        .rev()
        .map(|job| WorkerDetailRow {
            job_id: job.job_id,
            workers: screenshooters
                .iter()
                .map(|worker| WorkerReport {
                    worker: worker.clone(),
                    reported: job.has_reported(worker),
                })
                .collect(),
        })
        .collect()
}
