use std::collections::HashMap;

use serde::Serialize;

use crate::services::schedule::types::{AnalysisSnapshot, JobInstance};
use crate::time::epoch_seconds_to_rfc3339;

#[derive(Debug, Clone, PartialEq, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisListing {
    pub job_id: u64,
    pub cron_id: u64,
    pub url: Option<String>,
    pub last_scheduled_sec: Option<f64>,
    pub scheduled_at: Option<String>,
    pub analysis_dir: String,
}

/// Archive directory of a job's analysis, e.g. `00000000000000000042` for
/// `jobs/00000000000000000042/analysis.zip`.
pub fn analysis_dir(job_id: u64, analysis_file: Option<&str>) -> String {
    analysis_file
        .and_then(|file| file.split('/').nth(1))
        .map(str::trim)
        .filter(|segment| !segment.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| format!("{job_id:020}"))
}

fn has_published_file(snapshot: &AnalysisSnapshot) -> bool {
    snapshot
        .analysis_file
        .as_deref()
        .is_some_and(|file| !file.trim().is_empty())
}

/// Finished analyses with a published archive, in upstream order.
pub fn finished_analyses(
    jobs: &[JobInstance],
    analyses: &[AnalysisSnapshot],
) -> Vec<AnalysisListing> {
    let jobs_by_id: HashMap<u64, &JobInstance> = jobs.iter().map(|job| (job.job_id, job)).collect();
    analyses
        .iter()
        .filter(|snapshot| snapshot.finished && has_published_file(snapshot))
        .map(|snapshot| {
            let job = jobs_by_id.get(&snapshot.job_id);
            AnalysisListing {
                job_id: snapshot.job_id,
                cron_id: job.map(|job| job.cron_id).unwrap_or(snapshot.cron_id),
                url: job.map(|job| job.url.clone()),
                last_scheduled_sec: job.map(|job| job.last_scheduled_sec),
                scheduled_at: job.and_then(|job| epoch_seconds_to_rfc3339(job.last_scheduled_sec)),
                analysis_dir: analysis_dir(snapshot.job_id, snapshot.analysis_file.as_deref()),
            }
        })
        .collect()
}

/// The listing entry for `job_id`, if its analysis is finished and published.
pub fn find_finished(
    jobs: &[JobInstance],
    analyses: &[AnalysisSnapshot],
    job_id: u64,
) -> Option<AnalysisListing> {
    finished_analyses(jobs, analyses)
        .into_iter()
        .find(|listing| listing.job_id == job_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{analysis, job};

    #[test]
    fn archive_dir_comes_from_the_published_path() {
        assert_eq!(
            analysis_dir(42, Some("jobs/00000000000000000042/analysis.zip")),
            "00000000000000000042"
        );
        assert_eq!(analysis_dir(42, None), "00000000000000000042");
        assert_eq!(analysis_dir(7, Some("analysis.zip")), "00000000000000000007");
    }

    #[test]
    fn lists_only_finished_and_published() {
        let jobs = vec![job(1, 1, 2.0, &[]), job(1, 2, 2.0, &[])];
        let mut unpublished = analysis(2, true, 1);
        unpublished.analysis_file = None;
        let analyses = vec![
            analysis(1, true, 1),
            unpublished,
            analysis(3, false, 0),
            analysis(9, true, 1),
        ];

        let listing = finished_analyses(&jobs, &analyses);
        let ids: Vec<u64> = listing.iter().map(|entry| entry.job_id).collect();
        assert_eq!(ids, vec![1, 9]);
        assert_eq!(listing[0].url.as_deref(), Some("https://example.org/1"));
        // Job 9 is unknown to the scheduler listing but still shown.
        assert!(listing[1].url.is_none());
        assert!(find_finished(&jobs, &analyses, 2).is_none());
        assert!(find_finished(&jobs, &analyses, 1).is_some());
    }
}
