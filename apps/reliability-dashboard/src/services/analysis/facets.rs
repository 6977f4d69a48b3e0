use std::collections::BTreeMap;

use serde::Serialize;

use super::filter::FilterSet;
use super::stats::average_or;
use super::types::{ComparisonRecord, FacetKind, IndicatorSet};

/// Accumulated `rmse` contributions per facet value.
///
/// A key is registered the first time any record carries it, even if the record is
/// excluded from that facet, so global and filtered passes expose the same identifiers.
#[derive(Debug, Default)]
struct FacetBuckets {
    resolution: BTreeMap<String, Vec<f64>>,
    platform: BTreeMap<String, Vec<f64>>,
    browser: BTreeMap<String, Vec<f64>>,
    platform_browser: BTreeMap<String, Vec<f64>>,
}

fn bucket<'m>(map: &'m mut BTreeMap<String, Vec<f64>>, key: &str) -> &'m mut Vec<f64> {
    map.entry(key.to_string()).or_default()
}

impl FacetBuckets {
    fn push(&mut self, record: &ComparisonRecord) {
        let keys = record.facet_keys();
        let rmse = record.rmse;

        let [pb1, pb2] = &keys.platform_browser;
        let [b1, b2] = keys.browser;
        let [p1, p2] = keys.platform;

        bucket(&mut self.resolution, &keys.resolution).push(rmse);

        let pb_distinct = pb1 != pb2;
        for key in [pb1, pb2] {
            let values = bucket(&mut self.platform_browser, key);
            if pb_distinct {
                values.push(rmse);
            }
        }

        let browser_distinct = b1 != b2;
        for key in [b1, b2] {
            let values = bucket(&mut self.browser, key);
            if browser_distinct {
                values.push(rmse);
            }
        }

        let platform_distinct = p1 != p2;
        for key in [p1, p2] {
            let values = bucket(&mut self.platform, key);
            if platform_distinct {
                values.push(rmse);
            }
        }
    }

    fn finish(self) -> IndicatorSet {
        fn averaged(map: BTreeMap<String, Vec<f64>>) -> BTreeMap<String, f64> {
            map.into_iter()
                .map(|(key, values)| {
                    let score = average_or(&values, 0.0);
                    (key, score)
                })
                .collect()
        }

        IndicatorSet {
            resolution: averaged(self.resolution),
            platform: averaged(self.platform),
            browser: averaged(self.browser),
            platform_browser: averaged(self.platform_browser),
        }
    }
}

/// Mean `rmse` per resolution, platform, browser and platform×browser over `records`.
///
/// Comparisons whose two sides agree on a facet do not contribute to that facet: a
/// chrome-vs-chrome record says nothing about chrome.
pub fn aggregate_indicators<'a, I>(records: I) -> IndicatorSet
where
    I: IntoIterator<Item = &'a ComparisonRecord>,
{
    let mut buckets = FacetBuckets::default();
    for record in records {
        buckets.push(record);
    }
    buckets.finish()
}

pub fn aggregate_filtered(records: &[ComparisonRecord], filters: &FilterSet) -> IndicatorSet {
    aggregate_indicators(records.iter().filter(|record| filters.matches(record)))
}

#[derive(Debug, Clone, PartialEq, Serialize, utoipa::ToSchema)]
pub struct FacetRanking {
    pub key: String,
    pub global: f64,
    pub filtered: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FacetRankings {
    pub resolution: Vec<FacetRanking>,
    pub platform: Vec<FacetRanking>,
    pub browser: Vec<FacetRanking>,
    pub platform_browser: Vec<FacetRanking>,
}

/// Worst offenders first: descending global score, ties by key.
pub fn rank_facet(
    global: &BTreeMap<String, f64>,
    filtered: &BTreeMap<String, f64>,
) -> Vec<FacetRanking> {
    let mut ranked: Vec<FacetRanking> = global
        .iter()
        .map(|(key, score)| FacetRanking {
            key: key.clone(),
            global: *score,
            filtered: filtered.get(key).copied().unwrap_or(0.0),
        })
        .collect();
    ranked.sort_by(|a, b| b.global.total_cmp(&a.global).then_with(|| a.key.cmp(&b.key)));
    ranked
}

pub fn rank_all(global: &IndicatorSet, filtered: &IndicatorSet) -> FacetRankings {
    let mut rankings = FacetRankings::default();
    for kind in FacetKind::ALL {
        let ranked = rank_facet(global.facet(kind), filtered.facet(kind));
        match kind {
            FacetKind::Resolution => rankings.resolution = ranked,
            FacetKind::Platform => rankings.platform = ranked,
            FacetKind::Browser => rankings.browser = ranked,
            FacetKind::PlatformBrowser => rankings.platform_browser = ranked,
        }
    }
    rankings
}

/// Records passing `filters`, largest `rmse` first.
pub fn ranked_records(
    records: &[ComparisonRecord],
    filters: &FilterSet,
    limit: Option<usize>,
) -> Vec<ComparisonRecord> {
    let mut matching: Vec<ComparisonRecord> = records
        .iter()
        .filter(|record| filters.matches(record))
        .cloned()
        .collect();
    matching.sort_by(|a, b| b.rmse.total_cmp(&a.rmse));
    if let Some(limit) = limit {
        matching.truncate(limit);
    }
    matching
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::record;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-12
    }

    fn worked_example() -> Vec<ComparisonRecord> {
        vec![
            record("1920x1080", "full", ("linux", "chrome"), ("mac", "chrome"), 0.02),
            record("1920x1080", "full", ("linux", "chrome"), ("linux", "firefox"), 0.05),
        ]
    }

    #[test]
    fn worked_example_scores() {
        let indicators = aggregate_indicators(&worked_example());

        assert!(close(indicators.resolution["1920x1080.full"], 0.035));
        assert!(close(indicators.browser["chrome"], 0.05));
        assert!(close(indicators.browser["firefox"], 0.05));
        assert!(close(indicators.platform["linux"], 0.02));
        assert!(close(indicators.platform["mac"], 0.02));
        assert!(close(indicators.platform_browser["linux.chrome"], 0.035));
        assert!(close(indicators.platform_browser["mac.chrome"], 0.02));
        assert!(close(indicators.platform_browser["linux.firefox"], 0.05));
    }

    #[test]
    fn self_comparisons_only_reach_the_resolution_bucket() {
        let records = vec![record("800x600", "top", ("linux", "chrome"), ("linux", "chrome"), 0.3)];
        let indicators = aggregate_indicators(&records);

        assert!(close(indicators.resolution["800x600.top"], 0.3));
        // Keys stay visible with a zero score.
        assert_eq!(indicators.platform.get("linux"), Some(&0.0));
        assert_eq!(indicators.browser.get("chrome"), Some(&0.0));
        assert_eq!(indicators.platform_browser.get("linux.chrome"), Some(&0.0));
    }

    #[test]
    fn aggregation_is_order_independent() {
        let records = vec![
            record("1x1", "full", ("linux", "chrome"), ("mac", "safari"), 0.25),
            record("1x1", "full", ("mac", "chrome"), ("mac", "firefox"), 0.5),
            record("2x2", "top", ("windows", "edge"), ("linux", "edge"), 0.125),
            record("2x2", "top", ("linux", "chrome"), ("linux", "chrome"), 0.75),
        ];
        let expected = aggregate_indicators(&records);

        let mut reversed = records.clone();
        reversed.reverse();
        assert_eq!(aggregate_indicators(&reversed), expected);

        let rotated: Vec<_> = records[2..].iter().chain(&records[..2]).cloned().collect();
        assert_eq!(aggregate_indicators(&rotated), expected);
    }

    #[test]
    fn filtered_pass_keeps_only_matching_records() {
        let records = worked_example();
        let filters = FilterSet::from_values(["mac"]);
        let filtered = aggregate_filtered(&records, &filters);

        assert!(close(filtered.resolution["1920x1080.full"], 0.02));
        assert!(!filtered.browser.contains_key("firefox"));
        assert!(close(filtered.platform["mac"], 0.02));
    }

    #[test]
    fn ranking_puts_worst_offenders_first() {
        let records = worked_example();
        let global = aggregate_indicators(&records);
        let filtered = aggregate_filtered(&records, &FilterSet::from_values(["mac"]));
        let rankings = rank_all(&global, &filtered);

        let keys: Vec<&str> = rankings
            .platform_browser
            .iter()
            .map(|entry| entry.key.as_str())
            .collect();
        assert_eq!(keys, vec!["linux.firefox", "linux.chrome", "mac.chrome"]);

        assert_eq!(rankings.browser[0].key, "chrome");
        assert_eq!(rankings.browser[1].key, "firefox");
        // Absent from the filtered pass reads as zero.
        assert_eq!(rankings.browser[1].filtered, 0.0);
    }

    #[test]
    fn ranking_ties_break_by_key() {
        let global = BTreeMap::from([
            ("b".to_string(), 0.5),
            ("a".to_string(), 0.5),
            ("c".to_string(), 0.9),
        ]);
        let ranked = rank_facet(&global, &BTreeMap::new());
        let keys: Vec<&str> = ranked.iter().map(|entry| entry.key.as_str()).collect();
        assert_eq!(keys, vec!["c", "a", "b"]);
    }

    #[test]
    fn ranked_records_sort_descending_and_truncate() {
        let records = vec![
            record("1x1", "full", ("linux", "chrome"), ("mac", "chrome"), 0.1),
            record("1x1", "full", ("linux", "chrome"), ("mac", "safari"), 0.7),
            record("1x1", "full", ("windows", "edge"), ("mac", "safari"), 0.4),
        ];
        let top = ranked_records(&records, &FilterSet::new(), Some(2));
        assert_eq!(top.len(), 2);
        assert_eq!(top[0].rmse, 0.7);
        assert_eq!(top[1].rmse, 0.4);

        let edge_only = ranked_records(&records, &FilterSet::from_values(["edge"]), None);
        assert_eq!(edge_only.len(), 1);
        assert_eq!(edge_only[0].browser1, "edge");
    }
}
