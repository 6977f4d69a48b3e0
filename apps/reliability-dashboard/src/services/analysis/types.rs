use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// One pairwise screenshot comparison produced by the comparator.
///
/// `(platform1, browser1)` and `(platform2, browser2)` label the two sides of an unordered
/// pair; neither side is "first".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonRecord {
    pub resolution: String,
    pub print_scope: String,
    pub hostname1: String,
    pub hostname2: String,
    pub platform1: String,
    pub platform2: String,
    pub browser1: String,
    pub browser2: String,
    pub rmse: f64,
}

impl ComparisonRecord {
    pub fn facet_keys(&self) -> FacetKeys<'_> {
        FacetKeys {
            resolution: format!("{}.{}", self.resolution, self.print_scope),
            platform_browser: [
                format!("{}.{}", self.platform1, self.browser1),
                format!("{}.{}", self.platform2, self.browser2),
            ],
            browser: [&self.browser1, &self.browser2],
            platform: [&self.platform1, &self.platform2],
        }
    }
}

/// The seven grouping keys derived from one record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FacetKeys<'a> {
    pub resolution: String,
    pub platform_browser: [String; 2],
    pub browser: [&'a str; 2],
    pub platform: [&'a str; 2],
}

impl FacetKeys<'_> {
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        [
            self.resolution.as_str(),
            self.platform_browser[0].as_str(),
            self.platform_browser[1].as_str(),
            self.browser[0],
            self.browser[1],
            self.platform[0],
            self.platform[1],
        ]
        .into_iter()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub enum FacetKind {
    Resolution,
    Platform,
    Browser,
    PlatformBrowser,
}

impl FacetKind {
    pub const ALL: [FacetKind; 4] = [
        FacetKind::Resolution,
        FacetKind::Platform,
        FacetKind::Browser,
        FacetKind::PlatformBrowser,
    ];
}

/// Mean score per facet value, one mapping per facet kind.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct IndicatorSet {
    #[serde(default)]
    pub resolution: BTreeMap<String, f64>,
    #[serde(default)]
    pub platform: BTreeMap<String, f64>,
    #[serde(default)]
    pub browser: BTreeMap<String, f64>,
    #[serde(default)]
    pub platform_browser: BTreeMap<String, f64>,
}

impl IndicatorSet {
    pub fn facet(&self, kind: FacetKind) -> &BTreeMap<String, f64> {
        match kind {
            FacetKind::Resolution => &self.resolution,
            FacetKind::Platform => &self.platform,
            FacetKind::Browser => &self.browser,
            FacetKind::PlatformBrowser => &self.platform_browser,
        }
    }
}

/// The comparator's published `analysis.json`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    #[serde(default, deserialize_with = "crate::json::deserialize_or_none")]
    pub indicators: Option<IndicatorSet>,
    /// Records that fail to decode (e.g. `rmse: null` from a NaN) are dropped.
    #[serde(default, deserialize_with = "crate::json::deserialize_lenient_list")]
    pub records: Vec<ComparisonRecord>,
}
