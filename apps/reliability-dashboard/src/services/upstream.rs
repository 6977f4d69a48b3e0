use anyhow::{Context, Result};
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::time::Duration;

use crate::services::analysis::types::AnalysisResult;

pub const JOBS_PATH: &str = "/job/submission";
pub const ANALYSES_PATH: &str = "/analysis";
pub const SCREENSHOOTER_UPTIME_PATH: &str = "/uptime";
pub const COMPARATOR_UPTIME_PATH: &str = "/uptime2";

/// Raw response bodies of one status poll, kept as bytes so they can be hashed before parsing.
#[derive(Debug, Clone, Default)]
pub struct StatusBodies {
    pub jobs: Vec<u8>,
    pub analyses: Vec<u8>,
    pub screenshooters: Vec<u8>,
    pub comparators: Vec<u8>,
}

/// HTTP client for the screenshot scheduler API.
#[derive(Debug, Clone)]
pub struct UpstreamClient {
    base_url: String,
    http: Client,
}

pub fn build_http_client(timeout: Duration) -> Result<Client> {
    Client::builder()
        .timeout(timeout)
        .build()
        .context("failed to build upstream HTTP client")
}

pub fn analysis_result_path(analysis_dir: &str) -> String {
    format!("/unzip/jobs/{analysis_dir}/analysis.zip/analysis.json")
}

impl UpstreamClient {
    pub fn new(base_url: impl Into<String>, http: Client) -> Self {
        Self {
            base_url: base_url.into(),
            http,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }

    async fn fetch_bytes(&self, path: &str) -> Result<Vec<u8>> {
        let url = self.url(path);
        let response = self
            .http
            .get(&url)
            .send()
            .await
            .with_context(|| format!("GET {url} failed"))?
            .error_for_status()
            .with_context(|| format!("GET {url} returned an error status"))?;
        let body = response
            .bytes()
            .await
            .with_context(|| format!("failed to read body of {url}"))?;
        Ok(body.to_vec())
    }

    async fn fetch_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let body = self.fetch_bytes(path).await?;
        serde_json::from_slice(&body).with_context(|| format!("invalid JSON from {path}"))
    }

    pub async fn fetch_status_bodies(&self) -> Result<StatusBodies> {
        let (jobs, analyses, screenshooters, comparators) = tokio::try_join!(
            self.fetch_bytes(JOBS_PATH),
            self.fetch_bytes(ANALYSES_PATH),
            self.fetch_bytes(SCREENSHOOTER_UPTIME_PATH),
            self.fetch_bytes(COMPARATOR_UPTIME_PATH),
        )?;
        Ok(StatusBodies {
            jobs,
            analyses,
            screenshooters,
            comparators,
        })
    }

    pub async fn fetch_analysis_result(&self, analysis_dir: &str) -> Result<AnalysisResult> {
        self.fetch_json(&analysis_result_path(analysis_dir)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn joins_paths_onto_the_base_url() {
        let client = UpstreamClient::new("http://scheduler:5000/", Client::new());
        assert_eq!(client.url(JOBS_PATH), "http://scheduler:5000/job/submission");
        assert_eq!(
            client.url(&analysis_result_path("00000000000000000042")),
            "http://scheduler:5000/unzip/jobs/00000000000000000042/analysis.zip/analysis.json"
        );
    }
}
