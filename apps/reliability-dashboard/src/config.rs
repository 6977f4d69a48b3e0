use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::PathBuf;
use url::Url;

const DEFAULT_SETUP_CONFIG_PATH: &str = "/etc/reliability-dashboard/config.json";
const DEFAULT_UPSTREAM_BASE_URL: &str = "http://127.0.0.1:5000";

pub(crate) fn setup_config_path() -> PathBuf {
    if let Ok(path) = std::env::var("DASHBOARD_SETUP_CONFIG_PATH") {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return PathBuf::from(trimmed);
        }
    }
    PathBuf::from(DEFAULT_SETUP_CONFIG_PATH)
}

#[derive(Debug, Clone, Default, Deserialize)]
struct SetupConfigOverrides {
    #[serde(default)]
    upstream_base_url: Option<String>,
    #[serde(default)]
    status_poll_interval_seconds: Option<u64>,
    #[serde(default)]
    upstream_timeout_seconds: Option<u64>,
    #[serde(default)]
    stale_after_seconds: Option<u64>,
    #[serde(default)]
    cors_origins: Option<Vec<String>>,
}

fn load_setup_config_overrides() -> Option<SetupConfigOverrides> {
    let path = setup_config_path();
    if !path.exists() {
        return None;
    }
    let contents = match std::fs::read_to_string(&path) {
        Ok(contents) => contents,
        Err(err) => {
            tracing::warn!(
                path = %path.display(),
                error = %err,
                "failed to read setup config; using env defaults"
            );
            return None;
        }
    };
    match serde_json::from_str(&contents) {
        Ok(value) => Some(value),
        Err(err) => {
            tracing::warn!(
                path = %path.display(),
                error = %err,
                "failed to parse setup config; using env defaults"
            );
            None
        }
    }
}

#[derive(Debug, Clone)]
pub struct DashboardConfig {
    /// Scheduler API root, without a trailing slash.
    pub upstream_base_url: String,
    pub status_poll_interval_seconds: u64,
    pub upstream_timeout_seconds: u64,
    pub stale_after_seconds: u64,
    pub cors_origins: Vec<String>,
}

impl DashboardConfig {
    /// Env wins over the setup file, and `cli_upstream` wins over both.
    pub fn from_env(cli_upstream: Option<String>) -> Result<Self> {
        let overrides = load_setup_config_overrides().unwrap_or_default();
        Self::resolve(&overrides, cli_upstream)
    }

    fn resolve(overrides: &SetupConfigOverrides, cli_upstream: Option<String>) -> Result<Self> {
        let upstream = cli_upstream
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .or_else(|| env_optional_string("DASHBOARD_UPSTREAM_BASE_URL"))
            .or_else(|| {
                overrides
                    .upstream_base_url
                    .as_deref()
                    .map(str::trim)
                    .filter(|value| !value.is_empty())
                    .map(str::to_string)
            })
            .unwrap_or_else(|| DEFAULT_UPSTREAM_BASE_URL.to_string());
        let upstream_base_url = normalize_upstream_url(&upstream)?;

        let status_poll_interval_seconds = env_optional_u64("DASHBOARD_STATUS_POLL_INTERVAL_SECONDS")
            .or(overrides.status_poll_interval_seconds)
            .unwrap_or(10)
            .clamp(1, 3600);
        let upstream_timeout_seconds = env_optional_u64("DASHBOARD_UPSTREAM_TIMEOUT_SECONDS")
            .or(overrides.upstream_timeout_seconds)
            .unwrap_or(15)
            .clamp(1, 300);
        let stale_after_seconds = env_optional_u64("DASHBOARD_STALE_AFTER_SECONDS")
            .or(overrides.stale_after_seconds)
            .unwrap_or(300)
            .max(1);
        let cors_origins = env_optional_string("DASHBOARD_CORS_ORIGINS")
            .map(|raw| split_list(&raw))
            .or_else(|| overrides.cors_origins.clone())
            .unwrap_or_else(|| {
                vec![
                    "http://127.0.0.1:3000".to_string(),
                    "http://localhost:3000".to_string(),
                ]
            });

        Ok(Self {
            upstream_base_url,
            status_poll_interval_seconds,
            upstream_timeout_seconds,
            stale_after_seconds,
            cors_origins,
        })
    }
}

fn normalize_upstream_url(raw: &str) -> Result<String> {
    let parsed = Url::parse(raw.trim())
        .with_context(|| format!("DASHBOARD_UPSTREAM_BASE_URL is not a valid URL: {raw}"))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        anyhow::bail!("DASHBOARD_UPSTREAM_BASE_URL must use http or https (got {})", parsed.scheme());
    }
    Ok(parsed.as_str().trim_end_matches('/').to_string())
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
        .collect()
}

fn env_optional_string(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn env_optional_u64(key: &str) -> Option<u64> {
    env_optional_string(key).and_then(|value| value.parse::<u64>().ok())
}
