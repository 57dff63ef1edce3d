use std::path::PathBuf;

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::error::{PulseError, Result};
use crate::types::StatusVocabulary;

#[derive(Deserialize, Default)]
pub struct Config {
    pub base_url: Option<String>,
    pub email: Option<String>,
    pub api_token: Option<String>,
    pub default_user: Option<String>,
    #[serde(default)]
    pub projects: Vec<String>,
    #[serde(default)]
    pub analysis: AnalysisParams,
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            return Ok(Config::default());
        }

        let contents =
            std::fs::read_to_string(&config_path).map_err(|e| PulseError::ConfigRead {
                path: config_path.clone(),
                source: e,
            })?;

        toml::from_str(&contents).map_err(|e| PulseError::ConfigParse {
            path: config_path,
            source: e,
        })
    }

    pub fn config_path() -> Result<PathBuf> {
        ProjectDirs::from("", "", "devpulse")
            .map(|dirs| dirs.config_dir().join("config.toml"))
            .ok_or(PulseError::NoConfigDir)
    }

    pub fn cache_dir() -> Result<PathBuf> {
        ProjectDirs::from("", "", "devpulse")
            .map(|dirs| dirs.cache_dir().to_path_buf())
            .ok_or(PulseError::NoConfigDir)
    }

    /// Get API token with env var taking precedence over config file
    pub fn api_token(&self) -> Result<String> {
        if let Ok(token) = std::env::var("JIRA_API_TOKEN") {
            return Ok(token);
        }

        self.api_token.clone().ok_or(PulseError::MissingApiToken)
    }

    pub fn base_url(&self) -> Result<String> {
        self.base_url.clone().ok_or(PulseError::MissingBaseUrl)
    }

    /// Get subject user, preferring explicit argument over default
    pub fn resolve_user(&self, explicit: Option<&str>) -> Result<String> {
        explicit
            .map(String::from)
            .or_else(|| self.default_user.clone())
            .ok_or(PulseError::MissingSubject)
    }
}

/// Tunable analyzer constants. Every threshold the analyzers use lives here
/// with its default, so deployments can adjust them without code changes.
#[derive(Deserialize, Serialize, Clone, Debug)]
#[serde(default)]
pub struct AnalysisParams {
    /// Minimum events in an hour bucket before it can be a peak/danger hour.
    pub min_hour_samples: usize,
    /// Optimal concurrent-load band, inclusive.
    pub optimal_load_min: usize,
    pub optimal_load_max: usize,
    /// Below this many items the burnout scorer reports insufficient data.
    pub burnout_min_samples: usize,
    /// Below this many items the chemistry analyzer reports insufficient data.
    pub chemistry_min_items: usize,
    /// Monte Carlo trial count for sprint prediction.
    pub monte_carlo_trials: u32,
    /// Default TTL for cached analyzer output.
    pub cache_ttl_hours: i64,
    /// Concurrent changelog fetches against the tracker API.
    pub fetch_parallelism: usize,
    /// Default lookback window for history fetches.
    pub since_days: i64,
    pub in_progress_statuses: Vec<String>,
    pub in_review_statuses: Vec<String>,
    pub done_statuses: Vec<String>,
    pub defect_labels: Vec<String>,
}

impl Default for AnalysisParams {
    fn default() -> Self {
        Self {
            min_hour_samples: 5,
            optimal_load_min: 5,
            optimal_load_max: 9,
            burnout_min_samples: 5,
            chemistry_min_items: 10,
            monte_carlo_trials: 1000,
            cache_ttl_hours: 12,
            fetch_parallelism: 4,
            since_days: 180,
            in_progress_statuses: vec!["in progress".into(), "in development".into()],
            in_review_statuses: vec!["in review".into(), "code review".into()],
            done_statuses: vec!["done".into(), "closed".into(), "resolved".into()],
            defect_labels: vec![
                "bug".into(),
                "defect".into(),
                "regression".into(),
                "hotfix".into(),
            ],
        }
    }
}

impl AnalysisParams {
    pub fn vocabulary(&self) -> StatusVocabulary {
        StatusVocabulary::new(
            &self.in_progress_statuses,
            &self.in_review_statuses,
            &self.done_statuses,
            &self.defect_labels,
        )
    }
}
