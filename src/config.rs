//! Toolkit settings
//!
//! Resolved in layers: built-in defaults, then an optional JSON file, then
//! `REDDIT_TOOLKIT_*` environment variables. The file is `--config`, else
//! `REDDIT_TOOLKIT_CONFIG`, else the default location if it exists.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

use crate::error::AppError;

/// Hard cap on posts returned by a single search
pub const MAX_SEARCH_LIMIT: u32 = 150;

pub const DEFAULT_MAX_RESULTS: u32 = 80;
pub const DEFAULT_BASE_URL: &str = "https://www.reddit.com";
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

pub const ENV_CONFIG_PATH: &str = "REDDIT_TOOLKIT_CONFIG";
const ENV_USER_AGENT: &str = "REDDIT_TOOLKIT_USER_AGENT";
const ENV_MAX_RESULTS: &str = "REDDIT_TOOLKIT_MAX_RESULTS";
const ENV_BASE_URL: &str = "REDDIT_TOOLKIT_BASE_URL";
const ENV_TIMEOUT_SECS: &str = "REDDIT_TOOLKIT_TIMEOUT_SECS";

pub fn default_user_agent() -> String {
    concat!("Mozilla/5.0 (compatible; reddit-toolkit/", env!("CARGO_PKG_VERSION"), ")").to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// User-Agent header sent with each Reddit request
    pub user_agent: String,
    /// Posts returned by search when no limit is given
    pub max_results: u32,
    /// Root of the Reddit JSON API
    pub base_url: String,
    pub timeout_secs: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
            max_results: DEFAULT_MAX_RESULTS,
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl Settings {
    /// Load settings from `path` (or the default location) and the environment
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let explicit = chosen_file(path, std::env::var_os(ENV_CONFIG_PATH));

        let mut settings = match explicit {
            Some(p) => Self::from_file(&p)?,
            None => match config_path() {
                Ok(p) if p.exists() => Self::from_file(&p)?,
                _ => Self::default(),
            },
        };

        settings.apply_env(|key| std::env::var(key).ok())?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn from_file(path: &Path) -> Result<Self, AppError> {
        let data = fs::read_to_string(path).map_err(|e| {
            AppError::Config(format!("Failed to read config file {}: {}", path.display(), e))
        })?;

        serde_json::from_str(&data).map_err(|e| {
            AppError::Config(format!("Failed to parse config file {}: {}", path.display(), e))
        })
    }

    /// Overlay values from the environment; `lookup` is injectable for tests
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(ua) = get(ENV_USER_AGENT) {
            self.user_agent = ua;
        }
        if let Some(raw) = get(ENV_MAX_RESULTS) {
            self.max_results = raw.trim().parse().map_err(|_| {
                AppError::Config(format!("{} must be an integer, got '{}'", ENV_MAX_RESULTS, raw))
            })?;
        }
        if let Some(base) = get(ENV_BASE_URL) {
            self.base_url = base;
        }
        if let Some(raw) = get(ENV_TIMEOUT_SECS) {
            self.timeout_secs = raw.trim().parse().map_err(|_| {
                AppError::Config(format!("{} must be an integer, got '{}'", ENV_TIMEOUT_SECS, raw))
            })?;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), AppError> {
        if self.user_agent.trim().is_empty() {
            return Err(AppError::Config("user_agent cannot be empty".to_string()));
        }
        if !(1..=MAX_SEARCH_LIMIT).contains(&self.max_results) {
            return Err(AppError::Config(format!(
                "max_results must be between 1 and {}, got {}",
                MAX_SEARCH_LIMIT, self.max_results
            )));
        }
        if self.timeout_secs == 0 {
            return Err(AppError::Config("timeout_secs must be at least 1".to_string()));
        }
        match Url::parse(&self.base_url) {
            Ok(u) if u.scheme() == "http" || u.scheme() == "https" => Ok(()),
            _ => Err(AppError::Config(format!(
                "base_url must be an http(s) URL, got '{}'",
                self.base_url
            ))),
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Settings file named by `--config` or `REDDIT_TOOLKIT_CONFIG`, flag first
fn chosen_file(flag: Option<&Path>, env_value: Option<std::ffi::OsString>) -> Option<PathBuf> {
    flag.map(Path::to_path_buf)
        .or_else(|| env_value.filter(|v| !v.is_empty()).map(PathBuf::from))
}

/// Default location of the settings file
pub fn config_path() -> Result<PathBuf> {
    let config_dir = dirs::config_dir().context("Cannot determine config directory")?;

    Ok(config_dir.join("reddit-toolkit").join("config.json"))
}
