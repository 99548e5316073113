use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

use crate::cache::ResponseCache;
use crate::github::DEFAULT_API_BASE;

#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub settings: Settings,
    #[serde(default)]
    pub harvest: HarvestConfig,
    #[serde(default)]
    pub cache: CacheConfig,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct Settings {
    #[serde(default = "default_api_base")]
    pub api_base: String,
    #[serde(default = "default_output")]
    pub output: PathBuf,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct HarvestConfig {
    /// Issue labels in query form (`+` or `_` stand for spaces)
    #[serde(default = "default_labels")]
    pub labels: Vec<String>,
    #[serde(default = "default_request_delay_ms")]
    pub request_delay_ms: u64,
    #[serde(default = "default_issue_lookback_days")]
    pub issue_lookback_days: u32,
    /// Number of owners kept in abbreviated runs
    #[serde(default = "default_abbreviated_limit")]
    pub abbreviated_limit: usize,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct CacheConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_cache_ttl")]
    pub ttl_hours: u32,
    #[serde(default = "default_compression_enabled")]
    pub compression_enabled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cache_dir: Option<PathBuf>,
}

impl Config {
    /// Load configuration from the default location or a specified path.
    ///
    /// A missing file at the default location yields the defaults; a missing
    /// file that was asked for explicitly is an error.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config_path = match path {
            Some(p) => p.to_path_buf(),
            None => {
                let default_path = Self::default_config_path()?;
                if !default_path.exists() {
                    info!("No configuration at {:?}, using defaults", default_path);
                    let mut config = Config::default();
                    config.expand_paths()?;
                    return Ok(config);
                }
                default_path
            }
        };

        let contents = std::fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read config from {:?}", config_path))?;

        let mut config: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config from {:?}", config_path))?;

        config.expand_paths()?;
        Ok(config)
    }

    /// Get the default configuration file path
    pub fn default_config_path() -> Result<PathBuf> {
        let home = dirs::home_dir().context("Could not determine home directory")?;
        Ok(home.join(".config").join("gh-harvest").join("config.toml"))
    }

    /// Delay between two consecutive requests
    pub fn request_delay(&self) -> Duration {
        Duration::from_millis(self.harvest.request_delay_ms)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.settings.timeout_secs)
    }

    /// The response cache, when enabled
    pub fn response_cache(&self) -> Result<Option<ResponseCache>> {
        if !self.cache.enabled {
            return Ok(None);
        }

        let dir = match &self.cache.cache_dir {
            Some(dir) => dir.clone(),
            None => ResponseCache::default_dir()?,
        };

        Ok(Some(ResponseCache::new(
            dir,
            self.cache.ttl_hours,
            self.cache.compression_enabled,
        )))
    }

    fn expand_paths(&mut self) -> Result<()> {
        self.settings.output = expand_tilde(&self.settings.output)?;
        if let Some(dir) = &self.cache.cache_dir {
            self.cache.cache_dir = Some(expand_tilde(dir)?);
        }
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            settings: Settings::default(),
            harvest: HarvestConfig::default(),
            cache: CacheConfig::default(),
        }
    }
}

/// Expand tilde in paths to home directory
fn expand_tilde(path: &Path) -> Result<PathBuf> {
    if let Some(rest) = path.to_str().and_then(|s| s.strip_prefix("~/")) {
        let home = dirs::home_dir().context("Could not determine home directory")?;
        return Ok(home.join(rest));
    }
    Ok(path.to_path_buf())
}

// Default value functions
fn default_api_base() -> String {
    DEFAULT_API_BASE.to_string()
}

fn default_output() -> PathBuf {
    PathBuf::from("~/gh-harvest/report.json")
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_labels() -> Vec<String> {
    vec![
        "good+first+issue".to_string(),
        "help+wanted".to_string(),
        "documentation".to_string(),
    ]
}

fn default_request_delay_ms() -> u64 {
    1000
}

fn default_issue_lookback_days() -> u32 {
    365
}

fn default_abbreviated_limit() -> usize {
    3
}

fn default_cache_ttl() -> u32 {
    24
}

fn default_compression_enabled() -> bool {
    true
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            api_base: default_api_base(),
            output: default_output(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for HarvestConfig {
    fn default() -> Self {
        HarvestConfig {
            labels: default_labels(),
            request_delay_ms: default_request_delay_ms(),
            issue_lookback_days: default_issue_lookback_days(),
            abbreviated_limit: default_abbreviated_limit(),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        CacheConfig {
            enabled: false,
            ttl_hours: default_cache_ttl(),
            compression_enabled: default_compression_enabled(),
            cache_dir: None,
        }
    }
}
