use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::ConfigError;

const APP_DIR: &str = "rss-aggregator";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AggregatorConfig {
    pub tick_interval_seconds: u64,
    pub aggregate_interval_minutes: u64,
    pub request_timeout_seconds: u64,
    pub max_redirects: usize,
    pub user_agent: String,
}

impl Default for AggregatorConfig {
    fn default() -> Self {
        Self {
            tick_interval_seconds: 5,
            aggregate_interval_minutes: 30,
            request_timeout_seconds: 10,
            max_redirects: 5,
            user_agent: format!("rss-aggregator/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// Timing knobs handed to the scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduleConfig {
    /// Delay between the end of one cycle and the start of the next.
    pub tick_interval: Duration,
    /// Minimum time before the same source is fetched again.
    pub aggregate_interval: Duration,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        AggregatorConfig::default().schedule()
    }
}

impl AggregatorConfig {
    /// Directory holding config.json, feeds.json and the store.
    pub fn app_dir() -> Result<PathBuf, ConfigError> {
        let config_dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        let app_dir = config_dir.join(APP_DIR);
        std::fs::create_dir_all(&app_dir)?;
        Ok(app_dir)
    }

    /// Loads the configuration from `path`, falling back to (and writing) the defaults.
    pub fn load(path: &Path) -> Self {
        match Self::load_from_file(path) {
            Ok(config) => config,
            Err(err) => {
                warn!(error = %err, path = %path.display(), "could not load config, using defaults");
                let default_config = Self::default();
                if let Err(save_err) = default_config.save(path) {
                    warn!(error = %save_err, path = %path.display(), "could not write default config");
                }
                default_config
            }
        }
    }

    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config = serde_json::from_str(&content)?;
        Ok(config)
    }

    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    pub fn schedule(&self) -> ScheduleConfig {
        ScheduleConfig {
            tick_interval: Duration::from_secs(self.tick_interval_seconds.max(1)),
            aggregate_interval: Duration::from_secs(self.aggregate_interval_minutes * 60),
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }
}
