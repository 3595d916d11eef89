//! Application configuration: env vars > config file > defaults

use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Directory for the rotating log files
    pub log_dir: PathBuf,
    /// `EnvFilter` directives used when `RUST_LOG` is unset
    pub log_filter: String,
    /// Seed catalogue to load instead of the bundled one
    pub seed_path: Option<PathBuf>,
    pub poll_interval_ms: u64,
    /// Length of every track played by the simulated media engine
    pub simulated_track_ms: u64,
    pub ar_supported: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_dir: PathBuf::from(".logs"),
            log_filter: "faunadex=debug,warn".to_string(),
            seed_path: None,
            poll_interval_ms: 100,
            simulated_track_ms: 30_000,
            ar_supported: true,
        }
    }
}

impl Config {
    pub fn load(config_path: Option<PathBuf>) -> Result<Self, ConfigError> {
        Self::load_with_env(config_path, |key| std::env::var(key).ok())
    }

    /// Like [`load`](Self::load) with environment lookups going through `env`
    pub fn load_with_env(
        config_path: Option<PathBuf>,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        let path = config_path.unwrap_or_else(Self::default_config_path);
        if path.exists() {
            let contents =
                std::fs::read_to_string(&path).map_err(|e| ConfigError::Read(path.clone(), e))?;
            config = serde_json::from_str(&contents).map_err(|e| ConfigError::Parse(path.clone(), e))?;
        }

        if let Some(dir) = env("FAUNADEX_LOG_DIR") {
            config.log_dir = PathBuf::from(dir);
        }
        if let Some(filter) = env("FAUNADEX_LOG_FILTER") {
            config.log_filter = filter;
        }
        if let Some(seed) = env("FAUNADEX_SEED_PATH") {
            config.seed_path = Some(PathBuf::from(seed));
        }
        if let Some(raw) = env("FAUNADEX_POLL_INTERVAL_MS") {
            config.poll_interval_ms = raw.trim().parse().map_err(|_| ConfigError::InvalidValue {
                key: "FAUNADEX_POLL_INTERVAL_MS",
                value: raw,
            })?;
        }

        if config.poll_interval_ms == 0 {
            return Err(ConfigError::InvalidValue {
                key: "poll_interval_ms",
                value: "0".to_string(),
            });
        }

        Ok(config)
    }

    /// ~/.config/faunadex/config.json
    pub fn default_config_path() -> PathBuf {
        let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
        PathBuf::from(home)
            .join(".config")
            .join("faunadex")
            .join("config.json")
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{}': {}", .0.display(), .1)]
    Read(PathBuf, std::io::Error),

    #[error("Failed to parse config file '{}': {}", .0.display(), .1)]
    Parse(PathBuf, serde_json::Error),

    #[error("Invalid value '{value}' for {key}")]
    InvalidValue { key: &'static str, value: String },
}
