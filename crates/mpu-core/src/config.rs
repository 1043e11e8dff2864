use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use crate::retry::RetryPolicy;
use crate::transport::CurlOptions;

/// Retry policy parameters (optional section in config.toml).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Maximum number of attempts per part (including the first).
    pub max_attempts: u32,
    /// Base delay in seconds for exponential backoff (e.g. 0.25 = 250ms).
    pub base_delay_secs: f64,
    /// Maximum backoff delay in seconds.
    pub max_delay_secs: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay_secs: 1.0,
            max_delay_secs: 10,
        }
    }
}

impl RetryConfig {
    pub fn to_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.max_attempts.max(1),
            base_delay: Duration::from_secs_f64(self.base_delay_secs.max(0.0)),
            max_delay: Duration::from_secs(self.max_delay_secs),
        }
    }
}

/// Global configuration loaded from `~/.config/mpu/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MpuConfig {
    /// Base URL of the upload session API (endpoints are joined under it).
    pub api_base_url: String,
    /// Bucket sent with every initiate request.
    pub bucket: String,
    /// Optional bearer token for the session API.
    #[serde(default)]
    pub auth_token: Option<String>,
    /// Maximum parts uploaded at once within a wave (None = whole wave at once).
    #[serde(default)]
    pub max_concurrent_parts: Option<usize>,
    /// Ceiling on waves per session; guards against a remote that never converges.
    pub max_waves: u32,
    /// Consecutive waves without a newly confirmed part before the upload fails.
    pub max_stalled_waves: u32,
    /// Connect timeout for every HTTP call, in seconds.
    pub connect_timeout_secs: u64,
    /// Abort a transfer that stays under 1 KiB/s for this many seconds.
    pub low_speed_time_secs: u64,
    /// Optional retry policy; if missing, built-in defaults are used.
    #[serde(default)]
    pub retry: Option<RetryConfig>,
}

impl Default for MpuConfig {
    fn default() -> Self {
        Self {
            api_base_url: "http://127.0.0.1:8080/api/".to_string(),
            bucket: "uploads".to_string(),
            auth_token: None,
            max_concurrent_parts: None,
            max_waves: 1000,
            max_stalled_waves: 5,
            connect_timeout_secs: 30,
            low_speed_time_secs: 60,
            retry: None,
        }
    }
}

impl MpuConfig {
    pub fn retry_policy(&self) -> RetryPolicy {
        self.retry.clone().unwrap_or_default().to_policy()
    }

    pub fn curl_options(&self) -> CurlOptions {
        CurlOptions {
            connect_timeout: Duration::from_secs(self.connect_timeout_secs.max(1)),
            low_speed_time: Duration::from_secs(self.low_speed_time_secs.max(1)),
            ..CurlOptions::default()
        }
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("mpu")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<MpuConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = MpuConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data = fs::read_to_string(&path)?;
    let cfg: MpuConfig = toml::from_str(&data)?;
    Ok(cfg)
}
