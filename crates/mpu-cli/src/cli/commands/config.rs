//! `mpu config` – show where the config lives and what it resolves to.

use anyhow::Result;
use mpu_core::config::{self, MpuConfig};

pub fn run_config(cfg: &MpuConfig) -> Result<()> {
    println!("config file: {}", config::config_path()?.display());
    println!("api_base_url:         {}", cfg.api_base_url);
    println!("bucket:               {}", cfg.bucket);
    println!(
        "auth_token:           {}",
        if cfg.auth_token.is_some() { "(set)" } else { "(none)" }
    );
    println!(
        "max_concurrent_parts: {}",
        cfg.max_concurrent_parts
            .map(|n| n.to_string())
            .unwrap_or_else(|| "whole wave".to_string())
    );
    println!("max_waves:            {}", cfg.max_waves);
    println!("max_stalled_waves:    {}", cfg.max_stalled_waves);
    println!("connect_timeout_secs: {}", cfg.connect_timeout_secs);
    println!("low_speed_time_secs:  {}", cfg.low_speed_time_secs);
    let retry = cfg.retry_policy();
    println!(
        "retry:                {} attempts, backoff {:?} .. {:?}",
        retry.max_attempts, retry.base_delay, retry.max_delay
    );
    Ok(())
}
