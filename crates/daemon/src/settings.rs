use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use tracing::level_filters::LevelFilter;

use crate::video::PollPolicy;

pub const DEFAULT_BIND: &str = "127.0.0.1:7777";
pub const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_REASONING_MODEL: &str = "gemini-3-pro-preview";
pub const DEFAULT_VIDEO_MODEL: &str = "veo-3.1-fast-generate-preview";
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 10;
pub const DEFAULT_MAX_WAIT_SECS: u64 = 1800;

#[derive(Debug, Clone)]
pub struct Settings {
    pub bind: SocketAddr,
    pub api_base: String,
    pub reasoning_model: String,
    pub video_model: String,
    pub poll_interval: Duration,
    /// `None` waits for the backend indefinitely.
    pub max_wait: Option<Duration>,
    pub api_key: Option<String>,
    pub panel_dir: Option<PathBuf>,
    pub log_level: LevelFilter,
}

impl Settings {
    pub fn from_env() -> Result<Self> {
        Settings::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let bind = var("DIRECTOR_BIND").unwrap_or_else(|| DEFAULT_BIND.to_string());
        let bind = bind
            .parse::<SocketAddr>()
            .with_context(|| format!("DIRECTOR_BIND is not a socket address: {}", bind))?;

        let poll_interval = match var("POLL_INTERVAL_SECS") {
            Some(v) => v
                .trim()
                .parse::<u64>()
                .with_context(|| format!("POLL_INTERVAL_SECS is not a number: {}", v))?,
            None => DEFAULT_POLL_INTERVAL_SECS,
        };
        if poll_interval == 0 {
            anyhow::bail!("POLL_INTERVAL_SECS must be at least 1");
        }

        let max_wait = match var("MAX_WAIT_SECS") {
            Some(v) => v
                .trim()
                .parse::<u64>()
                .with_context(|| format!("MAX_WAIT_SECS is not a number: {}", v))?,
            None => DEFAULT_MAX_WAIT_SECS,
        };

        let log_level = match var("LOG_LEVEL") {
            Some(v) => LevelFilter::from_str(v.trim())
                .with_context(|| format!("LOG_LEVEL is not a tracing level: {}", v))?,
            None => LevelFilter::INFO,
        };

        Ok(Settings {
            bind,
            api_base: var("GEMINI_API_BASE")
                .unwrap_or_else(|| DEFAULT_API_BASE.to_string())
                .trim_end_matches('/')
                .to_string(),
            reasoning_model: var("REASONING_MODEL")
                .unwrap_or_else(|| DEFAULT_REASONING_MODEL.to_string()),
            video_model: var("VIDEO_MODEL").unwrap_or_else(|| DEFAULT_VIDEO_MODEL.to_string()),
            poll_interval: Duration::from_secs(poll_interval),
            max_wait: (max_wait > 0).then(|| Duration::from_secs(max_wait)),
            api_key: var("GEMINI_API_KEY").or_else(|| var("API_KEY")),
            panel_dir: var("PANEL_DIR").map(PathBuf::from),
            log_level,
        })
    }

    pub fn poll_policy(&self) -> PollPolicy {
        PollPolicy {
            interval: self.poll_interval,
            max_wait: self.max_wait,
        }
    }
}
