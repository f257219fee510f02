//! Settings: the endpoint table, timeout and retry bound.

use anyhow::{Context, Result, bail};
use log::debug;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::headers::BrowserProfile;
use crate::http::MAX_RETRIES;
use crate::runtime::Runtime;

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV: &str = "REQDISPATCH_CONFIG";

/// Default per-call timeout in seconds.
pub const REQUEST_TIMEOUT_SECS: u64 = 30;

pub const DEFAULT_REFERER: &str = "https://app.nodepay.ai/";
pub const DEFAULT_ORIGIN: &str = "chrome-extension://lgmpfmgeabnnlemejacfljbmonaomfmm";

/// Logical endpoint names mapped to URLs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct Endpoints {
    #[serde(rename = "PING")]
    pub ping: Vec<String>,
    #[serde(rename = "EARN_INFO")]
    pub earn_info: Option<String>,
    #[serde(rename = "MISSION")]
    pub mission: Option<String>,
    #[serde(rename = "COMPLETE_MISSION")]
    pub complete_mission: Option<String>,
    #[serde(rename = "ACTIVATE")]
    pub activate: Option<String>,
}

/// Endpoint groups sharing a header profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndpointCategory {
    Ping,
    EarnMission,
    Activate,
}

impl Endpoints {
    /// The category `url` belongs to, if it is one of the configured endpoints.
    pub fn category(&self, url: &str) -> Option<EndpointCategory> {
        let is = |candidate: &Option<String>| candidate.as_deref() == Some(url);

        if self.ping.iter().any(|p| p == url) {
            Some(EndpointCategory::Ping)
        } else if is(&self.earn_info) || is(&self.mission) || is(&self.complete_mission) {
            Some(EndpointCategory::EarnMission)
        } else if is(&self.activate) {
            Some(EndpointCategory::Activate)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct Settings {
    pub endpoints: Endpoints,
    pub timeout_secs: u64,
    pub max_retries: usize,
    pub referer: String,
    pub origin: String,
    /// Use this profile for every call instead of a random one
    pub fixed_profile: Option<BrowserProfile>,
    /// Seed for profile choice and backoff jitter; entropy when unset
    pub seed: Option<u64>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            endpoints: Endpoints::default(),
            timeout_secs: REQUEST_TIMEOUT_SECS,
            max_retries: MAX_RETRIES,
            referer: DEFAULT_REFERER.to_string(),
            origin: DEFAULT_ORIGIN.to_string(),
            fixed_profile: None,
            seed: None,
        }
    }
}

impl Settings {
    pub fn from_json(contents: &str) -> Result<Self> {
        let settings: Settings =
            serde_json::from_str(contents).context("Failed to parse settings JSON")?;
        settings.validate()?;
        Ok(settings)
    }

    /// Loads settings from, in order: `explicit`, `$REQDISPATCH_CONFIG`,
    /// `<config_dir>/reqdispatch/config.json`. Falls back to defaults when none exist.
    #[tracing::instrument(skip(runtime))]
    pub fn load<R: Runtime>(runtime: &R, explicit: Option<&Path>) -> Result<Self> {
        let path = match explicit {
            Some(path) => Some(path.to_path_buf()),
            None => match runtime.env_var(CONFIG_ENV) {
                Ok(path) if !path.is_empty() => Some(PathBuf::from(path)),
                _ => default_config_path(runtime).filter(|p| runtime.exists(p)),
            },
        };

        match path {
            Some(path) => {
                debug!("Loading settings from {}", path.display());
                let contents = runtime.read_to_string(&path)?;
                Self::from_json(&contents)
                    .with_context(|| format!("Invalid settings file {}", path.display()))
            }
            None => {
                debug!("No settings file found, using defaults");
                Ok(Self::default())
            }
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    fn validate(&self) -> Result<()> {
        if self.timeout_secs == 0 {
            bail!("timeout_secs must be greater than zero");
        }
        Ok(())
    }
}

fn default_config_path<R: Runtime>(runtime: &R) -> Option<PathBuf> {
    runtime
        .config_dir()
        .map(|dir| dir.join("reqdispatch").join("config.json"))
}
