//! Runtime abstraction for system operations.
//!
//! Everything the dispatcher needs from the outside world that tests want to
//! control goes through [`Runtime`]: environment, config files, sleeping and
//! randomness.
//!
//! # Structure
//!
//! - `env` - Environment variables and platform directories
//! - `fs` - Reading config files
//! - `clock` - Task sleeps and per-call random sources

mod clock;
mod env;
mod fs;

use anyhow::Result;
use async_trait::async_trait;
use rand::rngs::StdRng;
use std::env as std_env;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Runtime: Send + Sync {
    // Environment
    fn env_var(&self, key: &str) -> Result<String, std_env::VarError>;
    fn config_dir(&self) -> Option<PathBuf>;

    // File System
    fn read_to_string(&self, path: &Path) -> Result<String>;
    fn exists(&self, path: &Path) -> bool;

    // Time
    /// Suspend the calling task (not the process) for `duration`.
    async fn sleep(&self, duration: Duration);

    // Randomness
    /// A fresh random source for a single call.
    fn rng(&self) -> StdRng;
}

/// Runtime backed by the real environment, file system, tokio timers and OS entropy.
///
/// With a seed, every call's random source starts from that seed, which makes
/// profile choice and jitter reproducible.
#[derive(Debug, Clone, Copy, Default)]
pub struct RealRuntime {
    seed: Option<u64>,
}

impl RealRuntime {
    pub fn seeded(seed: u64) -> Self {
        Self { seed: Some(seed) }
    }

    pub fn seed(&self) -> Option<u64> {
        self.seed
    }
}

#[async_trait]
impl Runtime for RealRuntime {
    fn env_var(&self, key: &str) -> Result<String, std_env::VarError> {
        self.env_var_impl(key)
    }

    fn config_dir(&self) -> Option<PathBuf> {
        self.config_dir_impl()
    }

    fn read_to_string(&self, path: &Path) -> Result<String> {
        self.read_to_string_impl(path)
    }

    fn exists(&self, path: &Path) -> bool {
        self.exists_impl(path)
    }

    async fn sleep(&self, duration: Duration) {
        self.sleep_impl(duration).await
    }

    fn rng(&self) -> StdRng {
        self.rng_impl()
    }
}
