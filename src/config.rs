use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use serde::Deserialize;

const DEFAULT_LISTEN_ADDR: &str = "127.0.0.1:8080";
const DEFAULT_WORKERS: usize = 4;
const DEFAULT_IDLE_TIMEOUT_SECS: u64 = 30;
const DEFAULT_MAX_REQUEST_BYTES: usize = 1024 * 1024;

/// Server configuration.
///
/// Every field has a default, so an empty YAML document is a valid config.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Address the acceptor binds, `host:port`
    pub listen_addr: String,
    /// Number of worker threads in the pool
    pub workers: usize,
    /// Seconds a connection may stay silent before it is closed (0 disables)
    pub idle_timeout_secs: u64,
    /// Largest request, headers plus body, a worker will buffer
    pub max_request_bytes: usize,
    /// Certificate and key applied to every accepted connection
    pub tls: Option<TlsConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TlsConfig {
    pub cert_path: PathBuf,
    pub key_path: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen_addr: DEFAULT_LISTEN_ADDR.to_string(),
            workers: DEFAULT_WORKERS,
            idle_timeout_secs: DEFAULT_IDLE_TIMEOUT_SECS,
            max_request_bytes: DEFAULT_MAX_REQUEST_BYTES,
            tls: None,
        }
    }
}

impl Config {
    /// Loads from the process environment.
    ///
    /// `WEBENGINE_CONFIG` names an optional YAML file; `LISTEN` overrides the
    /// listen address afterwards.
    pub fn load() -> anyhow::Result<Self> {
        Self::load_from(|key| std::env::var(key).ok())
    }

    /// Same as [`Config::load`] with an explicit variable lookup.
    pub fn load_from<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut cfg = match lookup("WEBENGINE_CONFIG") {
            Some(path) => Self::from_yaml_file(path)?,
            None => Self::default(),
        };

        if let Some(listen_addr) = lookup("LISTEN") {
            cfg.listen_addr = listen_addr;
        }

        cfg.validate()?;
        Ok(cfg)
    }

    pub fn from_yaml_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        Self::from_yaml_str(&raw)
            .with_context(|| format!("invalid config file {}", path.display()))
    }

    pub fn from_yaml_str(raw: &str) -> anyhow::Result<Self> {
        // An empty document deserializes to unit, not a map.
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }
        let cfg: Config = serde_yaml::from_str(raw).context("failed to parse YAML config")?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.workers == 0 {
            anyhow::bail!("workers must be at least 1");
        }
        if self.listen_addr.is_empty() {
            anyhow::bail!("listen_addr must not be empty");
        }
        Ok(())
    }

    pub fn idle_timeout(&self) -> Option<Duration> {
        (self.idle_timeout_secs > 0).then(|| Duration::from_secs(self.idle_timeout_secs))
    }
}
