//! Client configuration stored as TOML.

use std::fs;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};

use crate::core::types::ResponsePolicy;

pub const DEFAULT_SERVER: &str = "http://127.0.0.1:8080";

/// Playground client configuration (TOML).
///
/// Missing fields default to a server on localhost.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct PlaygroundConfig {
    /// Endpoint that evaluates a snippet (`POST`, raw text body).
    pub eval_url: String,

    /// Endpoint that lists examples (`GET`, JSON array).
    pub examples_url: String,

    /// Cadence of the fixed redraw loop in milliseconds.
    pub redraw_interval_ms: u64,

    /// Transport timeout applied by the HTTP client to each request.
    pub request_timeout_secs: u64,

    /// Which evaluation response may update the result pane.
    pub response_policy: ResponsePolicy,
}

impl Default for PlaygroundConfig {
    fn default() -> Self {
        Self::for_server(DEFAULT_SERVER)
    }
}

impl PlaygroundConfig {
    /// Defaults with both endpoints rooted at `server`.
    pub fn for_server(server: &str) -> Self {
        let mut cfg = Self {
            eval_url: String::new(),
            examples_url: String::new(),
            redraw_interval_ms: 500,
            request_timeout_secs: 30,
            response_policy: ResponsePolicy::default(),
        };
        cfg.set_server(server);
        cfg
    }

    /// Point both endpoints at `<server>/eval` and `<server>/examples`.
    pub fn set_server(&mut self, server: &str) {
        let base = server.trim_end_matches('/');
        self.eval_url = format!("{base}/eval");
        self.examples_url = format!("{base}/examples");
    }

    pub fn redraw_interval(&self) -> Duration {
        Duration::from_millis(self.redraw_interval_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn validate(&self) -> Result<()> {
        if self.eval_url.trim().is_empty() {
            return Err(anyhow!("eval_url must not be empty"));
        }
        if self.examples_url.trim().is_empty() {
            return Err(anyhow!("examples_url must not be empty"));
        }
        if self.redraw_interval_ms == 0 {
            return Err(anyhow!("redraw_interval_ms must be > 0"));
        }
        if self.request_timeout_secs == 0 {
            return Err(anyhow!("request_timeout_secs must be > 0"));
        }
        Ok(())
    }
}

/// Load config from a TOML file.
///
/// If the file is missing, returns `PlaygroundConfig::default()`.
pub fn load_config(path: &Path) -> Result<PlaygroundConfig> {
    if !path.exists() {
        let cfg = PlaygroundConfig::default();
        cfg.validate()?;
        return Ok(cfg);
    }
    let contents = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let cfg: PlaygroundConfig =
        toml::from_str(&contents).with_context(|| format!("parse {}", path.display()))?;
    cfg.validate()?;
    Ok(cfg)
}

/// Atomically write config to disk (temp file + rename).
pub fn write_config(path: &Path, cfg: &PlaygroundConfig) -> Result<()> {
    cfg.validate()?;
    let mut buf = toml::to_string_pretty(cfg).context("serialize config toml")?;
    buf.push('\n');
    let parent = path
        .parent()
        .with_context(|| format!("config path missing parent {}", path.display()))?;
    fs::create_dir_all(parent).with_context(|| format!("create directory {}", parent.display()))?;
    let tmp_path = path.with_extension("toml.tmp");
    fs::write(&tmp_path, &buf)
        .with_context(|| format!("write temp config {}", tmp_path.display()))?;
    fs::rename(&tmp_path, path).with_context(|| format!("replace config {}", path.display()))?;
    Ok(())
}
