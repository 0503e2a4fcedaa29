use std::fs;
use std::path::PathBuf;

use anyhow::{Context, bail};
use serde::Deserialize;

use crate::http::connection::DEFAULT_MAX_REQUEST_BYTES;

/// Environment variable naming the YAML config file.
pub const CONFIG_ENV: &str = "DOCSERVE_CONFIG";
pub const DEFAULT_CONFIG_PATH: &str = "docserve.yaml";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub static_files: StaticFilesConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub listen_addr: String,
    /// Connections served at the same time; further accepts wait.
    pub workers: usize,
    pub max_request_bytes: usize,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StaticFilesConfig {
    pub root: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: "127.0.0.1:31337".to_string(),
            workers: 8,
            max_request_bytes: DEFAULT_MAX_REQUEST_BYTES,
        }
    }
}

impl Default for StaticFilesConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("www"),
        }
    }
}

impl Config {
    /// Loads the YAML file named by `DOCSERVE_CONFIG` (or `docserve.yaml`),
    /// then applies `LISTEN`, `DOCUMENT_ROOT` and `WORKERS` from the
    /// environment. A missing file means defaults.
    pub fn load() -> anyhow::Result<Self> {
        let path = std::env::var(CONFIG_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());

        let mut cfg = match fs::read_to_string(&path) {
            Ok(text) => {
                Self::from_yaml(&text).with_context(|| format!("invalid config file {}", path))?
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!(path = %path, "No config file, using defaults");
                Self::default()
            }
            Err(e) => return Err(e).with_context(|| format!("failed to read {}", path)),
        };

        cfg.apply_overrides(|key| std::env::var(key).ok())?;
        Ok(cfg)
    }

    pub fn from_yaml(text: &str) -> anyhow::Result<Self> {
        let cfg: Config = serde_yaml::from_str(text)?;
        if cfg.server.workers == 0 {
            bail!("server.workers must be at least 1");
        }
        Ok(cfg)
    }

    /// Overrides settings from `lookup`, normally the process environment.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> anyhow::Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(addr) = lookup("LISTEN") {
            self.server.listen_addr = addr;
        }
        if let Some(root) = lookup("DOCUMENT_ROOT") {
            self.static_files.root = PathBuf::from(root);
        }
        if let Some(workers) = lookup("WORKERS") {
            self.server.workers = workers
                .parse()
                .with_context(|| format!("WORKERS is not a number: {}", workers))?;
            if self.server.workers == 0 {
                bail!("WORKERS must be at least 1");
            }
        }
        Ok(())
    }
}

impl StaticFilesConfig {
    /// Checks that the document root exists, is a directory and can be listed.
    pub fn validate(&self) -> anyhow::Result<()> {
        let root = &self.root;
        if !root.exists() {
            bail!("docroot '{}' does not exist", root.display());
        }
        if !root.is_dir() {
            bail!("docroot '{}' is not a directory", root.display());
        }
        fs::read_dir(root).with_context(|| format!("docroot '{}' is not readable", root.display()))?;
        Ok(())
    }
}
