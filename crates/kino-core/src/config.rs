use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{KinoError, Result};

/// Default location of the `github/gitignore` collection.
pub const DEFAULT_GITIGNORE_BASE_URL: &str =
    "https://raw.githubusercontent.com/github/gitignore/master";

/// HTTP transport parameters (optional `[http]` section in config.toml).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Seconds allowed for establishing a connection.
    pub connect_timeout_secs: u64,
    /// Seconds allowed for a whole request, body included.
    pub timeout_secs: u64,
    /// Maximum redirects followed by GET and HEAD.
    pub max_redirections: u32,
    /// `User-Agent` header sent with every request.
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            connect_timeout_secs: 15,
            timeout_secs: 60,
            max_redirections: 10,
            user_agent: format!("kino/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl HttpConfig {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Global configuration loaded from `~/.config/kino/config.toml`.
///
/// Only transport details live here; nothing in it changes what a script run does.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KinoConfig {
    /// Base URL that `curl_gitignore` appends `<Lang>.gitignore` to.
    pub gitignore_base_url: String,
    pub http: HttpConfig,
}

impl Default for KinoConfig {
    fn default() -> Self {
        Self {
            gitignore_base_url: DEFAULT_GITIGNORE_BASE_URL.to_string(),
            http: HttpConfig::default(),
        }
    }
}

pub fn config_path() -> Option<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("kino").ok()?;
    xdg_dirs.find_config_file("config.toml")
}

/// Load configuration from disk; a missing file yields defaults and is not created.
pub fn load() -> Result<KinoConfig> {
    match config_path() {
        Some(path) => load_from(&path),
        None => Ok(KinoConfig::default()),
    }
}

pub fn load_from(path: &Path) -> Result<KinoConfig> {
    let data = fs::read_to_string(path).map_err(|e| KinoError::Config {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    let cfg: KinoConfig = toml::from_str(&data).map_err(|e| KinoError::Config {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    tracing::debug!(path = %path.display(), "loaded config");
    Ok(cfg)
}
