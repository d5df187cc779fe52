//! Configuration loading.
//!
//! `config.json` in the working directory names the tracked repositories,
//! an optional hosted-API token, and the version-history base URL. A
//! missing or unreadable file degrades to defaults instead of failing;
//! the absence of a base URL only matters once the version-history source
//! is actually used.

use std::path::Path;

use log::warn;
use serde::Deserialize;

/// File looked up in the working directory.
const CONFIG_NAME: &str = "config.json";

/// One tracked repository.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct RepositoryConfig {
    /// Display name; also names the package's install root.
    pub name: String,
    /// Provider address, `owner/repository`.
    pub repo: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub repositories: Vec<RepositoryConfig>,
    pub github_api_token: Option<String>,
    pub api_base_url: Option<String>,
}

impl AppConfig {
    /// Load from the working directory.
    pub fn load() -> Self {
        match std::env::current_dir() {
            Ok(dir) => Self::load_from(&dir),
            Err(err) => {
                warn!("cannot determine working directory: {err}");
                Self::default()
            }
        }
    }

    /// Load `config.json` under `dir`, falling back to defaults when the
    /// file is missing or malformed.
    pub fn load_from(dir: &Path) -> Self {
        let path = dir.join(CONFIG_NAME);
        let content = match std::fs::read_to_string(&path) {
            Ok(content) => content,
            Err(_) => {
                warn!("no config at {}, using defaults", path.display());
                return Self::default();
            }
        };
        match serde_json::from_str(&content) {
            Ok(config) => config,
            Err(err) => {
                warn!("invalid config {}: {err}", path.display());
                Self::default()
            }
        }
    }
}
