//! Configuration loaded from YAML.
//!
//! # Example YAML
//!
//! ```yaml
//! org: my-org
//! output: org_users.csv
//! allowed_logins:
//!   - release-bot
//!   - alice
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::allowlist::AllowList;
use crate::error::{RosterError, Result};

/// File name looked up in the working directory.
pub const LOCAL_CONFIG: &str = "org-roster.yaml";

pub const DEFAULT_API_URL: &str = "https://api.github.com";
pub const DEFAULT_OUTPUT: &str = "org_users.csv";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Organization to operate on.
    pub org: Option<String>,
    pub api_url: String,
    /// Export destination.
    pub output: PathBuf,
    /// Logins that are never removal candidates.
    pub allowed_logins: BTreeSet<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            org: None,
            api_url: DEFAULT_API_URL.into(),
            output: PathBuf::from(DEFAULT_OUTPUT),
            allowed_logins: BTreeSet::new(),
        }
    }
}

impl Config {
    /// Load config from a YAML file.
    pub fn from_yaml(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            RosterError::Io(std::io::Error::new(
                e.kind(),
                format!(
                    "Failed to read config file {}: {}",
                    path.as_ref().display(),
                    e
                ),
            ))
        })?;

        Self::from_yaml_str(&content)
    }

    pub fn from_yaml_str(content: &str) -> Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(content).map_err(|e| {
            RosterError::InvalidConfig(format!("Failed to parse YAML config: {}", e))
        })
    }

    /// Default config locations, in lookup order.
    pub fn search_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from(LOCAL_CONFIG)];
        if let Some(dir) = dirs::config_dir() {
            paths.push(dir.join("org-roster").join("config.yaml"));
        }
        paths
    }

    /// Load `explicit` if given, otherwise the first existing default
    /// location, otherwise defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::from_yaml(path);
        }

        for path in Self::search_paths() {
            if path.is_file() {
                debug!(path = %path.display(), "loading config");
                return Self::from_yaml(&path);
            }
        }

        debug!("no config file found, using defaults");
        Ok(Self::default())
    }

    /// Organization name, or an error if none was configured.
    pub fn require_org(&self) -> Result<&str> {
        match self.org.as_deref().map(str::trim) {
            Some(org) if !org.is_empty() => Ok(org),
            _ => Err(RosterError::InvalidConfig(
                "no organization given; pass --org or set `org` in the config file".into(),
            )),
        }
    }

    pub fn allow_list(&self) -> AllowList {
        AllowList::new(&self.allowed_logins)
    }
}
