//! Configuration for sessh clients.
//!
//! Handles loading named host profiles and the sessh binary location from
//! `<config dir>/sessh/config.toml`.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::client::{SesshClient, DEFAULT_BIN};
use crate::invocation::Target;

/// Main configuration struct
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Path to the sessh binary; `sessh` on PATH when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bin: Option<PathBuf>,

    /// Host profiles keyed by session alias
    #[serde(default)]
    pub profiles: BTreeMap<String, Profile>,
}

/// Connection settings for one session alias.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    /// SSH destination (user@host)
    pub host: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,

    /// Path to the SSH private key; a leading `~/` is expanded
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identity: Option<PathBuf>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proxyjump: Option<String>,
}

impl Profile {
    /// Resolve this profile into a client target for `alias`.
    pub fn target(&self, alias: &str) -> Target {
        Target {
            alias: alias.to_string(),
            host: self.host.clone(),
            port: self.port,
            identity: self.identity.as_deref().map(expand_home),
            proxyjump: self.proxyjump.clone(),
        }
    }
}

impl Config {
    /// Load configuration from disk, or return default if not found
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    /// Load configuration from a specific file, or return default if it
    /// does not exist.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::parse(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Parse configuration from TOML text.
    pub fn parse(contents: &str) -> Result<Self> {
        let config: Config = toml::from_str(contents)?;
        Ok(config)
    }

    /// Save configuration to a specific file
    pub fn save_to(&self, path: &Path) -> Result<()> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let contents = toml::to_string_pretty(self).context("Failed to serialize config")?;

        fs::write(path, contents)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Look up the profile for a session alias.
    pub fn profile(&self, alias: &str) -> Option<&Profile> {
        self.profiles.get(alias)
    }

    /// Build a client for a configured session alias.
    pub fn client(&self, alias: &str) -> Result<SesshClient> {
        let profile = self
            .profile(alias)
            .with_context(|| format!("No profile named '{}' in sessh config", alias))?;

        let bin = self
            .bin
            .as_deref()
            .map(expand_home)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_BIN));

        Ok(SesshClient::from_target(profile.target(alias)).with_bin(bin))
    }

    /// Get the path to the config file
    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir().context("Could not find config directory")?;

        Ok(config_dir.join("sessh").join("config.toml"))
    }
}

/// Expand a leading `~/` to the home directory. Other paths are returned as is.
fn expand_home(path: &Path) -> PathBuf {
    match (path.strip_prefix("~"), dirs::home_dir()) {
        (Ok(rest), Some(home)) => home.join(rest),
        _ => path.to_path_buf(),
    }
}
