//! The persisted release configuration record.
//!
//! A single JSON document is the only state carried between runs: the
//! confirmed manifest snapshot, the last known release version and the
//! first-run settings. Loaded once at startup, written back at defined
//! checkpoints, never touched as ambient global state.

use std::fs;
use std::path::{Path, PathBuf};

use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::{ReleaserError, Result};
use crate::manifest::Manifest;
use crate::version;

/// The record persisted between runs. Field names match the on-disk keys
/// (`packageJson`, `currentSemVer`, `configured`, `developBranchName`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReleaseConfig {
    /// Confirmed (or last rejected) manifest snapshot.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub package_json: Option<Manifest>,

    /// Last known good release version, stored without a `v` prefix.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_sem_ver: Option<String>,

    /// Whether the first-run questions were already answered.
    #[serde(default)]
    pub configured: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub develop_branch_name: Option<String>,
}

impl ReleaseConfig {
    pub fn has_package_json(&self) -> bool {
        self.package_json.is_some()
    }

    /// True when a manifest snapshot exists and the user confirmed it.
    pub fn manifest_valid(&self) -> bool {
        self.package_json.as_ref().map(|m| m.valid).unwrap_or(false)
    }

    /// True when a previous search finished, successfully or not.
    pub fn manifest_exhausted(&self) -> bool {
        self.package_json
            .as_ref()
            .map(|m| m.exhausted)
            .unwrap_or(false)
    }

    pub fn has_current_sem_ver(&self) -> bool {
        self.current_sem_ver.is_some()
    }

    /// Stores a version, always stripped of any `v` prefix.
    pub fn set_current_sem_ver(&mut self, value: &str) {
        self.current_sem_ver = Some(version::strip_prefix(value).to_string());
    }

    pub fn delete_current_sem_ver(&mut self) {
        self.current_sem_ver = None;
    }

    pub fn delete_package_json(&mut self) {
        self.package_json = None;
    }
}

/// Loads and saves the [ReleaseConfig] JSON document.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: PathBuf,
}

impl ConfigStore {
    /// Store at the platform config directory,
    /// e.g. `~/.config/conventional-release/config.json`.
    pub fn new() -> Result<Self> {
        let base = dirs::config_dir()
            .ok_or_else(|| ReleaserError::config("Cannot resolve a user config directory"))?;
        Ok(ConfigStore {
            path: base.join("conventional-release").join("config.json"),
        })
    }

    /// Store at an explicit path. Used by `--config` and tests.
    pub fn at(path: impl Into<PathBuf>) -> Self {
        ConfigStore { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the persisted record; a missing file yields the default.
    pub fn load(&self) -> Result<ReleaseConfig> {
        if !self.path.exists() {
            debug!("no config at {}, starting fresh", self.path.display());
            return Ok(ReleaseConfig::default());
        }

        let text = fs::read_to_string(&self.path)?;
        let config = serde_json::from_str(&text)?;
        Ok(config)
    }

    pub fn save(&self, config: &ReleaseConfig) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut serialized = serde_json::to_string_pretty(config)?;
        serialized.push('\n');
        fs::write(&self.path, serialized)?;
        Ok(())
    }

    /// Removes the persisted record entirely (the `--reset` directive).
    pub fn clear(&self) -> Result<()> {
        if self.path.exists() {
            fs::remove_file(&self.path)?;
            debug!("cleared config at {}", self.path.display());
        }
        Ok(())
    }
}
