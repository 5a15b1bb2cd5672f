//! Changelog file management around a release.
//!
//! The working file is backed up before regeneration and the backup is only
//! discarded once the release went through; an interrupted run leaves the
//! backup behind for `restore`.

use std::fs;
use std::path::{Path, PathBuf};

use log::debug;

use crate::error::{ReleaserError, Result};

/// Prefix joined with a dot to the changelog name, e.g. `original.CHANGELOG.md`.
pub const BACKUP_PREFIX: &str = "original";

/// Accepted changelog spellings, checked in order.
const CANDIDATES: [&str; 3] = ["changelog.md", "Changelog.md", "CHANGELOG.md"];

pub struct ChangelogManager {
    dir: PathBuf,
}

impl ChangelogManager {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        ChangelogManager { dir: dir.into() }
    }

    /// Finds the changelog file among the accepted spellings.
    pub fn locate(&self) -> Result<PathBuf> {
        for name in CANDIDATES {
            let path = self.dir.join(name);
            if path.is_file() {
                return Ok(path);
            }
        }
        Err(ReleaserError::ChangelogNotFound)
    }

    fn backup_path_for(&self, changelog: &Path) -> PathBuf {
        let name = changelog
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| CANDIDATES[2].to_string());
        self.dir.join(format!("{}.{}", BACKUP_PREFIX, name))
    }

    /// Finds an existing backup and the working path it belongs to.
    fn find_backup(&self) -> Option<(PathBuf, PathBuf)> {
        for name in CANDIDATES {
            let target = self.dir.join(name);
            let backup = self.dir.join(format!("{}.{}", BACKUP_PREFIX, name));
            if backup.is_file() {
                return Some((backup, target));
            }
        }
        None
    }

    /// Copies the changelog aside. Fails when no changelog exists.
    pub fn backup(&self) -> Result<()> {
        let path = self.locate()?;
        let backup = self.backup_path_for(&path);
        fs::copy(&path, &backup)?;
        debug!("backed up {} to {}", path.display(), backup.display());
        Ok(())
    }

    /// Copies the backup back over the working file and deletes it.
    pub fn restore(&self) -> Result<()> {
        let (backup, target) = self.find_backup().ok_or(ReleaserError::BackupNotFound)?;
        fs::copy(&backup, &target)?;
        fs::remove_file(&backup)?;
        debug!("restored {} from backup", target.display());
        Ok(())
    }

    /// Deletes the backup once the release is confirmed successful.
    pub fn discard_backup(&self) -> Result<()> {
        let (backup, _) = self.find_backup().ok_or(ReleaserError::BackupNotFound)?;
        fs::remove_file(&backup)?;
        Ok(())
    }

    /// Writes the generated notes into the changelog.
    ///
    /// In append mode the new release section goes on top of the existing
    /// content; otherwise the file is replaced outright. Returns the path
    /// that was written.
    pub fn regenerate(&self, notes: &str, append: bool) -> Result<PathBuf> {
        let path = self.locate()?;

        let content = if append {
            let existing = fs::read_to_string(&path)?;
            if existing.trim().is_empty() {
                notes.to_string()
            } else {
                format!("{}\n{}", notes, existing)
            }
        } else {
            notes.to_string()
        };

        fs::write(&path, content)?;
        Ok(path)
    }
}
