//! package.json discovery and mutation.
//!
//! The manifest is found by walking directories upward from the working
//! directory; each candidate is confirmed interactively before it is
//! trusted. Only the `version` field is ever written back, every other field
//! passes through untouched.

use std::fs;
use std::path::{Path, PathBuf};

use log::debug;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{ReleaserError, Result};
use crate::prompt::Prompter;
use crate::version;

/// Manifest file name searched for during discovery.
pub const MANIFEST_FILE: &str = "package.json";

/// A discovered package.json snapshot, persisted inside the release config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    /// Absolute path of the manifest file.
    pub path: PathBuf,
    /// The parsed manifest contents.
    pub pkg: Value,
    /// Whether the user confirmed this file and its version is well-formed.
    #[serde(default)]
    pub valid: bool,
    /// Whether the upward search finished, so later runs skip it.
    #[serde(default)]
    pub exhausted: bool,
}

impl Manifest {
    /// The manifest's version field, if present and a string.
    pub fn version(&self) -> Option<&str> {
        self.pkg.get("version").and_then(Value::as_str)
    }

    /// Replace the in-memory version field.
    pub fn set_version(&mut self, new_version: &str) {
        if let Some(obj) = self.pkg.as_object_mut() {
            obj.insert("version".to_string(), Value::String(new_version.to_string()));
        }
    }
}

/// Result of the interactive upward search.
#[derive(Debug)]
pub enum SearchOutcome {
    /// The user confirmed this manifest.
    Accepted(Manifest),
    /// The search walked past the repository root without acceptance. The
    /// last rejected candidate is kept so the exhausted flag persists.
    Exhausted(Option<Manifest>),
    /// No manifest exists anywhere up to the filesystem root.
    NotFound,
}

/// Finds the nearest package.json at or above `start`.
pub fn find_candidate(start: &Path) -> Result<Option<Manifest>> {
    let mut dir = Some(start);

    while let Some(cursor) = dir {
        let candidate = cursor.join(MANIFEST_FILE);
        if candidate.is_file() {
            let text = fs::read_to_string(&candidate)?;
            let pkg: Value = serde_json::from_str(&text)?;
            return Ok(Some(Manifest {
                path: candidate,
                pkg,
                valid: false,
                exhausted: false,
            }));
        }
        dir = cursor.parent();
    }

    Ok(None)
}

/// Runs the upward search protocol starting at `start_dir`.
///
/// Every candidate is presented with Yes/No/Abort. Rejection moves the
/// search one directory above the candidate, bounded by `repo_root`; Abort
/// raises `UserAbortedError` immediately. Accepting a manifest whose version
/// field is present but malformed fails with `InvalidVersionError`.
pub fn discover(
    start_dir: &Path,
    repo_root: &Path,
    prompt: &mut dyn Prompter,
) -> Result<SearchOutcome> {
    let mut cursor = start_dir.to_path_buf();
    let mut last_rejected: Option<Manifest> = None;

    loop {
        let mut manifest = match find_candidate(&cursor)? {
            Some(m) => m,
            None => {
                debug!("no {} found above {}", MANIFEST_FILE, cursor.display());
                return Ok(SearchOutcome::NotFound);
            }
        };

        let message = format!(
            "{} found in {}, is this file correct?",
            MANIFEST_FILE,
            manifest.path.display()
        );

        match prompt.choose_one(&message, &["Yes", "No", "Abort"])?.as_str() {
            "Yes" => {
                if let Some(v) = manifest.version() {
                    if !version::is_valid(v) {
                        return Err(ReleaserError::InvalidVersion(v.to_string()));
                    }
                }
                manifest.valid = true;
                manifest.exhausted = true;
                return Ok(SearchOutcome::Accepted(manifest));
            }
            "No" => {
                let dir = manifest
                    .path
                    .parent()
                    .map(Path::to_path_buf)
                    .unwrap_or_else(|| cursor.clone());

                manifest.valid = false;
                manifest.exhausted = true;
                last_rejected = Some(manifest);

                // searching above the repository root is exhaustion
                if dir == repo_root || !dir.starts_with(repo_root) {
                    return Ok(SearchOutcome::Exhausted(last_rejected));
                }

                cursor = match dir.parent() {
                    Some(parent) => parent.to_path_buf(),
                    None => return Ok(SearchOutcome::Exhausted(last_rejected)),
                };
            }
            "Abort" => return Err(ReleaserError::UserAborted),
            other => {
                return Err(ReleaserError::config(format!("Unknown answer: {}", other)));
            }
        }
    }
}

/// Writes a new version (never `v`-prefixed) into the manifest file on disk,
/// preserving every other field.
pub fn update_version(manifest: &Manifest, new_version: &str) -> Result<()> {
    let text = fs::read_to_string(&manifest.path)?;
    let mut pkg: Value = serde_json::from_str(&text)?;

    let obj = pkg.as_object_mut().ok_or_else(|| {
        ReleaserError::manifest(format!("{} is not a JSON object", manifest.path.display()))
    })?;
    obj.insert(
        "version".to_string(),
        Value::String(version::strip_prefix(new_version).to_string()),
    );

    let mut serialized = serde_json::to_string_pretty(&pkg)?;
    serialized.push('\n');
    fs::write(&manifest.path, serialized)?;
    debug!(
        "wrote version {} into {}",
        new_version,
        manifest.path.display()
    );
    Ok(())
}
