//! Conventional-commit release automation.
//!
//! Reads the repository's tags, the manifest file and a small persisted
//! config, reconciles them into a current version, derives the next one
//! from the commit history and drives the release side effects: changelog,
//! tag, manifest rewrite.

pub mod changelog;
pub mod config;
pub mod conventional;
pub mod error;
pub mod git;
pub mod manifest;
pub mod prompt;
pub mod releaser;
pub mod ui;
pub mod version;

pub use error::{ReleaserError, Result};
pub use releaser::{ReleaseOptions, ReleaseOutcome, Releaser};
