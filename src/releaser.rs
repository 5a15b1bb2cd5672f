//! The release orchestrator.
//!
//! One run reconciles the three version sources (manifest, tags, persisted
//! config), evaluates the branch, decides whether a bump is legitimate and
//! drives the side effects: changelog regeneration, tag creation, manifest
//! rewrite. Every ambiguous juncture goes through a prompt; every explicit
//! decline raises `UserAbortedError`.

use std::path::PathBuf;

use log::{debug, warn};

use crate::changelog::ChangelogManager;
use crate::config::{ConfigStore, ReleaseConfig};
use crate::conventional::{self, Preset};
use crate::error::{ReleaserError, Result};
use crate::git::Repository;
use crate::manifest::{self, SearchOutcome};
use crate::prompt::Prompter;
use crate::ui;
use crate::version::{self, BumpType, TagPattern};

/// Version used for the first-ever release when no manifest supplies one.
pub const SEED_VERSION: &str = "0.1.0";

/// Options controlling one release run, decoupled from the CLI parser.
#[derive(Debug, Clone)]
pub struct ReleaseOptions {
    /// Pick the bump type from the commit history.
    pub auto: bool,
    /// Explicit release type; required when `auto` is off, ignored otherwise.
    pub release: Option<BumpType>,
    /// Pre-release identifier, e.g. "alpha".
    pub identifier: Option<String>,
    /// Bump even when the branch is pristine.
    pub forced: bool,
    /// Prefix tags with `v`.
    pub prefix: bool,
    /// Create the tag (and the changelog commit).
    pub commit: bool,
    /// Write the new version into the manifest file.
    pub update: bool,
    /// Regenerate the changelog before tagging.
    pub changelog: bool,
    pub preset: Preset,
    /// Keep existing changelog content below the new section.
    pub append: bool,
    /// Re-run the manifest discovery even if a previous run finished it.
    pub find: bool,
    /// Clear the persisted configuration before running.
    pub reset: bool,
}

impl Default for ReleaseOptions {
    fn default() -> Self {
        ReleaseOptions {
            auto: true,
            release: None,
            identifier: None,
            forced: false,
            prefix: true,
            commit: true,
            update: true,
            changelog: false,
            preset: Preset::default(),
            append: true,
            find: false,
            reset: false,
        }
    }
}

/// Derived branch state, computed fresh every run and never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BranchStatus {
    /// No tag exists in the repository at all.
    NoTag,
    /// Tags exist but no semver comparison point does.
    FirstTag,
    /// The resolved label does not follow semver grammar.
    InvalidTag,
    /// The candidate tag sits exactly at HEAD.
    Pristine,
    /// One or more commits separate the candidate tag from HEAD.
    Valid,
}

/// Pure decision core of the branch evaluation: tag existence, label
/// validity and tag-to-HEAD distance fully determine the status.
pub fn branch_status(
    any_tag: bool,
    label_valid: bool,
    distance: Option<usize>,
) -> BranchStatus {
    if !any_tag {
        return BranchStatus::NoTag;
    }
    if !label_valid {
        return BranchStatus::InvalidTag;
    }
    match distance {
        None => BranchStatus::FirstTag,
        Some(0) => BranchStatus::Pristine,
        Some(_) => BranchStatus::Valid,
    }
}

/// Final result of a successful run.
#[derive(Debug, Clone, PartialEq)]
pub struct ReleaseOutcome {
    /// The new tag label, prefix convention applied.
    pub label: String,
    /// Whether anything was written into version control.
    pub committed: bool,
}

pub struct Releaser<'a, R: Repository, P: Prompter> {
    opts: ReleaseOptions,
    store: ConfigStore,
    config: ReleaseConfig,
    repo: &'a R,
    prompt: &'a mut P,
    workdir: PathBuf,
    /// The user explicitly accepted continuing without any known version.
    accepted_without_tags: bool,
}

impl<'a, R: Repository, P: Prompter> Releaser<'a, R, P> {
    pub fn new(
        opts: ReleaseOptions,
        store: ConfigStore,
        repo: &'a R,
        prompt: &'a mut P,
        workdir: impl Into<PathBuf>,
    ) -> Result<Self> {
        if !opts.auto && opts.release.is_none() {
            return Err(ReleaserError::config(
                "Release type must be set when not in auto mode.",
            ));
        }

        if opts.reset {
            store.clear()?;
        }
        let config = store.load()?;

        Ok(Releaser {
            opts,
            store,
            config,
            repo,
            prompt,
            workdir: workdir.into(),
            accepted_without_tags: false,
        })
    }

    /// Runs one release attempt start to finish.
    pub fn run(mut self) -> Result<ReleaseOutcome> {
        debug!("starting release run in {}", self.workdir.display());

        self.configure_first_run()?;
        self.discover_manifest()?;
        self.sync_versions()?;

        if !(self.config.manifest_valid()
            || self.config.has_current_sem_ver()
            || self.accepted_without_tags)
        {
            return Err(ReleaserError::UnknownConfigState);
        }

        let (status, comparison) = self.evaluate_branch()?;
        debug!("branch status {:?}, comparison {:?}", status, comparison);

        self.execute(status, comparison)
    }

    /// First-run only: records the develop branch name and remembers that
    /// the question was asked.
    fn configure_first_run(&mut self) -> Result<()> {
        if self.config.configured {
            return Ok(());
        }

        let branch = self.repo.current_branch()?;
        let answer = self
            .prompt
            .ask("Name of the develop branch", Some(&branch))?;
        self.config.develop_branch_name = Some(if answer.is_empty() { branch } else { answer });
        self.config.configured = true;
        self.store.save(&self.config)
    }

    /// Runs the upward manifest search unless a previous run finished it.
    ///
    /// Exhaustion and "nothing found anywhere" are anticipated outcomes,
    /// swallowed and logged; everything else is fatal.
    fn discover_manifest(&mut self) -> Result<()> {
        if self.config.manifest_exhausted() && !self.opts.find {
            return Ok(());
        }
        if self.opts.find {
            self.config.delete_package_json();
        }

        let root = self.repo.find_root()?;
        match manifest::discover(&self.workdir, &root, &mut *self.prompt)? {
            SearchOutcome::Accepted(m) => {
                self.config.package_json = Some(m);
            }
            SearchOutcome::Exhausted(last) => {
                debug!("{}", ReleaserError::ExhaustedSearch);
                self.config.package_json = last;
            }
            SearchOutcome::NotFound => {
                debug!("no manifest present anywhere");
            }
        }
        self.store.save(&self.config)
    }

    /// Reconciles the version sources into `currentSemVer`.
    ///
    /// A valid manifest is the single source; otherwise the semver tags of
    /// the configured convention are scanned. An empty candidate list needs
    /// the user's explicit permission to continue.
    fn sync_versions(&mut self) -> Result<()> {
        let candidates: Vec<String> = if self.config.manifest_valid() {
            self.config
                .package_json
                .as_ref()
                .and_then(|m| m.version())
                .map(str::to_string)
                .into_iter()
                .collect()
        } else {
            self.repo.tags_matching(self.tag_pattern())?
        };

        if candidates.is_empty() {
            self.config.delete_current_sem_ver();
            if !self
                .prompt
                .confirm("No valid semver tags found, continue?")?
            {
                return Err(ReleaserError::UserAborted);
            }
            self.accepted_without_tags = true;
            return self.store.save(&self.config);
        }

        let mut sorted = candidates;
        sorted.sort_by(|a, b| version::reverse_compare(a, b));
        self.config.set_current_sem_ver(&sorted[0]);
        self.store.save(&self.config)
    }

    /// Evaluates the branch against the reconciled version.
    ///
    /// Returns the status plus the comparison label (the tag HEAD is
    /// measured against), when one exists.
    fn evaluate_branch(&mut self) -> Result<(BranchStatus, Option<String>)> {
        if !self.repo.any_tag_exists()? {
            return Ok((BranchStatus::NoTag, None));
        }

        let candidate = match self.candidate_version() {
            Some(v) => v,
            // tags exist but none are usable; permission was already given
            None => return Ok((BranchStatus::FirstTag, None)),
        };

        let label = self.apply_prefix(&candidate);
        if !version::is_valid(&label) {
            return Ok((BranchStatus::InvalidTag, Some(label)));
        }

        if self.repo.tag_exists(&label)? {
            let hash = self.repo.hash_of_label(&label)?;
            let distance = self.repo.commits_since(&hash)?;
            return Ok((branch_status(true, true, Some(distance)), Some(label)));
        }

        let message = format!("Tag {} is not present in repository, continue?", label);
        if !self.prompt.confirm(&message)? {
            return Err(ReleaserError::UserAborted);
        }

        // fall back to the next-highest existing tag as the comparison point
        let mut tags = self.repo.tags_matching(self.tag_pattern())?;
        tags.sort_by(|a, b| version::reverse_compare(a, b));
        let next_highest = tags
            .into_iter()
            .find(|t| version::reverse_compare(&label, t) == std::cmp::Ordering::Less);

        match next_highest {
            Some(tag) => {
                let hash = self.repo.hash_of_label(&tag)?;
                let distance = self.repo.commits_since(&hash)?;
                Ok((branch_status(true, true, Some(distance)), Some(tag)))
            }
            None => Ok((BranchStatus::FirstTag, None)),
        }
    }

    /// Applies the bump decision table and performs the side effects.
    fn execute(
        &mut self,
        status: BranchStatus,
        comparison: Option<String>,
    ) -> Result<ReleaseOutcome> {
        let base: Option<String> = match status {
            BranchStatus::InvalidTag => {
                return Err(ReleaserError::InvalidTag(comparison.unwrap_or_default()));
            }
            BranchStatus::Pristine if !self.opts.forced => {
                return Err(ReleaserError::NoNewCommit);
            }
            BranchStatus::Pristine | BranchStatus::Valid => {
                // the manifest is authoritative over the loose tag scan
                if self.config.manifest_valid() {
                    self.manifest_version()
                } else {
                    comparison.clone()
                }
            }
            BranchStatus::FirstTag => {
                if self.config.manifest_valid() {
                    self.manifest_version()
                } else {
                    None
                }
            }
            BranchStatus::NoTag => {
                if self.config.manifest_valid() {
                    self.manifest_version()
                } else {
                    if !self.prompt.confirm("No tags found, create first tag?")? {
                        return Err(ReleaserError::UserAborted);
                    }
                    None
                }
            }
        };

        let hash = match &comparison {
            Some(label) => Some(self.repo.hash_of_label(label)?),
            None => None,
        };
        let messages = self.repo.messages_since(hash.as_deref())?;

        let new_version = match &base {
            Some(base) => {
                let bump = self.bump_type(&messages)?;
                debug!("bumping {} as {}", base, bump);
                version::increment(base, bump, self.opts.identifier.as_deref())?
            }
            None => SEED_VERSION.to_string(),
        };
        let label = self.apply_prefix(&new_version);
        ui::display_release_summary(comparison.as_deref(), &label);

        let mut committed = false;
        if self.opts.changelog {
            committed = self.update_changelog(&label, &messages)?;
        }

        // persist the decision before touching the VCS, so a crash between
        // here and the tag does not lose it
        self.config.set_current_sem_ver(&new_version);
        if let Some(m) = self.config.package_json.as_mut() {
            if m.valid {
                m.set_version(&new_version);
            }
        }
        self.store.save(&self.config)?;

        if self.opts.commit {
            self.repo.create_tag(&label)?;
            committed = true;
        } else {
            ui::display_status(&format!("Tag {} not created, commits are disabled.", label));
        }

        if self.opts.update && self.config.manifest_valid() {
            if let Some(m) = self.config.package_json.as_ref() {
                manifest::update_version(m, &new_version)?;
            }
        }

        Ok(ReleaseOutcome { label, committed })
    }

    /// Regenerates the changelog around its backup. Returns whether the
    /// result was committed.
    fn update_changelog(&mut self, label: &str, messages: &[String]) -> Result<bool> {
        let manager = ChangelogManager::new(&self.workdir);
        manager.backup()?;

        let notes = conventional::render_notes(label, messages, self.opts.preset);
        let path = manager.regenerate(&notes, self.opts.append)?;

        if self.opts.commit {
            let message = format!("chore(release): update changelog for {}", label);
            self.repo.commit(&message, &[path])?;
            manager.discard_backup()?;
            Ok(true)
        } else {
            warn!("changelog regenerated but not committed, backup kept");
            Ok(false)
        }
    }

    fn bump_type(&self, messages: &[String]) -> Result<BumpType> {
        if self.opts.auto {
            return Ok(conventional::recommended_bump(messages));
        }
        self.opts.release.ok_or_else(|| {
            ReleaserError::config("Release type must be set when not in auto mode.")
        })
    }

    fn candidate_version(&self) -> Option<String> {
        if self.config.manifest_valid() {
            self.manifest_version()
        } else {
            self.config.current_sem_ver.clone()
        }
    }

    fn manifest_version(&self) -> Option<String> {
        self.config
            .package_json
            .as_ref()
            .and_then(|m| m.version())
            .map(str::to_string)
    }

    fn tag_pattern(&self) -> TagPattern {
        if self.opts.prefix {
            TagPattern::Prefixed
        } else {
            TagPattern::Unprefixed
        }
    }

    fn apply_prefix(&self, version: &str) -> String {
        let bare = version::strip_prefix(version);
        if self.opts.prefix {
            format!("v{}", bare)
        } else {
            bare.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::git::MockRepository;
    use crate::manifest::Manifest;
    use crate::prompt::ScriptedPrompter;
    use serde_json::json;
    use std::fs;
    use tempfile::TempDir;

    fn store_in(dir: &TempDir) -> ConfigStore {
        ConfigStore::at(dir.path().join("config.json"))
    }

    /// Snapshot meaning "an earlier run searched and found nothing usable",
    /// so the discovery protocol is skipped.
    fn exhausted_stub(dir: &TempDir) -> Manifest {
        Manifest {
            path: dir.path().join("package.json"),
            pkg: json!({}),
            valid: false,
            exhausted: true,
        }
    }

    fn seeded_store(dir: &TempDir, manifest: Option<Manifest>) -> ConfigStore {
        let store = store_in(dir);
        let config = ReleaseConfig {
            package_json: manifest,
            current_sem_ver: None,
            configured: true,
            develop_branch_name: Some("develop".to_string()),
        };
        store.save(&config).unwrap();
        store
    }

    #[test]
    fn test_branch_status_is_pure() {
        assert_eq!(branch_status(false, true, None), BranchStatus::NoTag);
        assert_eq!(branch_status(false, false, Some(3)), BranchStatus::NoTag);
        assert_eq!(branch_status(true, false, Some(3)), BranchStatus::InvalidTag);
        assert_eq!(branch_status(true, true, None), BranchStatus::FirstTag);
        assert_eq!(branch_status(true, true, Some(0)), BranchStatus::Pristine);
        assert_eq!(branch_status(true, true, Some(7)), BranchStatus::Valid);
    }

    #[test]
    fn test_pristine_branch_refuses_to_bump() {
        let dir = TempDir::new().unwrap();
        let store = seeded_store(&dir, Some(exhausted_stub(&dir)));
        let repo = MockRepository::new(dir.path()).with_tag("v1.0.0", 0);
        let mut prompt = ScriptedPrompter::new();

        let err = Releaser::new(
            ReleaseOptions::default(),
            store,
            &repo,
            &mut prompt,
            dir.path(),
        )
        .unwrap()
        .run()
        .unwrap_err();

        assert!(matches!(err, ReleaserError::NoNewCommit));
        assert!(repo.created_tags().is_empty());
        prompt.finish();
    }

    #[test]
    fn test_forced_bump_on_pristine_branch() {
        let dir = TempDir::new().unwrap();
        let store = seeded_store(&dir, Some(exhausted_stub(&dir)));
        let repo = MockRepository::new(dir.path()).with_tag("v1.0.0", 0);
        let mut prompt = ScriptedPrompter::new();

        let opts = ReleaseOptions {
            forced: true,
            ..ReleaseOptions::default()
        };
        let outcome = Releaser::new(opts, store, &repo, &mut prompt, dir.path())
            .unwrap()
            .run()
            .unwrap();

        assert_eq!(outcome.label, "v1.0.1");
        assert!(outcome.committed);
        assert_eq!(repo.created_tags(), vec!["v1.0.1"]);
        prompt.finish();
    }

    #[test]
    fn test_valid_branch_auto_bumps_from_history() {
        let dir = TempDir::new().unwrap();
        let store = seeded_store(&dir, Some(exhausted_stub(&dir)));
        let repo = MockRepository::new(dir.path())
            .with_tag("v1.0.0", 2)
            .with_messages(&["feat: add presets", "fix: handle empty input"]);
        let mut prompt = ScriptedPrompter::new();

        let outcome = Releaser::new(
            ReleaseOptions::default(),
            store.clone(),
            &repo,
            &mut prompt,
            dir.path(),
        )
        .unwrap()
        .run()
        .unwrap();

        assert_eq!(outcome.label, "v1.1.0");
        assert_eq!(repo.created_tags(), vec!["v1.1.0"]);
        // the decision is persisted, without prefix
        assert_eq!(
            store.load().unwrap().current_sem_ver.as_deref(),
            Some("1.1.0")
        );
        prompt.finish();
    }

    #[test]
    fn test_explicit_release_type_wins_over_history() {
        let dir = TempDir::new().unwrap();
        let store = seeded_store(&dir, Some(exhausted_stub(&dir)));
        let repo = MockRepository::new(dir.path())
            .with_tag("v1.0.0", 1)
            .with_messages(&["fix: small thing"]);
        let mut prompt = ScriptedPrompter::new();

        let opts = ReleaseOptions {
            auto: false,
            release: Some(BumpType::Major),
            ..ReleaseOptions::default()
        };
        let outcome = Releaser::new(opts, store, &repo, &mut prompt, dir.path())
            .unwrap()
            .run()
            .unwrap();

        assert_eq!(outcome.label, "v2.0.0");
        assert_eq!(repo.created_tags(), vec!["v2.0.0"]);
        prompt.finish();
    }

    #[test]
    fn test_release_type_required_without_auto() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        let repo = MockRepository::new(dir.path());
        let mut prompt = ScriptedPrompter::new();

        let opts = ReleaseOptions {
            auto: false,
            release: None,
            ..ReleaseOptions::default()
        };
        let err = match Releaser::new(opts, store, &repo, &mut prompt, dir.path()) {
            Ok(_) => panic!("constructor accepted missing release type"),
            Err(e) => e,
        };
        assert!(err.to_string().contains("Release type must be set"));
    }

    #[test]
    fn test_empty_repository_seeds_first_tag() {
        let dir = TempDir::new().unwrap();
        let store = seeded_store(&dir, Some(exhausted_stub(&dir)));
        let repo = MockRepository::new(dir.path()).with_messages(&["chore: initial commit"]);
        let mut prompt = ScriptedPrompter::new()
            .on("No valid semver tags found, continue?", "yes")
            .on("No tags found, create first tag?", "yes");

        let outcome = Releaser::new(
            ReleaseOptions::default(),
            store.clone(),
            &repo,
            &mut prompt,
            dir.path(),
        )
        .unwrap()
        .run()
        .unwrap();

        assert_eq!(outcome.label, "v0.1.0");
        assert_eq!(repo.created_tags(), vec!["v0.1.0"]);
        assert_eq!(
            store.load().unwrap().current_sem_ver.as_deref(),
            Some("0.1.0")
        );
        prompt.finish();
    }

    #[test]
    fn test_declining_empty_candidates_aborts() {
        let dir = TempDir::new().unwrap();
        let store = seeded_store(&dir, Some(exhausted_stub(&dir)));
        let repo = MockRepository::new(dir.path());
        let mut prompt =
            ScriptedPrompter::new().on("No valid semver tags found, continue?", "no");

        let err = Releaser::new(
            ReleaseOptions::default(),
            store,
            &repo,
            &mut prompt,
            dir.path(),
        )
        .unwrap()
        .run()
        .unwrap_err();

        assert!(matches!(err, ReleaserError::UserAborted));
        assert!(repo.created_tags().is_empty());
        prompt.finish();
    }

    #[test]
    fn test_declining_first_tag_aborts() {
        let dir = TempDir::new().unwrap();
        let store = seeded_store(&dir, Some(exhausted_stub(&dir)));
        let repo = MockRepository::new(dir.path());
        let mut prompt = ScriptedPrompter::new()
            .on("No valid semver tags found, continue?", "yes")
            .on("No tags found, create first tag?", "no");

        let err = Releaser::new(
            ReleaseOptions::default(),
            store,
            &repo,
            &mut prompt,
            dir.path(),
        )
        .unwrap()
        .run()
        .unwrap_err();

        assert!(matches!(err, ReleaserError::UserAborted));
        prompt.finish();
    }

    #[test]
    fn test_nonsemver_tags_only_still_seed_first_release() {
        let dir = TempDir::new().unwrap();
        let store = seeded_store(&dir, Some(exhausted_stub(&dir)));
        let repo = MockRepository::new(dir.path())
            .with_tag("release-7", 0)
            .with_messages(&["feat: something"]);
        let mut prompt =
            ScriptedPrompter::new().on("No valid semver tags found, continue?", "yes");

        let outcome = Releaser::new(
            ReleaseOptions::default(),
            store,
            &repo,
            &mut prompt,
            dir.path(),
        )
        .unwrap()
        .run()
        .unwrap();

        assert_eq!(outcome.label, "v0.1.0");
        prompt.finish();
    }

    #[test]
    fn test_manifest_is_authoritative_and_rewritten() {
        let dir = TempDir::new().unwrap();
        let manifest_path = dir.path().join("package.json");
        fs::write(
            &manifest_path,
            "{\n  \"name\": \"fixture\",\n  \"version\": \"3.0.0\"\n}\n",
        )
        .unwrap();
        let manifest = Manifest {
            path: manifest_path.clone(),
            pkg: json!({"name": "fixture", "version": "3.0.0"}),
            valid: true,
            exhausted: true,
        };
        let store = seeded_store(&dir, Some(manifest));
        // some unrelated tag so the repository is not empty
        let repo = MockRepository::new(dir.path())
            .with_tag("release-1", 0)
            .with_messages(&["feat: brand new thing"]);
        let mut prompt = ScriptedPrompter::new()
            .on("Tag v3.0.0 is not present in repository, continue?", "yes");

        let outcome = Releaser::new(
            ReleaseOptions::default(),
            store.clone(),
            &repo,
            &mut prompt,
            dir.path(),
        )
        .unwrap()
        .run()
        .unwrap();

        assert_eq!(outcome.label, "v3.1.0");
        assert_eq!(repo.created_tags(), vec!["v3.1.0"]);

        // manifest file rewritten without prefix, name preserved
        let rewritten: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&manifest_path).unwrap()).unwrap();
        assert_eq!(rewritten["version"], "3.1.0");
        assert_eq!(rewritten["name"], "fixture");
        prompt.finish();
    }

    #[test]
    fn test_commit_disabled_skips_tag_but_persists_version() {
        let dir = TempDir::new().unwrap();
        let store = seeded_store(&dir, Some(exhausted_stub(&dir)));
        let repo = MockRepository::new(dir.path())
            .with_tag("v1.0.0", 1)
            .with_messages(&["fix: a bug"]);
        let mut prompt = ScriptedPrompter::new();

        let opts = ReleaseOptions {
            commit: false,
            ..ReleaseOptions::default()
        };
        let outcome = Releaser::new(opts, store.clone(), &repo, &mut prompt, dir.path())
            .unwrap()
            .run()
            .unwrap();

        assert_eq!(outcome.label, "v1.0.1");
        assert!(!outcome.committed);
        assert!(repo.created_tags().is_empty());
        assert_eq!(
            store.load().unwrap().current_sem_ver.as_deref(),
            Some("1.0.1")
        );
        prompt.finish();
    }

    #[test]
    fn test_unprefixed_convention() {
        let dir = TempDir::new().unwrap();
        let store = seeded_store(&dir, Some(exhausted_stub(&dir)));
        let repo = MockRepository::new(dir.path())
            .with_tag("1.2.0", 1)
            .with_messages(&["feat: more"]);
        let mut prompt = ScriptedPrompter::new();

        let opts = ReleaseOptions {
            prefix: false,
            ..ReleaseOptions::default()
        };
        let outcome = Releaser::new(opts, store, &repo, &mut prompt, dir.path())
            .unwrap()
            .run()
            .unwrap();

        assert_eq!(outcome.label, "1.3.0");
        assert_eq!(repo.created_tags(), vec!["1.3.0"]);
        prompt.finish();
    }

    #[test]
    fn test_first_run_records_develop_branch() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        let config = ReleaseConfig {
            package_json: Some(exhausted_stub(&dir)),
            ..ReleaseConfig::default()
        };
        store.save(&config).unwrap();

        let repo = MockRepository::new(dir.path())
            .with_branch("trunk")
            .with_tag("v1.0.0", 1)
            .with_messages(&["fix: it"]);
        let mut prompt = ScriptedPrompter::new().on("Name of the develop branch", "trunk");

        Releaser::new(
            ReleaseOptions::default(),
            store.clone(),
            &repo,
            &mut prompt,
            dir.path(),
        )
        .unwrap()
        .run()
        .unwrap();

        let saved = store.load().unwrap();
        assert!(saved.configured);
        assert_eq!(saved.develop_branch_name.as_deref(), Some("trunk"));
        prompt.finish();
    }

    #[test]
    fn test_changelog_round_trip_with_commit() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("CHANGELOG.md"),
            "## v1.0.0\n\n* old entry\n",
        )
        .unwrap();
        let store = seeded_store(&dir, Some(exhausted_stub(&dir)));
        let repo = MockRepository::new(dir.path())
            .with_tag("v1.0.0", 1)
            .with_messages(&["feat: fresh feature"]);
        let mut prompt = ScriptedPrompter::new();

        let opts = ReleaseOptions {
            changelog: true,
            ..ReleaseOptions::default()
        };
        let outcome = Releaser::new(opts, store, &repo, &mut prompt, dir.path())
            .unwrap()
            .run()
            .unwrap();

        assert_eq!(outcome.label, "v1.1.0");

        let content = fs::read_to_string(dir.path().join("CHANGELOG.md")).unwrap();
        assert!(content.contains("## v1.1.0"));
        assert!(content.contains("### Features"));
        assert!(content.contains("* fresh feature"));
        assert!(content.contains("* old entry"));
        // backup discarded after the changelog commit
        assert!(!dir.path().join("original.CHANGELOG.md").exists());

        let commits = repo.commits_made();
        assert_eq!(commits.len(), 1);
        assert_eq!(
            commits[0].0,
            "chore(release): update changelog for v1.1.0"
        );
        prompt.finish();
    }

    #[test]
    fn test_changelog_without_commit_keeps_backup() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("CHANGELOG.md"), "prior content\n").unwrap();
        let store = seeded_store(&dir, Some(exhausted_stub(&dir)));
        let repo = MockRepository::new(dir.path())
            .with_tag("v1.0.0", 1)
            .with_messages(&["fix: thing"]);
        let mut prompt = ScriptedPrompter::new();

        let opts = ReleaseOptions {
            changelog: true,
            commit: false,
            ..ReleaseOptions::default()
        };
        Releaser::new(opts, store, &repo, &mut prompt, dir.path())
            .unwrap()
            .run()
            .unwrap();

        assert!(dir.path().join("original.CHANGELOG.md").exists());
        assert!(repo.commits_made().is_empty());
        prompt.finish();
    }

    #[test]
    fn test_missing_changelog_is_fatal_when_enabled() {
        let dir = TempDir::new().unwrap();
        let store = seeded_store(&dir, Some(exhausted_stub(&dir)));
        let repo = MockRepository::new(dir.path())
            .with_tag("v1.0.0", 1)
            .with_messages(&["fix: thing"]);
        let mut prompt = ScriptedPrompter::new();

        let opts = ReleaseOptions {
            changelog: true,
            ..ReleaseOptions::default()
        };
        let err = Releaser::new(opts, store, &repo, &mut prompt, dir.path())
            .unwrap()
            .run()
            .unwrap_err();

        assert!(matches!(err, ReleaserError::ChangelogNotFound));
        // nothing was tagged
        assert!(repo.created_tags().is_empty());
        prompt.finish();
    }

    #[test]
    fn test_reset_clears_persisted_state() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        let mut stale = ReleaseConfig::default();
        stale.set_current_sem_ver("9.9.9");
        stale.configured = true;
        store.save(&stale).unwrap();

        let repo = MockRepository::new(dir.path());
        let mut prompt = ScriptedPrompter::new();
        let opts = ReleaseOptions {
            reset: true,
            ..ReleaseOptions::default()
        };

        // reset happens in the constructor; the loaded config is fresh
        let releaser = Releaser::new(opts, store.clone(), &repo, &mut prompt, dir.path()).unwrap();
        assert!(!releaser.config.configured);
        assert!(releaser.config.current_sem_ver.is_none());
    }

    #[test]
    fn test_prerelease_identifier_flows_through() {
        let dir = TempDir::new().unwrap();
        let store = seeded_store(&dir, Some(exhausted_stub(&dir)));
        let repo = MockRepository::new(dir.path())
            .with_tag("v1.0.0", 1)
            .with_messages(&["fix: fiddly"]);
        let mut prompt = ScriptedPrompter::new();

        let opts = ReleaseOptions {
            auto: false,
            release: Some(BumpType::Prerelease),
            identifier: Some("alpha".to_string()),
            ..ReleaseOptions::default()
        };
        let outcome = Releaser::new(opts, store, &repo, &mut prompt, dir.path())
            .unwrap()
            .run()
            .unwrap();

        assert_eq!(outcome.label, "v1.0.1-alpha.0");
        prompt.finish();
    }
}
