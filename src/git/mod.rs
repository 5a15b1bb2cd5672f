//! Repository gateway.
//!
//! A trait-based abstraction over the version-control operations the
//! orchestrator needs, with two implementations: [Git2Repository] backed by
//! the `git2` crate, and [MockRepository] for tests. Orchestrator code
//! depends on the [Repository] trait only.
//!
//! Every call has a blocking contract: it returns or fails before the next
//! statement runs, and the gateway never swallows errors silently — low
//! level failures are translated into [crate::error::ReleaserError].

pub mod mock;
pub mod repository;

pub use mock::MockRepository;
pub use repository::Git2Repository;

use std::path::PathBuf;

use crate::error::Result;
use crate::version::TagPattern;

/// Version-control operations consumed by the release orchestrator.
pub trait Repository {
    /// Top-level directory of the enclosing repository.
    fn find_root(&self) -> Result<PathBuf>;

    /// Whether any tag at all exists in the repository.
    fn any_tag_exists(&self) -> Result<bool>;

    /// Whether `label` exactly matches an existing tag.
    fn tag_exists(&self, label: &str) -> Result<bool>;

    /// Tags accepted by the given semver pattern, in VCS order (unsorted).
    fn tags_matching(&self, pattern: TagPattern) -> Result<Vec<String>>;

    /// Commit hash a tag label resolves to. Fails with `LabelNotFoundError`
    /// when the label is not a tag.
    fn hash_of_label(&self, label: &str) -> Result<String>;

    /// Count of commits reachable from HEAD but not from `hash`.
    fn commits_since(&self, hash: &str) -> Result<usize>;

    /// Commit messages reachable from HEAD but not from `hash`, newest
    /// first. `None` walks the full history.
    fn messages_since(&self, hash: Option<&str>) -> Result<Vec<String>>;

    /// Creates a lightweight tag at HEAD. Fails with `TagAlreadyExistsError`
    /// when the label is taken.
    fn create_tag(&self, label: &str) -> Result<()>;

    /// Stages the given paths (all changes when empty) and commits.
    fn commit(&self, message: &str, paths: &[PathBuf]) -> Result<()>;

    /// Short name of the currently checked-out branch.
    fn current_branch(&self) -> Result<String>;
}
