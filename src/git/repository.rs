//! `git2`-backed implementation of the [Repository] gateway.

use std::path::{Path, PathBuf};

use git2::{ObjectType, Oid, Repository as Git2Repo};

use crate::error::{ReleaserError, Result};
use crate::git::Repository;
use crate::version::TagPattern;

pub struct Git2Repository {
    repo: Git2Repo,
}

impl Git2Repository {
    /// Discovers the repository enclosing `path`. Fails when `path` is not
    /// inside a repository.
    pub fn discover(path: &Path) -> Result<Self> {
        let repo = Git2Repo::discover(path)?;
        Ok(Git2Repository { repo })
    }

    fn all_tags(&self) -> Result<Vec<String>> {
        let names = self.repo.tag_names(None)?;
        Ok(names.iter().flatten().map(str::to_string).collect())
    }

    fn head_oid(&self) -> Result<Oid> {
        let head = self.repo.head()?;
        head.target()
            .ok_or_else(|| ReleaserError::config("HEAD is detached or invalid"))
    }

    fn walk_since(&self, hash: Option<&str>) -> Result<git2::Revwalk<'_>> {
        let mut revwalk = self.repo.revwalk()?;
        revwalk.push(self.head_oid()?)?;
        if let Some(hash) = hash {
            revwalk.hide(Oid::from_str(hash)?)?;
        }
        Ok(revwalk)
    }
}

impl Repository for Git2Repository {
    fn find_root(&self) -> Result<PathBuf> {
        self.repo
            .workdir()
            .map(Path::to_path_buf)
            .ok_or_else(|| ReleaserError::config("Repository has no working directory"))
    }

    fn any_tag_exists(&self) -> Result<bool> {
        Ok(!self.all_tags()?.is_empty())
    }

    fn tag_exists(&self, label: &str) -> Result<bool> {
        Ok(self.all_tags()?.iter().any(|t| t == label))
    }

    fn tags_matching(&self, pattern: TagPattern) -> Result<Vec<String>> {
        Ok(self
            .all_tags()?
            .into_iter()
            .filter(|t| pattern.matches(t))
            .collect())
    }

    fn hash_of_label(&self, label: &str) -> Result<String> {
        let reference = self
            .repo
            .find_reference(&format!("refs/tags/{}", label))
            .map_err(|_| ReleaserError::LabelNotFound(label.to_string()))?;
        // peel through annotated tags to the commit
        let object = reference
            .peel(ObjectType::Commit)
            .map_err(|_| ReleaserError::LabelNotFound(label.to_string()))?;
        Ok(object.id().to_string())
    }

    fn commits_since(&self, hash: &str) -> Result<usize> {
        let mut count = 0;
        for oid in self.walk_since(Some(hash))? {
            oid?;
            count += 1;
        }
        Ok(count)
    }

    fn messages_since(&self, hash: Option<&str>) -> Result<Vec<String>> {
        let mut messages = Vec::new();
        for oid in self.walk_since(hash)? {
            let commit = self.repo.find_commit(oid?)?;
            messages.push(commit.message().unwrap_or("").trim_end().to_string());
        }
        Ok(messages)
    }

    fn create_tag(&self, label: &str) -> Result<()> {
        if self.tag_exists(label)? {
            return Err(ReleaserError::TagAlreadyExists(label.to_string()));
        }
        let head = self.repo.head()?.peel_to_commit()?;
        self.repo.tag_lightweight(label, head.as_object(), false)?;
        Ok(())
    }

    fn commit(&self, message: &str, paths: &[PathBuf]) -> Result<()> {
        let workdir = self.find_root()?;
        let mut index = self.repo.index()?;

        if paths.is_empty() {
            index.add_all(["*"].iter(), git2::IndexAddOption::DEFAULT, None)?;
        } else {
            for path in paths {
                let relative = path.strip_prefix(&workdir).unwrap_or(path);
                index.add_path(relative)?;
            }
        }
        index.write()?;

        let tree_id = index.write_tree()?;
        let tree = self.repo.find_tree(tree_id)?;
        let parent = self.repo.head()?.peel_to_commit()?;

        if paths.is_empty() && tree_id == parent.tree_id() {
            return Err(ReleaserError::config("Nothing staged to commit"));
        }

        let signature = self.repo.signature()?;
        self.repo.commit(
            Some("HEAD"),
            &signature,
            &signature,
            message,
            &tree,
            &[&parent],
        )?;
        Ok(())
    }

    fn current_branch(&self) -> Result<String> {
        let head = self.repo.head()?;
        Ok(head.shorthand().unwrap_or("HEAD").to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    // Minimal fixture: one repo, one commit, one tag.
    fn fixture() -> (TempDir, Git2Repository) {
        let dir = TempDir::new().unwrap();
        let repo = Git2Repo::init(dir.path()).unwrap();
        {
            let mut config = repo.config().unwrap();
            config.set_str("user.name", "Test User").unwrap();
            config.set_str("user.email", "test@example.com").unwrap();
        }
        fs::write(dir.path().join("README.md"), "hello\n").unwrap();
        let mut index = repo.index().unwrap();
        index.add_path(Path::new("README.md")).unwrap();
        index.write().unwrap();
        let tree_id = index.write_tree().unwrap();
        let tree = repo.find_tree(tree_id).unwrap();
        let sig = repo.signature().unwrap();
        let commit_id = repo
            .commit(Some("HEAD"), &sig, &sig, "chore: initial commit", &tree, &[])
            .unwrap();
        repo.tag_lightweight("v1.0.0", &repo.find_object(commit_id, None).unwrap(), false)
            .unwrap();

        let gateway = Git2Repository::discover(dir.path()).unwrap();
        (dir, gateway)
    }

    #[test]
    fn test_tag_queries() {
        let (_dir, repo) = fixture();
        assert!(repo.any_tag_exists().unwrap());
        assert!(repo.tag_exists("v1.0.0").unwrap());
        assert!(!repo.tag_exists("v9.9.9").unwrap());
        assert_eq!(
            repo.tags_matching(TagPattern::Prefixed).unwrap(),
            vec!["v1.0.0"]
        );
        assert!(repo.tags_matching(TagPattern::Unprefixed).unwrap().is_empty());
    }

    #[test]
    fn test_hash_and_distance() {
        let (_dir, repo) = fixture();
        let hash = repo.hash_of_label("v1.0.0").unwrap();
        assert_eq!(hash.len(), 40);
        assert_eq!(repo.commits_since(&hash).unwrap(), 0);
        assert!(matches!(
            repo.hash_of_label("nope"),
            Err(ReleaserError::LabelNotFound(_))
        ));
    }

    #[test]
    fn test_create_tag_rejects_duplicates() {
        let (_dir, repo) = fixture();
        repo.create_tag("v1.1.0").unwrap();
        assert!(repo.tag_exists("v1.1.0").unwrap());
        assert!(matches!(
            repo.create_tag("v1.1.0"),
            Err(ReleaserError::TagAlreadyExists(_))
        ));
    }

    #[test]
    fn test_commit_stages_given_path() {
        let (dir, repo) = fixture();
        let file = dir.path().join("CHANGELOG.md");
        fs::write(&file, "## v1.1.0\n").unwrap();

        repo.commit("chore(release): update changelog for v1.1.0", &[file])
            .unwrap();

        let hash = repo.hash_of_label("v1.0.0").unwrap();
        assert_eq!(repo.commits_since(&hash).unwrap(), 1);
        let messages = repo.messages_since(Some(&hash)).unwrap();
        assert_eq!(
            messages,
            vec!["chore(release): update changelog for v1.1.0"]
        );
    }

    #[test]
    fn test_find_root_and_branch() {
        let (dir, repo) = fixture();
        let root = repo.find_root().unwrap();
        assert_eq!(
            root.canonicalize().unwrap(),
            dir.path().canonicalize().unwrap()
        );
        let branch = repo.current_branch().unwrap();
        assert!(branch == "main" || branch == "master");
    }
}
