//! Mock repository for testing without actual git operations.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Mutex;

use crate::error::{ReleaserError, Result};
use crate::git::Repository;
use crate::version::TagPattern;

/// In-memory [Repository]. Tag labels double as their own hashes, and the
/// commit distance per label is configured up front.
pub struct MockRepository {
    root: PathBuf,
    branch: String,
    messages: Vec<String>,
    tags: Mutex<Vec<String>>,
    distances: Mutex<HashMap<String, usize>>,
    commits: Mutex<Vec<(String, Vec<PathBuf>)>>,
}

impl MockRepository {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        MockRepository {
            root: root.into(),
            branch: "develop".to_string(),
            messages: Vec::new(),
            tags: Mutex::new(Vec::new()),
            distances: Mutex::new(HashMap::new()),
            commits: Mutex::new(Vec::new()),
        }
    }

    /// Add a tag with the given number of commits between it and HEAD.
    pub fn with_tag(self, label: impl Into<String>, distance: usize) -> Self {
        let label = label.into();
        self.tags.lock().unwrap().push(label.clone());
        self.distances.lock().unwrap().insert(label, distance);
        self
    }

    /// Set the commit history since the last tag, newest first.
    pub fn with_messages(mut self, messages: &[&str]) -> Self {
        self.messages = messages.iter().map(|m| m.to_string()).collect();
        self
    }

    pub fn with_branch(mut self, branch: impl Into<String>) -> Self {
        self.branch = branch.into();
        self
    }

    /// Tags created through the gateway during the test.
    pub fn created_tags(&self) -> Vec<String> {
        let distances = self.distances.lock().unwrap();
        self.tags
            .lock()
            .unwrap()
            .iter()
            .filter(|t| !distances.contains_key(*t))
            .cloned()
            .collect()
    }

    /// Commits created through the gateway during the test.
    pub fn commits_made(&self) -> Vec<(String, Vec<PathBuf>)> {
        self.commits.lock().unwrap().clone()
    }
}

impl Repository for MockRepository {
    fn find_root(&self) -> Result<PathBuf> {
        Ok(self.root.clone())
    }

    fn any_tag_exists(&self) -> Result<bool> {
        Ok(!self.tags.lock().unwrap().is_empty())
    }

    fn tag_exists(&self, label: &str) -> Result<bool> {
        Ok(self.tags.lock().unwrap().iter().any(|t| t == label))
    }

    fn tags_matching(&self, pattern: TagPattern) -> Result<Vec<String>> {
        Ok(self
            .tags
            .lock()
            .unwrap()
            .iter()
            .filter(|t| pattern.matches(t))
            .cloned()
            .collect())
    }

    fn hash_of_label(&self, label: &str) -> Result<String> {
        if self.tag_exists(label)? {
            Ok(label.to_string())
        } else {
            Err(ReleaserError::LabelNotFound(label.to_string()))
        }
    }

    fn commits_since(&self, hash: &str) -> Result<usize> {
        Ok(self
            .distances
            .lock()
            .unwrap()
            .get(hash)
            .copied()
            .unwrap_or(self.messages.len()))
    }

    fn messages_since(&self, _hash: Option<&str>) -> Result<Vec<String>> {
        Ok(self.messages.clone())
    }

    fn create_tag(&self, label: &str) -> Result<()> {
        let mut tags = self.tags.lock().unwrap();
        if tags.iter().any(|t| t == label) {
            return Err(ReleaserError::TagAlreadyExists(label.to_string()));
        }
        tags.push(label.to_string());
        Ok(())
    }

    fn commit(&self, message: &str, paths: &[PathBuf]) -> Result<()> {
        self.commits
            .lock()
            .unwrap()
            .push((message.to_string(), paths.to_vec()));
        Ok(())
    }

    fn current_branch(&self) -> Result<String> {
        Ok(self.branch.clone())
    }
}
