//! Conventional-commit analysis.
//!
//! Two consumers: the automatic bump classifier (which release type do the
//! commits since the last tag warrant) and the changelog generator (group
//! those commits into preset-defined sections).

use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use regex::Regex;

use crate::error::{ReleaserError, Result};
use crate::version::BumpType;

#[derive(Debug, Clone, PartialEq)]
pub struct ParsedCommit {
    pub r#type: String,
    pub scope: Option<String>,
    pub description: String,
    pub is_breaking_change: bool,
}

static SCOPED_RE: OnceLock<Regex> = OnceLock::new();
static BANG_RE: OnceLock<Regex> = OnceLock::new();
static PLAIN_RE: OnceLock<Regex> = OnceLock::new();

/// Parses a commit message into its conventional parts.
///
/// Non-conventional messages fall back to a `chore` with the full message as
/// description, so every commit lands in some changelog bucket.
pub fn parse_commit(message: &str) -> ParsedCommit {
    let has_breaking_footer = message.contains("BREAKING CHANGE:");

    // type(scope): description, optionally with a ! marker
    let scoped =
        SCOPED_RE.get_or_init(|| Regex::new(r"^([a-z]+)\(([^)]+)\)(!?):\s*(.*)").unwrap());
    if let Some(captures) = scoped.captures(message) {
        return ParsedCommit {
            r#type: captures[1].to_string(),
            scope: Some(captures[2].to_string()),
            description: captures[4].to_string(),
            is_breaking_change: &captures[3] == "!" || has_breaking_footer,
        };
    }

    // type!: description
    let bang = BANG_RE.get_or_init(|| Regex::new(r"^([a-z]+)!:\s*(.*)").unwrap());
    if let Some(captures) = bang.captures(message) {
        return ParsedCommit {
            r#type: captures[1].to_string(),
            scope: None,
            description: captures[2].to_string(),
            is_breaking_change: true,
        };
    }

    // type: description
    let plain = PLAIN_RE.get_or_init(|| Regex::new(r"^([a-z]+):\s*(.*)").unwrap());
    if let Some(captures) = plain.captures(message) {
        return ParsedCommit {
            r#type: captures[1].to_string(),
            scope: None,
            description: captures[2].to_string(),
            is_breaking_change: has_breaking_footer,
        };
    }

    ParsedCommit {
        r#type: "chore".to_string(),
        scope: None,
        description: message.lines().next().unwrap_or("").to_string(),
        is_breaking_change: has_breaking_footer,
    }
}

/// Classifies the bump type the given commit history warrants.
///
/// Breaking changes win, features beat fixes, and a history with no
/// significant commits still resolves to a patch.
pub fn recommended_bump(messages: &[String]) -> BumpType {
    let mut has_features = false;

    for message in messages {
        let parsed = parse_commit(message);
        if parsed.is_breaking_change {
            return BumpType::Major;
        }
        if matches!(parsed.r#type.as_str(), "feat" | "feature") {
            has_features = true;
        }
    }

    if has_features {
        BumpType::Minor
    } else {
        BumpType::Patch
    }
}

/// Changelog section grouping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Preset {
    /// feat/fix/perf sections only, the classic angular layout.
    Angular,
    /// Every commit type gets a section, plus an Others bucket.
    ConventionalCommits,
}

impl Default for Preset {
    fn default() -> Self {
        Preset::Angular
    }
}

impl FromStr for Preset {
    type Err = ReleaserError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "angular" => Ok(Preset::Angular),
            "conventionalcommits" | "conventional" => Ok(Preset::ConventionalCommits),
            other => Err(ReleaserError::config(format!(
                "Unknown changelog preset: {}",
                other
            ))),
        }
    }
}

impl fmt::Display for Preset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Preset::Angular => f.write_str("angular"),
            Preset::ConventionalCommits => f.write_str("conventionalcommits"),
        }
    }
}

fn section_title(commit_type: &str, preset: Preset) -> Option<&'static str> {
    match commit_type {
        "feat" | "feature" => Some("Features"),
        "fix" => Some("Bug Fixes"),
        "perf" => Some("Performance Improvements"),
        "docs" if preset == Preset::ConventionalCommits => Some("Documentation"),
        "refactor" if preset == Preset::ConventionalCommits => Some("Code Refactoring"),
        _ if preset == Preset::ConventionalCommits => Some("Others"),
        _ => None,
    }
}

fn entry_line(parsed: &ParsedCommit) -> String {
    match &parsed.scope {
        Some(scope) => format!("* **{}:** {}", scope, parsed.description),
        None => format!("* {}", parsed.description),
    }
}

/// Renders the release-notes section for one release.
///
/// `messages` is the commit history since the prior tag, newest first;
/// entries are emitted oldest first within each section.
pub fn render_notes(label: &str, messages: &[String], preset: Preset) -> String {
    const ORDER: [&str; 6] = [
        "Features",
        "Bug Fixes",
        "Performance Improvements",
        "Documentation",
        "Code Refactoring",
        "Others",
    ];

    let mut sections: Vec<(&str, Vec<String>)> =
        ORDER.iter().map(|title| (*title, Vec::new())).collect();
    let mut breaking: Vec<String> = Vec::new();

    for message in messages.iter().rev() {
        let parsed = parse_commit(message);
        if parsed.is_breaking_change {
            breaking.push(entry_line(&parsed));
        }
        if let Some(title) = section_title(&parsed.r#type, preset) {
            if let Some((_, entries)) = sections.iter_mut().find(|(t, _)| *t == title) {
                entries.push(entry_line(&parsed));
            }
        }
    }

    let date = chrono::Utc::now().format("%Y-%m-%d");
    let mut notes = format!("## {} ({})\n", label, date);

    for (title, entries) in &sections {
        if entries.is_empty() {
            continue;
        }
        notes.push_str(&format!("\n### {}\n\n", title));
        for entry in entries {
            notes.push_str(entry);
            notes.push('\n');
        }
    }

    if !breaking.is_empty() {
        notes.push_str("\n### BREAKING CHANGES\n\n");
        for entry in &breaking {
            notes.push_str(entry);
            notes.push('\n');
        }
    }

    notes
}
