use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use regex::Regex;
use semver::{BuildMetadata, Prerelease, Version};

use crate::error::{ReleaserError, Result};

/// The kind of semantic version increment to apply.
///
/// Matches the release types accepted by the CLI; `Prerelease` additionally
/// consumes the optional identifier passed to [increment].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BumpType {
    Major,
    Minor,
    Patch,
    Premajor,
    Preminor,
    Prepatch,
    Prerelease,
}

impl FromStr for BumpType {
    type Err = ReleaserError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "major" => Ok(BumpType::Major),
            "minor" => Ok(BumpType::Minor),
            "patch" => Ok(BumpType::Patch),
            "premajor" => Ok(BumpType::Premajor),
            "preminor" => Ok(BumpType::Preminor),
            "prepatch" => Ok(BumpType::Prepatch),
            "prerelease" => Ok(BumpType::Prerelease),
            other => Err(ReleaserError::InvalidBumpType(other.to_string())),
        }
    }
}

impl fmt::Display for BumpType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            BumpType::Major => "major",
            BumpType::Minor => "minor",
            BumpType::Patch => "patch",
            BumpType::Premajor => "premajor",
            BumpType::Preminor => "preminor",
            BumpType::Prepatch => "prepatch",
            BumpType::Prerelease => "prerelease",
        };
        f.write_str(s)
    }
}

/// Tag-namespace filter by prefix convention.
///
/// The regexes are the original semver tag grammar: `v?MAJOR.MINOR.PATCH`
/// with an optional `-N` or `-word.N` pre-release suffix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagPattern {
    /// Any semver tag, prefixed or not.
    Any,
    /// Only `v`-prefixed semver tags.
    Prefixed,
    /// Only bare semver tags.
    Unprefixed,
}

static ANY_RE: OnceLock<Regex> = OnceLock::new();
static PREFIXED_RE: OnceLock<Regex> = OnceLock::new();
static UNPREFIXED_RE: OnceLock<Regex> = OnceLock::new();

impl TagPattern {
    pub fn regex(&self) -> &'static Regex {
        match self {
            TagPattern::Any => ANY_RE
                .get_or_init(|| Regex::new(r"^v?\d+\.\d+\.\d+-?(?:\d*|\w*\.\d+)$").unwrap()),
            TagPattern::Prefixed => PREFIXED_RE
                .get_or_init(|| Regex::new(r"^v\d+\.\d+\.\d+-?(?:\d*|\w*\.\d+)$").unwrap()),
            TagPattern::Unprefixed => UNPREFIXED_RE
                .get_or_init(|| Regex::new(r"^\d+\.\d+\.\d+-?(?:\d*|\w*\.\d+)$").unwrap()),
        }
    }

    pub fn matches(&self, tag: &str) -> bool {
        self.regex().is_match(tag)
    }
}

/// Removes a leading `v` prefix from a tag label, if present.
pub fn strip_prefix(label: &str) -> &str {
    label.strip_prefix('v').unwrap_or(label)
}

/// True iff the label (with or without `v` prefix) parses as semver.
pub fn is_valid(label: &str) -> bool {
    Version::parse(strip_prefix(label)).is_ok()
}

fn parse(label: &str) -> Result<Version> {
    Version::parse(strip_prefix(label))
        .map_err(|_| ReleaserError::InvalidVersion(label.to_string()))
}

/// Orders two labels descending by semver precedence.
///
/// Used to pick the highest of a tag set as "latest": sorting with this
/// comparator puts the newest version first. Labels that fail to parse sort
/// after every valid one.
pub fn reverse_compare(a: &str, b: &str) -> Ordering {
    match (Version::parse(strip_prefix(a)), Version::parse(strip_prefix(b))) {
        (Ok(va), Ok(vb)) => vb.cmp(&va),
        (Ok(_), Err(_)) => Ordering::Less,
        (Err(_), Ok(_)) => Ordering::Greater,
        (Err(_), Err(_)) => b.cmp(a),
    }
}

fn initial_prerelease(identifier: Option<&str>) -> Result<Prerelease> {
    let pre = match identifier {
        Some(id) => format!("{}.0", id),
        None => "0".to_string(),
    };
    Prerelease::new(&pre).map_err(|_| ReleaserError::InvalidVersion(pre))
}

/// Advances an existing pre-release sequence one step.
///
/// Matches node-semver: a differing identifier restarts at `{id}.0`, a
/// trailing numeric segment is incremented, and a purely textual sequence
/// gets a `.0` appended.
fn bump_prerelease(pre: &Prerelease, identifier: Option<&str>) -> Result<Prerelease> {
    let mut parts: Vec<String> = pre.as_str().split('.').map(str::to_string).collect();

    if let Some(id) = identifier {
        if parts.first().map(String::as_str) != Some(id) {
            return initial_prerelease(Some(id));
        }
    }

    match parts.iter().rposition(|p| p.parse::<u64>().is_ok()) {
        Some(idx) => {
            let n: u64 = parts[idx].parse().unwrap_or(0);
            parts[idx] = (n + 1).to_string();
        }
        None => parts.push("0".to_string()),
    }

    let joined = parts.join(".");
    Prerelease::new(&joined).map_err(|_| ReleaserError::InvalidVersion(joined))
}

/// Increments a version label by the given bump type.
///
/// The returned string never carries a `v` prefix; callers apply the tag
/// convention themselves. Fails with `InvalidVersionError` when the label is
/// not semver. `identifier` only matters for the pre-release bump types.
pub fn increment(label: &str, bump: BumpType, identifier: Option<&str>) -> Result<String> {
    let mut v = parse(label)?;

    match bump {
        BumpType::Major => {
            // 2.0.0-alpha bumps to 2.0.0, not 3.0.0
            if v.pre.is_empty() || v.minor != 0 || v.patch != 0 {
                v.major += 1;
            }
            v.minor = 0;
            v.patch = 0;
            v.pre = Prerelease::EMPTY;
        }
        BumpType::Minor => {
            if v.pre.is_empty() || v.patch != 0 {
                v.minor += 1;
            }
            v.patch = 0;
            v.pre = Prerelease::EMPTY;
        }
        BumpType::Patch => {
            if v.pre.is_empty() {
                v.patch += 1;
            }
            v.pre = Prerelease::EMPTY;
        }
        BumpType::Premajor => {
            v.major += 1;
            v.minor = 0;
            v.patch = 0;
            v.pre = initial_prerelease(identifier)?;
        }
        BumpType::Preminor => {
            v.minor += 1;
            v.patch = 0;
            v.pre = initial_prerelease(identifier)?;
        }
        BumpType::Prepatch => {
            v.patch += 1;
            v.pre = initial_prerelease(identifier)?;
        }
        BumpType::Prerelease => {
            if v.pre.is_empty() {
                v.patch += 1;
                v.pre = initial_prerelease(identifier)?;
            } else {
                v.pre = bump_prerelease(&v.pre, identifier)?;
            }
        }
    }

    v.build = BuildMetadata::EMPTY;
    Ok(v.to_string())
}
