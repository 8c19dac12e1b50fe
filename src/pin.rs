//! Repository pins: what a mirrored repository should be checked out at.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Grouping used to select repositories for a sync run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    /// The language itself and its first-party examples.
    Core,
    /// Third-party and first-party libraries.
    Libraries,
    /// Large reference codebases.
    Reference,
}

impl Category {
    pub const ALL: [Category; 3] = [Category::Core, Category::Libraries, Category::Reference];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Core => "core",
            Category::Libraries => "libraries",
            Category::Reference => "reference",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| Error::Config {
                message: format!("Unknown category '{}'", s),
                hint: Some("Use one of: core, libraries, reference".to_string()),
            })
    }
}

/// The authoritative ref of a pin, resolved once with priority
/// `commit > tag > branch`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefSpec {
    /// An exact commit; may be an abbreviated hash.
    Commit(String),
    /// A tag name.
    Tag(String),
    /// A branch, or the remote's default branch when `None`.
    Branch(Option<String>),
}

impl RefSpec {
    /// Resolve the three optional pin fields. Empty strings count as unset.
    pub fn resolve(commit: Option<&str>, tag: Option<&str>, branch: Option<&str>) -> Self {
        fn set(v: Option<&str>) -> Option<&str> {
            v.map(str::trim).filter(|s| !s.is_empty())
        }
        if let Some(commit) = set(commit) {
            RefSpec::Commit(commit.to_string())
        } else if let Some(tag) = set(tag) {
            RefSpec::Tag(tag.to_string())
        } else {
            RefSpec::Branch(set(branch).map(str::to_string))
        }
    }

    /// `commit`, `tag` or `branch`.
    pub fn kind(&self) -> &'static str {
        match self {
            RefSpec::Commit(_) => "commit",
            RefSpec::Tag(_) => "tag",
            RefSpec::Branch(_) => "branch",
        }
    }

    /// The ref name; `default` for the remote's default branch.
    pub fn name(&self) -> &str {
        match self {
            RefSpec::Commit(c) => c,
            RefSpec::Tag(t) => t,
            RefSpec::Branch(Some(b)) => b,
            RefSpec::Branch(None) => "default",
        }
    }
}

impl fmt::Display for RefSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name(), self.kind())
    }
}

/// A repository in the pin table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositoryPin {
    /// Unique key; also the directory name under the mirror root.
    pub name: String,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branch: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub commit: Option<String>,
    /// Paths to materialize with a sparse checkout; the whole tree when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sparse_paths: Option<Vec<String>>,
    pub category: Category,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
}

impl RepositoryPin {
    pub fn new(name: impl Into<String>, url: impl Into<String>, category: Category) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            branch: None,
            tag: None,
            commit: None,
            sparse_paths: None,
            category,
            description: String::new(),
        }
    }

    pub fn with_branch(mut self, branch: impl Into<String>) -> Self {
        self.branch = Some(branch.into());
        self
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }

    pub fn with_commit(mut self, commit: impl Into<String>) -> Self {
        self.commit = Some(commit.into());
        self
    }

    pub fn with_sparse_paths<I, S>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.sparse_paths = Some(paths.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn ref_spec(&self) -> RefSpec {
        RefSpec::resolve(
            self.commit.as_deref(),
            self.tag.as_deref(),
            self.branch.as_deref(),
        )
    }

    /// Sparse paths, when there is at least one.
    pub fn sparse(&self) -> Option<&[String]> {
        self.sparse_paths
            .as_deref()
            .filter(|paths| !paths.is_empty())
    }
}
