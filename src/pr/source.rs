//! Read interface over pull request data supplied by the hosting environment.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised by a [`PrDataSource`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SourceError {
    /// The commit list could not be produced.
    #[error("Failed to list pull request commits: {0}")]
    Commits(String),

    /// The diff for a file could not be produced.
    #[error("Failed to read diff lines for {path}: {reason}")]
    Diff {
        /// File path the diff was requested for.
        path: String,
        /// Failure description.
        reason: String,
    },
}

/// A commit as seen by the checks.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Commit {
    /// Commit hash, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sha: Option<String>,
    /// Parent hashes; `None` when the source does not expose them.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parents: Option<Vec<String>>,
}

impl Commit {
    /// Creates a commit with the given parent hashes.
    pub fn with_parents<I, S>(parents: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            sha: None,
            parents: Some(parents.into_iter().map(Into::into).collect()),
        }
    }

    /// Whether this commit has more than one parent.
    pub fn is_merge_commit(&self) -> bool {
        self.parents.as_ref().is_some_and(|p| p.len() > 1)
    }
}

/// Deleted and added line texts of one file in the pull request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffLines {
    /// Removed lines, without the leading `-`.
    #[serde(default)]
    pub deletions: Vec<String>,
    /// Added lines, without the leading `+`.
    #[serde(default)]
    pub additions: Vec<String>,
}

/// Read-only view of a pull request.
pub trait PrDataSource {
    /// Name of the branch the pull request merges into.
    fn base_branch_name(&self) -> String;

    /// Name of the branch the pull request merges from.
    fn head_branch_name(&self) -> String;

    /// Added line count; unknown counts are reported as 0.
    fn addition_lines(&self) -> usize;

    /// Deleted line count; unknown counts are reported as 0.
    fn deletion_lines(&self) -> usize;

    /// Paths of files touched by the pull request.
    fn modified_files(&self) -> Vec<String>;

    /// Commits in VCS order.
    fn commits(&self) -> Result<Vec<Commit>, SourceError>;

    /// Diff content of one file.
    fn diff_lines(&self, path: &str) -> Result<DiffLines, SourceError>;

    /// Whether the data comes from a hosted pull request rather than a local run.
    fn is_hosted(&self) -> bool {
        true
    }

    /// Total of added and deleted lines.
    fn modified_lines(&self) -> usize {
        self.addition_lines().saturating_add(self.deletion_lines())
    }

    /// Whether `path` is among the modified files.
    fn has_modified_file(&self, path: &str) -> bool {
        self.modified_files().iter().any(|f| f == path)
    }

    /// Whether any added line of `path` contains `content`.
    fn has_modified_content(&self, content: &str, path: &str) -> Result<bool, SourceError> {
        Ok(self
            .diff_lines(path)?
            .additions
            .iter()
            .any(|line| line.contains(content)))
    }
}
