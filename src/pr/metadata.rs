//! Pull request metadata loaded from a YAML or JSON file.
//!
//! CI jobs export the hosting service's pull request data into this format
//! and hand the file to `flowcheck pr check`.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::source::{Commit, DiffLines, PrDataSource, SourceError};

/// Pull request metadata file contents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrMetadata {
    /// Branch the pull request merges into.
    pub base_branch: String,
    /// Branch the pull request merges from.
    pub head_branch: String,
    /// Added line count, if the host reports it.
    #[serde(default)]
    pub additions: Option<usize>,
    /// Deleted line count, if the host reports it.
    #[serde(default)]
    pub deletions: Option<usize>,
    /// Paths of modified files.
    #[serde(default)]
    pub modified_files: Vec<String>,
    /// Commits in VCS order.
    #[serde(default)]
    pub commits: Vec<Commit>,
    /// Diff lines keyed by file path.
    #[serde(default)]
    pub diffs: BTreeMap<String, DiffLines>,
    /// False when the data was produced by a local run rather than a hosted pull request.
    #[serde(default = "default_hosted")]
    pub hosted: bool,
}

fn default_hosted() -> bool {
    true
}

impl Default for PrMetadata {
    fn default() -> Self {
        Self {
            base_branch: String::new(),
            head_branch: String::new(),
            additions: None,
            deletions: None,
            modified_files: Vec::new(),
            commits: Vec::new(),
            diffs: BTreeMap::new(),
            hosted: default_hosted(),
        }
    }
}

impl PrMetadata {
    /// Loads metadata from a YAML or JSON file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let metadata: Self = crate::data::read_yaml_file(path)
            .with_context(|| format!("Failed to load PR metadata: {}", path.display()))?;
        debug!(
            head = %metadata.head_branch,
            base = %metadata.base_branch,
            commits = metadata.commits.len(),
            "Loaded PR metadata"
        );
        Ok(metadata)
    }

    /// Replaces the commit list, e.g. with commits read from a local repository.
    #[must_use]
    pub fn with_commits(mut self, commits: Vec<Commit>) -> Self {
        self.commits = commits;
        self
    }
}

impl PrDataSource for PrMetadata {
    fn base_branch_name(&self) -> String {
        self.base_branch.clone()
    }

    fn head_branch_name(&self) -> String {
        self.head_branch.clone()
    }

    fn addition_lines(&self) -> usize {
        self.additions.unwrap_or(0)
    }

    fn deletion_lines(&self) -> usize {
        self.deletions.unwrap_or(0)
    }

    fn modified_files(&self) -> Vec<String> {
        self.modified_files.clone()
    }

    fn commits(&self) -> Result<Vec<Commit>, SourceError> {
        Ok(self.commits.clone())
    }

    fn diff_lines(&self, path: &str) -> Result<DiffLines, SourceError> {
        // Files absent from the export have no diff.
        Ok(self.diffs.get(path).cloned().unwrap_or_default())
    }

    fn is_hosted(&self) -> bool {
        self.hosted
    }
}
