//! Git repository access: current branch and pull request commit ranges.

use std::path::Path;

use anyhow::{Context, Result};
use git2::Repository;
use tracing::debug;

use crate::pr::Commit;

/// Git repository wrapper.
pub struct GitRepository {
    repo: Repository,
}

impl GitRepository {
    /// Opens the repository containing the current directory.
    pub fn open() -> Result<Self> {
        let repo = Repository::discover(".").context("Not in a git repository")?;

        Ok(Self { repo })
    }

    /// Opens the repository at the specified path.
    pub fn open_at<P: AsRef<Path>>(path: P) -> Result<Self> {
        let repo = Repository::open(path.as_ref()).with_context(|| {
            format!("Failed to open git repository: {}", path.as_ref().display())
        })?;

        Ok(Self { repo })
    }

    /// Returns the current branch name.
    pub fn current_branch(&self) -> Result<String> {
        let head = self.repo.head().context("Failed to get HEAD reference")?;

        if let Some(name) = head.shorthand() {
            if name != "HEAD" {
                return Ok(name.to_string());
            }
        }

        anyhow::bail!("Repository is in detached HEAD state")
    }

    /// Lists the commits reachable from `head` but not from `base`, oldest
    /// first, merge commits included.
    pub fn commits_between(&self, base: &str, head: &str) -> Result<Vec<Commit>> {
        let base_commit = self
            .repo
            .revparse_single(base)
            .with_context(|| format!("Failed to parse base revision: {base}"))?
            .peel_to_commit()
            .context("Failed to peel base object to commit")?;
        let head_commit = self
            .repo
            .revparse_single(head)
            .with_context(|| format!("Failed to parse head revision: {head}"))?
            .peel_to_commit()
            .context("Failed to peel head object to commit")?;

        let mut walker = self.repo.revwalk().context("Failed to create revwalk")?;
        walker
            .push(head_commit.id())
            .context("Failed to push head commit")?;
        walker
            .hide(base_commit.id())
            .context("Failed to hide base commit")?;

        let mut commits = Vec::new();
        for oid in walker {
            let oid = oid.context("Failed to get commit OID from walker")?;
            let commit = self
                .repo
                .find_commit(oid)
                .context("Failed to find commit")?;
            commits.push(Commit {
                sha: Some(oid.to_string()),
                parents: Some(commit.parent_ids().map(|id| id.to_string()).collect()),
            });
        }

        // Revwalk yields newest first.
        commits.reverse();
        debug!(base, head, count = commits.len(), "Listed pull request commits");
        Ok(commits)
    }
}
