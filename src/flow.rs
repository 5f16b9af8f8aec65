//! Branching models and the pull request workflows they select.

pub mod branch;
pub mod checks;
pub mod error;
pub mod git_flow;
pub mod github_flow;

use std::fmt;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

pub use branch::{Branch, BranchClassifier, BranchKind, BranchNames, Reference};
pub use checks::CheckContext;
pub use error::{BranchError, FlowError};
pub use git_flow::GitFlow;
pub use github_flow::{GitHubFlow, WorkingBranch, WorkingBranchKind};

use crate::config::Configuration;
use crate::data::Report;
use crate::pr::{Messenger, PrDataSource};

/// A policy-driven check sequence selected by the head branch.
pub trait Workflow {
    /// Runs the checks for `pr`, sending notifications to `sink`.
    fn check(&self, pr: &dyn PrDataSource, sink: &dyn Messenger) -> Result<Report, FlowError>;
}

/// Supported branching models.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum FlowModel {
    /// `main`, `develop`, `feature/*`, `release/*`, `hotfix/*`, `ci/*`.
    #[default]
    GitFlow,
    /// `main`, `ci/*` and short-lived working branches.
    #[serde(rename = "github-flow")]
    #[value(name = "github-flow")]
    GitHubFlow,
}

impl FlowModel {
    /// Builds the workflow for this model.
    pub fn workflow(self, configuration: Configuration) -> Box<dyn Workflow> {
        match self {
            Self::GitFlow => Box::new(GitFlow::new(configuration)),
            Self::GitHubFlow => Box::new(GitHubFlow::new(configuration)),
        }
    }
}

impl fmt::Display for FlowModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::GitFlow => write!(f, "git-flow"),
            Self::GitHubFlow => write!(f, "github-flow"),
        }
    }
}
