//! Workflow error handling.

use thiserror::Error;

use super::branch::BranchKind;
use crate::data::Report;
use crate::pr::SourceError;

/// Errors raised while building a [`Branch`](super::Branch).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BranchError {
    /// Main, develop and CI branches never carry a reference.
    #[error("A {0} branch cannot carry an issue or ticket reference")]
    ReferenceNotAllowed(BranchKind),
}

/// Errors that abort a workflow run.
#[derive(Error, Debug)]
pub enum FlowError {
    /// The head branch name matches no known branch pattern.
    #[error("Invalid head branch: {name:?} does not match any known branch pattern")]
    InvalidHeadBranch {
        /// Raw head branch name.
        name: String,
    },

    /// The head branch cannot anchor a pull request workflow.
    #[error("Illegal head branch: a pull request cannot be opened from the {0} branch")]
    IllegalHeadBranch(String),

    /// A collaborator failed after the report was created.
    #[error("Workflow interrupted: {source}")]
    Interrupted {
        /// Checks recorded before the failure.
        report: Box<Report>,
        /// Underlying failure.
        #[source]
        source: SourceError,
    },
}

impl FlowError {
    /// Returns the partial report carried by an interrupted run.
    pub fn partial_report(&self) -> Option<&Report> {
        match self {
            Self::Interrupted { report, .. } => Some(report),
            _ => None,
        }
    }
}
