//! # flowcheck
//!
//! Branching-model aware pull request checks.
//!
//! A pull request is classified by its head branch under Git Flow or GitHub
//! Flow. The matching workflow runs its checks against a [`pr::PrDataSource`],
//! sends warnings and failures to a [`pr::Messenger`] and produces a
//! [`data::Report`] that a [`pr::ReportPublisher`] renders.
//!
//! ## Quick Start
//!
//! ```rust
//! use flowcheck::flow::{Branch, BranchKind};
//!
//! let branch = Branch::parse("feature/issue/42").unwrap();
//! assert_eq!(branch.kind(), BranchKind::Feature);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod cli;
pub mod config;
pub mod data;
pub mod flow;
pub mod git;
pub mod pr;

pub use crate::cli::Cli;
pub use crate::config::Configuration;
pub use crate::data::{CheckResult, Report};
pub use crate::flow::{FlowModel, Workflow};

/// The current version of flowcheck.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
