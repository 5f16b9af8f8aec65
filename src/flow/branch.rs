//! Git Flow branch classification and issue/ticket reference extraction.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::error::BranchError;

/// Structural role of a branch in the Git Flow model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BranchKind {
    /// The production branch (`main`, `master`).
    Main,
    /// The integration branch (`develop`).
    Develop,
    /// A feature branch (`feature/...`).
    Feature,
    /// A release preparation branch (`release/...`).
    Release,
    /// A production hotfix branch (`hotfix/...`).
    Hotfix,
    /// A branch generated by a CI service (`ci/...`).
    #[serde(rename = "ci")]
    CI,
}

impl BranchKind {
    /// Whether branches of this kind may carry an issue or ticket reference.
    pub fn accepts_reference(self) -> bool {
        matches!(self, Self::Feature | Self::Release | Self::Hotfix)
    }
}

impl fmt::Display for BranchKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Main => write!(f, "main"),
            Self::Develop => write!(f, "develop"),
            Self::Feature => write!(f, "feature"),
            Self::Release => write!(f, "release"),
            Self::Hotfix => write!(f, "hotfix"),
            Self::CI => write!(f, "ci"),
        }
    }
}

/// An issue or ticket identifier embedded in a branch name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", tag = "type", content = "id")]
pub enum Reference {
    /// Numeric issue on the hosting service, e.g. `issue/42`.
    Issue(String),
    /// Free-form ticket in an external tracker, e.g. `ticket/ABC-1`.
    Ticket(String),
}

impl Reference {
    /// Extracts the first issue reference, or failing that the first ticket
    /// reference, from a raw branch name.
    pub fn extract(name: &str) -> Option<Self> {
        extract_issue(name).or_else(|| extract_ticket(name))
    }
}

/// A classified branch: its kind plus an optional reference.
///
/// Only feature, release and hotfix branches may carry a reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Branch {
    kind: BranchKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    reference: Option<Reference>,
}

impl Branch {
    /// Creates a branch, rejecting a reference on a kind that cannot carry one.
    pub fn new(kind: BranchKind, reference: Option<Reference>) -> Result<Self, BranchError> {
        if reference.is_some() && !kind.accepts_reference() {
            return Err(BranchError::ReferenceNotAllowed(kind));
        }
        Ok(Self { kind, reference })
    }

    /// Creates a branch without a reference.
    pub fn plain(kind: BranchKind) -> Self {
        Self {
            kind,
            reference: None,
        }
    }

    /// Classifies a branch name using the default branch literals.
    pub fn parse(name: &str) -> Option<Self> {
        BranchClassifier::default().classify(name)
    }

    /// Returns the branch kind.
    pub fn kind(&self) -> BranchKind {
        self.kind
    }

    /// Returns the embedded reference, if any.
    pub fn reference(&self) -> Option<&Reference> {
        self.reference.as_ref()
    }

    /// Builds a work branch, whose kind always accepts a reference.
    fn work(kind: BranchKind, name: &str) -> Self {
        debug_assert!(kind.accepts_reference());
        Self {
            kind,
            reference: Reference::extract(name),
        }
    }
}

/// Exact branch names recognised as the main and develop branches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BranchNames {
    /// Literals classified as [`BranchKind::Main`].
    pub main: Vec<String>,
    /// Literals classified as [`BranchKind::Develop`].
    pub develop: Vec<String>,
}

impl Default for BranchNames {
    fn default() -> Self {
        Self {
            main: vec!["main".to_string(), "master".to_string()],
            develop: vec!["develop".to_string()],
        }
    }
}

impl BranchNames {
    /// Whether `name` is one of the configured main branch literals.
    pub fn is_main(&self, name: &str) -> bool {
        self.main.iter().any(|m| m == name)
    }

    /// Whether `name` is one of the configured develop branch literals.
    pub fn is_develop(&self, name: &str) -> bool {
        self.develop.iter().any(|d| d == name)
    }
}

/// Classifies raw branch names into Git Flow branch kinds.
#[derive(Debug, Clone, Default)]
pub struct BranchClassifier {
    names: BranchNames,
}

impl BranchClassifier {
    /// Creates a classifier using the given main/develop literals.
    pub fn new(names: BranchNames) -> Self {
        Self { names }
    }

    /// Classifies a branch name. First match wins; exact literals take
    /// precedence over the token patterns.
    pub fn classify(&self, name: &str) -> Option<Branch> {
        let branch = if self.names.is_main(name) {
            Some(Branch::plain(BranchKind::Main))
        } else if self.names.is_develop(name) {
            Some(Branch::plain(BranchKind::Develop))
        } else if HOTFIX_PATTERN.is_match(name) {
            Some(Branch::work(BranchKind::Hotfix, name))
        } else if FEATURE_PATTERN.is_match(name) {
            Some(Branch::work(BranchKind::Feature, name))
        } else if RELEASE_PATTERN.is_match(name) {
            Some(Branch::work(BranchKind::Release, name))
        } else if CI_PATTERN.is_match(name) {
            // CI branches never carry a reference, even when the name embeds one.
            Some(Branch::plain(BranchKind::CI))
        } else {
            None
        };

        debug!(name, ?branch, "Classified branch");
        branch
    }
}

#[allow(clippy::unwrap_used)] // Compile-time constant regex pattern
static HOTFIX_PATTERN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\bhotfix\b[/-]").unwrap());

#[allow(clippy::unwrap_used)] // Compile-time constant regex pattern
static FEATURE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bfeature\b[/-]").unwrap());

#[allow(clippy::unwrap_used)] // Compile-time constant regex pattern
static RELEASE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\brelease\b[/-]").unwrap());

#[allow(clippy::unwrap_used)] // Compile-time constant regex pattern
static CI_PATTERN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\bci\b[/-]").unwrap());

#[allow(clippy::unwrap_used)] // Compile-time constant regex pattern
static ISSUE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bissue\b[/-](\d+)").unwrap());

#[allow(clippy::unwrap_used)] // Compile-time constant regex pattern
static TICKET_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bticket\b[/-](.+)").unwrap());

fn extract_issue(name: &str) -> Option<Reference> {
    ISSUE_PATTERN
        .captures(name)
        .and_then(|c| c.get(1))
        .map(|m| Reference::Issue(m.as_str().to_string()))
}

fn extract_ticket(name: &str) -> Option<Reference> {
    TICKET_PATTERN
        .captures(name)
        .and_then(|c| c.get(1))
        .map(|m| Reference::Ticket(m.as_str().to_string()))
}
