//! GitHub Flow: a main branch, CI branches and short-lived working branches.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;
use tracing::{debug, info};

use super::branch::{BranchNames, Reference};
use super::checks::{
    announce_reference, check_base_branch, check_change_log_modification,
    check_ci_auto_pr_modification, check_diff_amount, check_no_merge_commits_included,
    run_steps, CheckContext,
};
use super::error::FlowError;
use super::Workflow;
use crate::config::{ChangeLogUpdateRequirement, Configuration};
use crate::data::Report;
use crate::pr::{Messenger, PrDataSource, SourceError};

/// Role of a branch in GitHub Flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkingBranchKind {
    /// The deployable branch.
    Main,
    /// Any branch carrying day-to-day work.
    Working,
    /// A branch generated by a CI service.
    #[serde(rename = "ci")]
    Ci,
}

impl fmt::Display for WorkingBranchKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Main => write!(f, "main"),
            Self::Working => write!(f, "working"),
            Self::Ci => write!(f, "ci"),
        }
    }
}

// Unlike Git Flow, a bare `ci` names a CI branch here.
#[allow(clippy::unwrap_used)] // Compile-time constant regex pattern
static CI_TOKEN_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bci\b(?:[/-]|$)").unwrap());

/// A branch classified under GitHub Flow. Only working branches carry a reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WorkingBranch {
    kind: WorkingBranchKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    reference: Option<Reference>,
}

impl WorkingBranch {
    /// Classifies a branch name. Every name is classifiable.
    pub fn classify(name: &str, names: &BranchNames) -> Self {
        let (kind, reference) = if names.is_main(name) {
            (WorkingBranchKind::Main, None)
        } else if CI_TOKEN_PATTERN.is_match(name) {
            (WorkingBranchKind::Ci, None)
        } else {
            (WorkingBranchKind::Working, Reference::extract(name))
        };
        debug!(name, %kind, ?reference, "Classified GitHub Flow branch");
        Self { kind, reference }
    }

    /// Returns the branch kind.
    pub fn kind(&self) -> WorkingBranchKind {
        self.kind
    }

    /// Returns the embedded reference, if any.
    pub fn reference(&self) -> Option<&Reference> {
        self.reference.as_ref()
    }
}

/// GitHub Flow workflow.
#[derive(Debug, Clone, Default)]
pub struct GitHubFlow {
    configuration: Configuration,
}

impl GitHubFlow {
    /// Creates the workflow.
    pub fn new(configuration: Configuration) -> Self {
        Self { configuration }
    }

    /// Classifies a branch name with the configured main literals.
    pub fn classify(&self, name: &str) -> WorkingBranch {
        WorkingBranch::classify(name, &self.configuration.branch_names)
    }

    fn check_base_is_main(&self, pr: &dyn PrDataSource, report: &mut Report, ctx: &CheckContext<'_>) {
        let is_valid = self.classify(&pr.base_branch_name()).kind() == WorkingBranchKind::Main;
        check_base_branch(is_valid, report, ctx);
    }

    fn working_pr_check(
        &self,
        pr: &dyn PrDataSource,
        report: &mut Report,
        ctx: &CheckContext<'_>,
    ) -> Result<(), SourceError> {
        self.check_base_is_main(pr, report, ctx);

        if !self.configuration.accepts_merge_commits_in_feature_prs {
            check_no_merge_commits_included(pr, report, ctx)?;
        }

        check_diff_amount(
            pr,
            self.configuration.recommended_max_diff_amount_in_feature_prs,
            report,
            ctx,
        );

        if let ChangeLogUpdateRequirement::Yes { path } =
            &self.configuration.change_log_update_requirement
        {
            check_change_log_modification(pr, path, report, ctx);
        }
        Ok(())
    }

    fn ci_service_pr_check(
        &self,
        pr: &dyn PrDataSource,
        report: &mut Report,
        ctx: &CheckContext<'_>,
    ) -> Result<(), SourceError> {
        self.check_base_is_main(pr, report, ctx);
        check_no_merge_commits_included(pr, report, ctx)?;
        check_ci_auto_pr_modification(report, ctx);
        Ok(())
    }
}

impl Workflow for GitHubFlow {
    fn check(&self, pr: &dyn PrDataSource, sink: &dyn Messenger) -> Result<Report, FlowError> {
        let head_name = pr.head_branch_name();
        let head = self.classify(&head_name);

        let ctx = CheckContext::new(sink);
        announce_reference(head.reference(), &self.configuration, &ctx);

        match head.kind() {
            WorkingBranchKind::Main => Err(FlowError::IllegalHeadBranch(head.kind().to_string())),
            WorkingBranchKind::Working => {
                info!(head = %head_name, "Selected GitHub Flow working workflow");
                run_steps("Working PR Check", |report| {
                    self.working_pr_check(pr, report, &ctx)
                })
            }
            WorkingBranchKind::Ci => {
                info!(head = %head_name, "Selected GitHub Flow CI workflow");
                run_steps("CI Service PR Check", |report| {
                    self.ci_service_pr_check(pr, report, &ctx)
                })
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::data::CheckResult;
    use crate::pr::{Commit, PrMetadata, RecordingMessenger};

    #[test]
    fn classification_table() {
        use WorkingBranchKind::*;

        let names = BranchNames::default();
        let cases = [
            ("main", Main),
            ("master", Main),
            ("develop", Working),
            ("develop/xyz", Working),
            ("hotfix", Working),
            ("feature/issue/123", Working),
            ("release/ticket/ABC-123", Working),
            ("", Working),
            ("ci", Ci),
            ("feature", Working),
            ("cix", Working),
            ("ci/xyz", Ci),
            ("ci/issue/123", Ci),
            ("ci/ticket/ABC-123", Ci),
        ];

        for (input, expected) in cases {
            assert_eq!(
                WorkingBranch::classify(input, &names).kind(),
                expected,
                "input: {input:?}"
            );
        }
    }

    #[test]
    fn only_working_branches_keep_references() {
        let names = BranchNames::default();
        assert_eq!(
            WorkingBranch::classify("fix/issue/12", &names).reference(),
            Some(&Reference::Issue("12".to_string()))
        );
        assert_eq!(WorkingBranch::classify("ci/issue/12", &names).reference(), None);
    }

    fn pr(head: &str, base: &str) -> PrMetadata {
        PrMetadata {
            head_branch: head.to_string(),
            base_branch: base.to_string(),
            additions: Some(12),
            commits: vec![Commit::with_parents(["p"])],
            modified_files: vec!["CHANGELOG.md".to_string()],
            ..PrMetadata::default()
        }
    }

    #[test]
    fn working_branch_into_main_passes() {
        let sink = RecordingMessenger::new();
        let report = GitHubFlow::default()
            .check(&pr("fix/issue/12", "main"), &sink)
            .unwrap();

        assert_eq!(report.title(), "Working PR Check");
        assert_eq!(report.items().len(), 4);
        assert!(report.items().iter().all(|i| i.result == CheckResult::Good));
        assert_eq!(sink.messages(), ["Resolve #12"]);
    }

    #[test]
    fn working_branch_into_other_branch_is_rejected() {
        let sink = RecordingMessenger::new();
        let report = GitHubFlow::default()
            .check(&pr("add-login", "staging"), &sink)
            .unwrap();
        assert_eq!(report.errors_count(), 1);
        assert_eq!(sink.failures(), ["Invalid base branch"]);
    }

    #[test]
    fn ci_branch_adds_review_task() {
        let sink = RecordingMessenger::new();
        let report = GitHubFlow::default()
            .check(&pr("ci/update", "main"), &sink)
            .unwrap();
        assert_eq!(report.title(), "CI Service PR Check");
        assert_eq!(report.items().len(), 2);
        assert_eq!(report.reviewer_tasks().len(), 1);
    }

    #[test]
    fn main_head_is_illegal() {
        let sink = RecordingMessenger::new();
        let err = GitHubFlow::default()
            .check(&pr("main", "main"), &sink)
            .unwrap_err();
        assert!(matches!(err, FlowError::IllegalHeadBranch(ref k) if k == "main"));
    }
}
