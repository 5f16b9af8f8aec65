//! Git Flow pull request workflows.

use tracing::info;

use super::branch::{Branch, BranchClassifier, BranchKind};
use super::checks::{
    announce_reference, check_base_branch, check_change_log_modification,
    check_ci_auto_pr_modification, check_diff_amount, check_no_merge_commits_included,
    check_remained_tasks_state, check_version_modification, run_steps, CheckContext,
    ALSO_PR_TO_DEVELOP_TASK, ALSO_PR_TO_MAIN_TASK, RELEASE_MAX_DIFF_AMOUNT,
};
use super::error::FlowError;
use super::Workflow;
use crate::config::{ChangeLogUpdateRequirement, Configuration, VersionUpdateRequirement};
use crate::data::Report;
use crate::pr::{Messenger, PrDataSource, SourceError};

/// Git Flow workflow: one check sequence per head branch kind.
#[derive(Debug, Clone, Default)]
pub struct GitFlow {
    configuration: Configuration,
    classifier: BranchClassifier,
}

impl GitFlow {
    /// Creates the workflow; branch literals come from the configuration.
    pub fn new(configuration: Configuration) -> Self {
        let classifier = BranchClassifier::new(configuration.branch_names.clone());
        Self {
            configuration,
            classifier,
        }
    }

    /// Returns the configuration.
    pub fn configuration(&self) -> &Configuration {
        &self.configuration
    }

    /// Classifies a branch name with the configured literals.
    pub fn classify(&self, name: &str) -> Option<Branch> {
        self.classifier.classify(name)
    }

    fn base_kind(&self, pr: &dyn PrDataSource) -> Option<BranchKind> {
        self.classify(&pr.base_branch_name()).map(|b| b.kind())
    }

    fn check_base_branch_is(
        &self,
        pr: &dyn PrDataSource,
        valid: &[BranchKind],
        report: &mut Report,
        ctx: &CheckContext<'_>,
    ) {
        let is_valid = self.base_kind(pr).is_some_and(|kind| valid.contains(&kind));
        check_base_branch(is_valid, report, ctx);
    }

    fn check_change_log_if_required(
        &self,
        pr: &dyn PrDataSource,
        report: &mut Report,
        ctx: &CheckContext<'_>,
    ) {
        if let ChangeLogUpdateRequirement::Yes { path } =
            &self.configuration.change_log_update_requirement
        {
            check_change_log_modification(pr, path, report, ctx);
        }
    }

    /// Release and hotfix pull requests go to both main and develop; remind
    /// the reviewer about the other one.
    fn ask_for_counterpart_pr(
        &self,
        base: Option<BranchKind>,
        report: &mut Report,
        ctx: &CheckContext<'_>,
    ) {
        match base {
            Some(BranchKind::Main) => ctx.ask_reviewer(report, ALSO_PR_TO_DEVELOP_TASK),
            Some(BranchKind::Develop) => ctx.ask_reviewer(report, ALSO_PR_TO_MAIN_TASK),
            _ => {}
        }
    }

    fn ci_service_pr_check(
        &self,
        pr: &dyn PrDataSource,
        report: &mut Report,
        ctx: &CheckContext<'_>,
    ) -> Result<(), SourceError> {
        self.check_base_branch_is(pr, &[BranchKind::Develop], report, ctx);
        check_no_merge_commits_included(pr, report, ctx)?;
        check_ci_auto_pr_modification(report, ctx);
        Ok(())
    }

    fn feature_pr_check(
        &self,
        pr: &dyn PrDataSource,
        report: &mut Report,
        ctx: &CheckContext<'_>,
    ) -> Result<(), SourceError> {
        self.check_base_branch_is(pr, &[BranchKind::Develop], report, ctx);

        if !self.configuration.accepts_merge_commits_in_feature_prs {
            check_no_merge_commits_included(pr, report, ctx)?;
        }

        check_diff_amount(
            pr,
            self.configuration.recommended_max_diff_amount_in_feature_prs,
            report,
            ctx,
        );
        self.check_change_log_if_required(pr, report, ctx);
        Ok(())
    }

    fn release_pr_check(
        &self,
        pr: &dyn PrDataSource,
        report: &mut Report,
        ctx: &CheckContext<'_>,
    ) -> Result<(), SourceError> {
        self.check_base_branch_is(pr, &[BranchKind::Main, BranchKind::Develop], report, ctx);
        let base = self.base_kind(pr);
        self.ask_for_counterpart_pr(base, report, ctx);

        if base == Some(BranchKind::Develop) {
            // Only version related changes are expected on the way back to develop.
            check_no_merge_commits_included(pr, report, ctx)?;
            check_diff_amount(pr, RELEASE_MAX_DIFF_AMOUNT, report, ctx);
        }

        check_remained_tasks_state(report, ctx);

        if let VersionUpdateRequirement::Yes { path, keyword } =
            &self.configuration.version_update_requirement
        {
            check_version_modification(pr, path, keyword, report, ctx)?;
        }
        Ok(())
    }

    fn hotfix_pr_check(
        &self,
        pr: &dyn PrDataSource,
        report: &mut Report,
        ctx: &CheckContext<'_>,
    ) -> Result<(), SourceError> {
        self.check_base_branch_is(pr, &[BranchKind::Main, BranchKind::Develop], report, ctx);
        let base = self.base_kind(pr);
        self.ask_for_counterpart_pr(base, report, ctx);

        check_no_merge_commits_included(pr, report, ctx)?;
        check_diff_amount(
            pr,
            self.configuration.recommended_max_diff_amount_in_feature_prs,
            report,
            ctx,
        );
        self.check_change_log_if_required(pr, report, ctx);
        Ok(())
    }
}

impl Workflow for GitFlow {
    fn check(&self, pr: &dyn PrDataSource, sink: &dyn Messenger) -> Result<Report, FlowError> {
        let head_name = pr.head_branch_name();
        let head = self
            .classify(&head_name)
            .ok_or_else(|| FlowError::InvalidHeadBranch {
                name: head_name.clone(),
            })?;

        let ctx = CheckContext::new(sink);
        announce_reference(head.reference(), &self.configuration, &ctx);

        let title = match head.kind() {
            BranchKind::CI => "CI Service PR Check",
            BranchKind::Feature => "Feature PR Check",
            BranchKind::Release => "Release PR Check",
            BranchKind::Hotfix => "HotFix PR Check",
            kind @ (BranchKind::Main | BranchKind::Develop) => {
                return Err(FlowError::IllegalHeadBranch(kind.to_string()));
            }
        };
        info!(head = %head_name, kind = %head.kind(), title, "Selected Git Flow workflow");

        run_steps(title, |report| match head.kind() {
            BranchKind::CI => self.ci_service_pr_check(pr, report, &ctx),
            BranchKind::Feature => self.feature_pr_check(pr, report, &ctx),
            BranchKind::Release => self.release_pr_check(pr, report, &ctx),
            BranchKind::Hotfix => self.hotfix_pr_check(pr, report, &ctx),
            BranchKind::Main | BranchKind::Develop => Ok(()),
        })
    }
}
