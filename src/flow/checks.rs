//! Single check items shared by the branching models.

use tracing::debug;

use super::branch::Reference;
use super::error::FlowError;
use crate::config::Configuration;
use crate::data::{CheckResult, Report};
use crate::pr::{Messenger, PrDataSource, SourceError};

/// Title of the base branch check.
pub const BASE_BRANCH_CHECK: &str = "Base Branch Check";
/// Title of the merge commit check.
pub const MERGE_COMMIT_CHECK: &str = "Merge Commit Non-Existence Check";
/// Title of the diff volume check.
pub const DIFF_VOLUME_CHECK: &str = "Diff Volume Check";
/// Title of the changelog check.
pub const CHANGELOG_CHECK: &str = "ChangeLog Modification Check";
/// Title of the version check; also used as its reviewer task.
pub const VERSION_CHECK: &str = "Version Modification Check";
/// Reviewer task added to every CI pull request.
pub const CI_REVIEW_TASK: &str = "Check whether CI's auto-generated PR is valid or not";
/// Reviewer task added to every release pull request.
pub const REMAINED_TASK_CHECK: &str = "Remained Task Check";
/// Reviewer task for release and hotfix pull requests into main.
pub const ALSO_PR_TO_DEVELOP_TASK: &str =
    "Please make sure you've also created another PR to develop branch";
/// Reviewer task for release and hotfix pull requests into develop.
pub const ALSO_PR_TO_MAIN_TASK: &str =
    "Please make sure you've also created another PR to main branch";

/// Fixed diff volume threshold for release pull requests into develop.
pub const RELEASE_MAX_DIFF_AMOUNT: usize = 100;

/// Records check results and forwards soft and hard violations to a messenger.
pub struct CheckContext<'a> {
    sink: &'a dyn Messenger,
}

impl<'a> CheckContext<'a> {
    /// Creates a context notifying `sink`.
    pub fn new(sink: &'a dyn Messenger) -> Self {
        Self { sink }
    }

    /// Runs one check, records it, and warns or fails on a non-good result.
    pub fn check<F>(&self, report: &mut Report, title: &str, execution: F)
    where
        F: FnOnce() -> CheckResult,
    {
        let result = report.check(title, execution);
        debug!(title, ?result, "Check completed");
        match result {
            CheckResult::Good => {}
            CheckResult::Acceptable(warning) => self.sink.warn(warning),
            CheckResult::Rejected(failure) => self.sink.fail(failure),
        }
    }

    /// Adds a reviewer task.
    pub fn ask_reviewer(&self, report: &mut Report, task: &str) {
        report.ask_reviewer(task);
    }

    /// Forwards an informational message.
    pub fn message(&self, text: &str) {
        self.sink.message(text);
    }

    /// Forwards a warning.
    pub fn warn(&self, text: &str) {
        self.sink.warn(text);
    }
}

/// Creates a report titled `title` and fills it with `steps`. A collaborator
/// failure keeps the checks recorded so far in the returned error.
pub fn run_steps<F>(title: &str, steps: F) -> Result<Report, FlowError>
where
    F: FnOnce(&mut Report) -> Result<(), SourceError>,
{
    let mut report = Report::new(title);
    match steps(&mut report) {
        Ok(()) => {
            debug!(
                title,
                warnings = report.warnings_count(),
                errors = report.errors_count(),
                "Workflow completed"
            );
            Ok(report)
        }
        Err(source) => Err(FlowError::Interrupted {
            report: Box::new(report),
            source,
        }),
    }
}

/// Announces the issue or ticket a head branch refers to.
pub fn announce_reference(
    reference: Option<&Reference>,
    configuration: &Configuration,
    ctx: &CheckContext<'_>,
) {
    match reference {
        Some(Reference::Issue(id)) => ctx.message(&format!("Resolve #{id}")),
        Some(Reference::Ticket(id)) => {
            if let Some(address) = configuration.ticket_address(id) {
                ctx.message(&format!("Ticket: {address}"));
            }
        }
        None => {}
    }
}

/// Rejects the pull request when its base branch is not a valid target.
pub fn check_base_branch(is_valid: bool, report: &mut Report, ctx: &CheckContext<'_>) {
    ctx.check(report, BASE_BRANCH_CHECK, || {
        if is_valid {
            CheckResult::Good
        } else {
            CheckResult::Rejected("Invalid base branch".to_string())
        }
    });
}

/// Rejects the pull request when any commit has more than one parent.
pub fn check_no_merge_commits_included(
    pr: &dyn PrDataSource,
    report: &mut Report,
    ctx: &CheckContext<'_>,
) -> Result<(), SourceError> {
    let commits = pr.commits()?;
    ctx.check(report, MERGE_COMMIT_CHECK, || {
        if commits.iter().all(|c| !c.is_merge_commit()) {
            CheckResult::Good
        } else {
            CheckResult::Rejected(
                "Don't include any merge commits in this PR. Please consider rebasing if needed."
                    .to_string(),
            )
        }
    });
    Ok(())
}

/// Warns when added plus deleted lines reach `max_amount`.
pub fn check_diff_amount(
    pr: &dyn PrDataSource,
    max_amount: usize,
    report: &mut Report,
    ctx: &CheckContext<'_>,
) {
    let modified_lines = pr.modified_lines();
    ctx.check(report, DIFF_VOLUME_CHECK, || {
        if modified_lines < max_amount {
            CheckResult::Good
        } else {
            CheckResult::Acceptable("There's too much diff. Please make PRs smaller.".to_string())
        }
    });
}

/// Warns when the changelog at `path` was not modified.
pub fn check_change_log_modification(
    pr: &dyn PrDataSource,
    path: &str,
    report: &mut Report,
    ctx: &CheckContext<'_>,
) {
    let modified = pr.has_modified_file(path);
    ctx.check(report, CHANGELOG_CHECK, || {
        if modified {
            CheckResult::Good
        } else {
            CheckResult::Acceptable(format!(
                "This PR doesn't contain any modifications at {path}. Please consider to update the ChangeLog."
            ))
        }
    });
}

/// Requires an added line of `path` containing `keyword`; a found bump still
/// needs a reviewer's confirmation.
pub fn check_version_modification(
    pr: &dyn PrDataSource,
    path: &str,
    keyword: &str,
    report: &mut Report,
    ctx: &CheckContext<'_>,
) -> Result<(), SourceError> {
    let modified = pr.has_modified_content(keyword, path)?;
    ctx.check(report, VERSION_CHECK, || {
        if modified {
            CheckResult::Acceptable(
                "Please check whether the version modification is correct or not.".to_string(),
            )
        } else {
            CheckResult::Rejected(
                "This PR doesn't contain any version modification, which is required.".to_string(),
            )
        }
    });

    if modified {
        ctx.ask_reviewer(report, VERSION_CHECK);
    }
    Ok(())
}

/// Asks the reviewer to validate a CI generated pull request.
pub fn check_ci_auto_pr_modification(report: &mut Report, ctx: &CheckContext<'_>) {
    ctx.ask_reviewer(report, CI_REVIEW_TASK);
    ctx.warn("This PR is auto-generated by CI service. Please check if the diff is valid or not.");
}

/// Asks the reviewer to confirm related tickets and issues are closed.
pub fn check_remained_tasks_state(report: &mut Report, ctx: &CheckContext<'_>) {
    ctx.ask_reviewer(report, REMAINED_TASK_CHECK);
    ctx.warn("Please check whether all required tickets and issues are closed or not.");
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::pr::{Commit, PrMetadata, RecordingMessenger};

    #[test]
    fn check_forwards_results_to_sink() {
        let sink = RecordingMessenger::new();
        let ctx = CheckContext::new(&sink);
        let mut report = Report::new("t");

        ctx.check(&mut report, "good", || CheckResult::Good);
        ctx.check(&mut report, "soft", || CheckResult::Acceptable("w".to_string()));
        ctx.check(&mut report, "hard", || CheckResult::Rejected("f".to_string()));

        assert_eq!(report.items().len(), 3);
        assert_eq!(sink.warnings(), ["w"]);
        assert_eq!(sink.failures(), ["f"]);
        assert!(sink.messages().is_empty());
    }

    #[test]
    fn diff_amount_boundary_is_exclusive() {
        let sink = RecordingMessenger::new();
        let ctx = CheckContext::new(&sink);
        let pr = PrMetadata {
            additions: Some(200),
            deletions: Some(100),
            ..PrMetadata::default()
        };

        let mut report = Report::new("t");
        check_diff_amount(&pr, 300, &mut report, &ctx);
        check_diff_amount(&pr, 301, &mut report, &ctx);

        assert!(matches!(report.items()[0].result, CheckResult::Acceptable(_)));
        assert_eq!(report.items()[1].result, CheckResult::Good);
    }

    #[test]
    fn merge_commits_are_rejected() {
        let sink = RecordingMessenger::new();
        let ctx = CheckContext::new(&sink);
        let pr = PrMetadata::default().with_commits(vec![
            Commit::with_parents(["a"]),
            Commit::with_parents(["a", "b"]),
        ]);

        let mut report = Report::new("t");
        check_no_merge_commits_included(&pr, &mut report, &ctx).unwrap();

        assert!(matches!(report.items()[0].result, CheckResult::Rejected(_)));
        assert_eq!(sink.failures().len(), 1);
    }

    #[test]
    fn commits_without_parent_data_are_not_merges() {
        let sink = RecordingMessenger::new();
        let ctx = CheckContext::new(&sink);
        let pr = PrMetadata::default().with_commits(vec![Commit::default()]);

        let mut report = Report::new("t");
        check_no_merge_commits_included(&pr, &mut report, &ctx).unwrap();
        assert_eq!(report.items()[0].result, CheckResult::Good);
    }

    #[test]
    fn changelog_missing_is_a_warning() {
        let sink = RecordingMessenger::new();
        let ctx = CheckContext::new(&sink);
        let pr = PrMetadata::default();

        let mut report = Report::new("t");
        check_change_log_modification(&pr, "CHANGELOG.md", &mut report, &ctx);

        assert_eq!(report.warnings_count(), 1);
        assert_eq!(report.errors_count(), 0);
        assert!(sink.warnings()[0].contains("CHANGELOG.md"));
    }

    #[test]
    fn found_version_bump_asks_reviewer() {
        let sink = RecordingMessenger::new();
        let ctx = CheckContext::new(&sink);
        let mut pr = PrMetadata::default();
        pr.diffs.insert(
            "VERSION".to_string(),
            crate::pr::DiffLines {
                deletions: vec!["1.2.2".to_string()],
                additions: vec!["1.2.3".to_string()],
            },
        );

        let mut report = Report::new("t");
        check_version_modification(&pr, "VERSION", "1.2.3", &mut report, &ctx).unwrap();

        assert!(matches!(report.items()[0].result, CheckResult::Acceptable(_)));
        assert_eq!(report.reviewer_tasks(), [VERSION_CHECK]);
    }

    #[test]
    fn version_keyword_in_deletions_only_is_rejected() {
        let sink = RecordingMessenger::new();
        let ctx = CheckContext::new(&sink);
        let mut pr = PrMetadata::default();
        pr.diffs.insert(
            "VERSION".to_string(),
            crate::pr::DiffLines {
                deletions: vec!["1.2.3".to_string()],
                additions: vec![],
            },
        );

        let mut report = Report::new("t");
        check_version_modification(&pr, "VERSION", "1.2.3", &mut report, &ctx).unwrap();

        assert!(matches!(report.items()[0].result, CheckResult::Rejected(_)));
        assert!(report.reviewer_tasks().is_empty());
    }

    #[test]
    fn reference_announcements() {
        let sink = RecordingMessenger::new();
        let ctx = CheckContext::new(&sink);
        let plain = Configuration::default();
        let resolving = Configuration::default()
            .with_ticket_address_resolver(|id| format!("https://t.example/{id}"));

        announce_reference(Some(&Reference::Issue("7".to_string())), &plain, &ctx);
        announce_reference(Some(&Reference::Ticket("A-1".to_string())), &plain, &ctx);
        announce_reference(Some(&Reference::Ticket("A-1".to_string())), &resolving, &ctx);
        announce_reference(None, &resolving, &ctx);

        assert_eq!(
            sink.messages(),
            ["Resolve #7", "Ticket: https://t.example/A-1"]
        );
    }

    #[test]
    fn interrupted_steps_keep_recorded_checks() {
        let err = run_steps("Feature PR Check", |report| {
            report.check(BASE_BRANCH_CHECK, || CheckResult::Good);
            Err(SourceError::Commits("timeout".to_string()))
        })
        .unwrap_err();

        let partial = err.partial_report().unwrap();
        assert_eq!(partial.title(), "Feature PR Check");
        assert_eq!(partial.items().len(), 1);
        assert!(err.to_string().contains("timeout"));
    }
}
