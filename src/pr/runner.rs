//! Runs a workflow against a pull request and hands the report to a publisher.

use tracing::{info, warn};

use super::publish::ReportPublisher;
use super::sink::Messenger;
use super::source::PrDataSource;
use crate::data::Report;
use crate::flow::Workflow;

/// Message emitted when the data does not come from a hosted pull request.
pub const LOCAL_SKIP_MESSAGE: &str = "Local PR check: skip";

/// How a run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// Local run; no checks executed.
    Skipped,
    /// All checks ran and the report was published.
    Completed(Report),
    /// The run was aborted with a single failure. `partial` holds the checks
    /// recorded before the abort whenever a report existed.
    Aborted {
        /// Report built before the failure, if any.
        partial: Option<Report>,
    },
}

impl RunOutcome {
    /// Process exit code: aborts are 1, completed runs follow the report.
    pub fn exit_code(&self, strict: bool) -> i32 {
        match self {
            Self::Skipped => 0,
            Self::Completed(report) => report.exit_code(strict),
            Self::Aborted { .. } => 1,
        }
    }
}

/// Checks one pull request.
///
/// Selection failures (unclassifiable or main/develop head) produce one `fail`
/// and no report. A collaborator failure after the report exists produces one
/// `fail` and publishes the partial report. A publisher failure produces one
/// `fail` and keeps the unpublished report in the outcome.
pub fn check_pr(
    workflow: &dyn Workflow,
    pr: &dyn PrDataSource,
    sink: &dyn Messenger,
    publisher: &mut dyn ReportPublisher,
) -> RunOutcome {
    if !pr.is_hosted() {
        sink.message(LOCAL_SKIP_MESSAGE);
        return RunOutcome::Skipped;
    }

    match workflow.check(pr, sink) {
        Ok(report) => match publisher.publish(&report) {
            Ok(()) => RunOutcome::Completed(report),
            Err(err) => {
                warn!("Failed to publish report: {err:#}");
                sink.fail(&format!("{err:#}"));
                RunOutcome::Aborted {
                    partial: Some(report),
                }
            }
        },
        Err(err) => {
            info!("Workflow aborted: {err}");
            sink.fail(&err.to_string());

            let partial = err.partial_report().cloned();
            if let Some(report) = &partial {
                if let Err(publish_err) = publisher.publish(report) {
                    warn!("Failed to publish partial report: {publish_err:#}");
                }
            }
            RunOutcome::Aborted { partial }
        }
    }
}
