//! Check report types produced by a workflow run.

use std::fmt;

use serde::Serialize;

/// Glyph rendered for a passing check.
pub const GOOD_GLYPH: &str = ":tada:";
/// Glyph rendered for a check that passed with a warning.
pub const ACCEPTABLE_GLYPH: &str = ":thinking:";
/// Glyph rendered for a rejected check.
pub const REJECTED_GLYPH: &str = ":no_good:";

/// Outcome of a single check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase", tag = "status", content = "message")]
pub enum CheckResult {
    /// The policy condition holds.
    Good,
    /// Soft violation; the run continues with a warning.
    Acceptable(String),
    /// Policy violation; recorded as an error.
    Rejected(String),
}

impl CheckResult {
    /// Returns the fixed glyph used when rendering this result.
    pub fn glyph(&self) -> &'static str {
        match self {
            Self::Good => GOOD_GLYPH,
            Self::Acceptable(_) => ACCEPTABLE_GLYPH,
            Self::Rejected(_) => REJECTED_GLYPH,
        }
    }
}

/// One named verdict in a report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckItem {
    /// Check title, e.g. "Base Branch Check".
    pub title: String,
    /// Check outcome.
    pub result: CheckResult,
}

/// Ordered, append-only collection of check items and reviewer tasks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Report {
    title: String,
    items: Vec<CheckItem>,
    reviewer_tasks: Vec<String>,
}

impl Report {
    /// Creates an empty report.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            items: Vec::new(),
            reviewer_tasks: Vec::new(),
        }
    }

    /// Report title, fixed at creation.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Check items in the order they were recorded.
    pub fn items(&self) -> &[CheckItem] {
        &self.items
    }

    /// Reviewer tasks in the order they were added.
    pub fn reviewer_tasks(&self) -> &[String] {
        &self.reviewer_tasks
    }

    /// Runs `execution` once and records its result under `title`.
    pub fn check<F>(&mut self, title: impl Into<String>, execution: F) -> &CheckResult
    where
        F: FnOnce() -> CheckResult,
    {
        let result = execution();
        self.items.push(CheckItem {
            title: title.into(),
            result,
        });
        let last = self.items.len() - 1;
        &self.items[last].result
    }

    /// Appends a free-form task for the human reviewer.
    pub fn ask_reviewer(&mut self, task: impl Into<String>) {
        self.reviewer_tasks.push(task.into());
    }

    /// Number of items recorded as [`CheckResult::Acceptable`].
    pub fn warnings_count(&self) -> usize {
        self.items
            .iter()
            .filter(|i| matches!(i.result, CheckResult::Acceptable(_)))
            .count()
    }

    /// Number of items recorded as [`CheckResult::Rejected`].
    pub fn errors_count(&self) -> usize {
        self.items
            .iter()
            .filter(|i| matches!(i.result, CheckResult::Rejected(_)))
            .count()
    }

    /// Checks if the report has any rejected items.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.errors_count() > 0
    }

    /// Checks if the report has any acceptable-with-warning items.
    #[must_use]
    pub fn has_warnings(&self) -> bool {
        self.warnings_count() > 0
    }

    /// Determines exit code based on report and options.
    pub fn exit_code(&self, strict: bool) -> i32 {
        if self.has_errors() {
            1
        } else if strict && self.has_warnings() {
            2
        } else {
            0
        }
    }

    /// Renders the report as a markdown table followed by a reviewer task list.
    pub fn markdown_message(&self) -> String {
        let mut out = format!("## {}\n\n", self.title);
        out.push_str("| Checking Item | Result |\n");
        out.push_str("| --- | :---: |\n");
        for item in &self.items {
            out.push_str(&format!(
                "| {} | {} |\n",
                escape_cell(&item.title),
                item.result.glyph()
            ));
        }

        if !self.reviewer_tasks.is_empty() {
            out.push_str("\n### Reviewer Tasks\n\n");
            for task in &self.reviewer_tasks {
                out.push_str(&format!("- [ ] {task}\n"));
            }
        }

        out
    }
}

/// Pipes would otherwise split a table cell.
fn escape_cell(text: &str) -> String {
    text.replace('|', "\\|")
}

/// Output format for rendered reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Markdown table suitable for a PR comment.
    #[default]
    Markdown,
    /// JSON format.
    Json,
    /// YAML format.
    Yaml,
}

impl std::str::FromStr for OutputFormat {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "markdown" | "md" => Ok(OutputFormat::Markdown),
            "json" => Ok(OutputFormat::Json),
            "yaml" => Ok(OutputFormat::Yaml),
            _ => Err(()),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Markdown => write!(f, "markdown"),
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Yaml => write!(f, "yaml"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Report {
        let mut report = Report::new("Feature PR Check");
        report.check("Base Branch Check", || CheckResult::Good);
        report.check("Diff Volume Check", || {
            CheckResult::Acceptable("too much diff".to_string())
        });
        report.check("Merge Commit Non-Existence Check", || {
            CheckResult::Rejected("merge commits".to_string())
        });
        report.ask_reviewer("Remained Task Check");
        report
    }

    #[test]
    fn new_report_is_empty() {
        let report = Report::new("CI Service PR Check");
        assert_eq!(report.title(), "CI Service PR Check");
        assert!(report.items().is_empty());
        assert!(report.reviewer_tasks().is_empty());
        assert_eq!(report.exit_code(true), 0);
    }

    #[test]
    fn check_runs_execution_once_and_returns_result() {
        let mut report = Report::new("t");
        let mut calls = 0;
        let result = report
            .check("once", || {
                calls += 1;
                CheckResult::Good
            })
            .clone();
        assert_eq!(calls, 1);
        assert_eq!(result, CheckResult::Good);
    }

    #[test]
    fn items_keep_insertion_order() {
        let report = sample();
        let titles: Vec<&str> = report.items().iter().map(|i| i.title.as_str()).collect();
        assert_eq!(
            titles,
            [
                "Base Branch Check",
                "Diff Volume Check",
                "Merge Commit Non-Existence Check"
            ]
        );
    }

    #[test]
    fn counts_follow_results() {
        let report = sample();
        assert_eq!(report.warnings_count(), 1);
        assert_eq!(report.errors_count(), 1);
        assert_eq!(report.reviewer_tasks(), ["Remained Task Check"]);
    }

    #[test]
    fn reviewer_tasks_do_not_affect_counts() {
        let mut report = Report::new("t");
        report.ask_reviewer("a");
        report.ask_reviewer("b");
        assert_eq!(report.warnings_count(), 0);
        assert_eq!(report.errors_count(), 0);
        assert!(report.items().is_empty());
    }

    #[test]
    fn exit_code_levels() {
        let mut warn_only = Report::new("t");
        warn_only.check("w", || CheckResult::Acceptable("w".to_string()));
        assert_eq!(warn_only.exit_code(false), 0);
        assert_eq!(warn_only.exit_code(true), 2);
        assert_eq!(sample().exit_code(false), 1);
    }

    #[test]
    fn markdown_rendering() {
        insta::assert_snapshot!(sample().markdown_message(), @r"
        ## Feature PR Check

        | Checking Item | Result |
        | --- | :---: |
        | Base Branch Check | :tada: |
        | Diff Volume Check | :thinking: |
        | Merge Commit Non-Existence Check | :no_good: |

        ### Reviewer Tasks

        - [ ] Remained Task Check
        ");
    }

    #[test]
    fn markdown_escapes_pipes() {
        let mut report = Report::new("t");
        report.check("a|b", || CheckResult::Good);
        assert!(report.markdown_message().contains("| a\\|b | :tada: |"));
    }

    #[test]
    fn output_format_parsing() {
        assert_eq!("md".parse::<OutputFormat>(), Ok(OutputFormat::Markdown));
        assert_eq!("JSON".parse::<OutputFormat>(), Ok(OutputFormat::Json));
        assert_eq!("yaml".parse::<OutputFormat>(), Ok(OutputFormat::Yaml));
        assert!("toml".parse::<OutputFormat>().is_err());
        assert_eq!(OutputFormat::default().to_string(), "markdown");
    }

    #[test]
    fn serializes_results_with_status_tag() {
        let json = serde_json::to_value(sample()).unwrap_or_default();
        assert_eq!(json["items"][0]["result"]["status"], "good");
        assert_eq!(json["items"][1]["result"]["status"], "acceptable");
        assert_eq!(json["items"][1]["result"]["message"], "too much diff");
        assert_eq!(json["reviewer_tasks"][0], "Remained Task Check");
    }
}
