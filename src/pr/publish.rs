//! Report publishers.

use std::io::Write;

use anyhow::{Context, Result};
use tracing::info;

use crate::data::{OutputFormat, Report};

/// Accepts the completed report of a workflow run.
pub trait ReportPublisher {
    /// Delivers one report.
    fn publish(&mut self, report: &Report) -> Result<()>;
}

/// Renders a report in the requested format.
pub fn render(report: &Report, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Markdown => Ok(report.markdown_message()),
        OutputFormat::Json => {
            serde_json::to_string_pretty(report).context("Failed to serialize report to JSON")
        }
        OutputFormat::Yaml => crate::data::to_yaml(report),
    }
}

/// Prints reports to stdout.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdoutPublisher {
    format: OutputFormat,
}

impl StdoutPublisher {
    /// Creates a publisher rendering in `format`.
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }
}

impl ReportPublisher for StdoutPublisher {
    fn publish(&mut self, report: &Report) -> Result<()> {
        let rendered = render(report, self.format)?;
        let mut stdout = std::io::stdout().lock();
        writeln!(stdout, "{rendered}").context("Failed to write report to stdout")?;
        info!(title = report.title(), format = %self.format, "Published report");
        Ok(())
    }
}

/// Keeps published reports in memory.
#[derive(Debug, Default)]
pub struct CollectingPublisher {
    /// Reports in publication order.
    pub reports: Vec<Report>,
}

impl ReportPublisher for CollectingPublisher {
    fn publish(&mut self, report: &Report) -> Result<()> {
        self.reports.push(report.clone());
        Ok(())
    }
}
