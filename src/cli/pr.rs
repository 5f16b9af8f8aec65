//! Pull request CLI commands.

use std::path::PathBuf;

use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use termcolor::ColorChoice;
use tracing::debug;

use crate::config::ConfigFile;
use crate::data::OutputFormat;
use crate::flow::FlowModel;
use crate::git::GitRepository;
use crate::pr::{check_pr, ConsoleMessenger, PrMetadata, StdoutPublisher};

/// Pull request operations.
#[derive(Parser)]
pub struct PrCommand {
    /// Pull request subcommand to execute.
    #[command(subcommand)]
    pub command: PrSubcommands,
}

/// Pull request subcommands.
#[derive(Subcommand)]
pub enum PrSubcommands {
    /// Runs the branching-model checks against a pull request metadata file.
    Check(CheckCommand),
}

/// Check command options.
#[derive(Parser)]
pub struct CheckCommand {
    /// Pull request metadata file (YAML or JSON).
    #[arg(long, value_name = "FILE")]
    pub metadata: PathBuf,

    /// Path to a configuration file.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Branching model (overrides the configuration file).
    #[arg(long, value_enum)]
    pub flow: Option<FlowModel>,

    /// Output format: markdown (default), json, yaml.
    #[arg(long, default_value = "markdown")]
    pub format: String,

    /// Exits with code 2 when the report has warnings but no errors.
    #[arg(long)]
    pub strict: bool,

    /// Reads the commit list from the repository at this path instead of the metadata file.
    #[arg(long, value_name = "REPO")]
    pub commits_from_repo: Option<PathBuf>,

    /// Disables coloured notifications.
    #[arg(long)]
    pub no_color: bool,
}

impl PrCommand {
    /// Executes the pull request command.
    pub fn execute(self) -> Result<()> {
        match self.command {
            PrSubcommands::Check(check_cmd) => check_cmd.execute(),
        }
    }
}

impl CheckCommand {
    /// Executes the check command.
    pub fn execute(self) -> Result<()> {
        let format: OutputFormat = self.format.parse().map_err(|()| {
            anyhow!(
                "Unknown output format '{}'. Expected markdown, json or yaml",
                self.format
            )
        })?;

        let file = ConfigFile::discover(self.config.as_deref())?;
        let flow = self.flow.or(file.flow).unwrap_or_default();
        let configuration = file.into_configuration()?;
        debug!(%flow, ?configuration, "Resolved configuration");

        let mut metadata = PrMetadata::load(&self.metadata)?;
        if let Some(repo_path) = &self.commits_from_repo {
            let repo = GitRepository::open_at(repo_path)?;
            let commits = repo.commits_between(&metadata.base_branch, &metadata.head_branch)?;
            metadata = metadata.with_commits(commits);
        }

        let color = if self.no_color {
            ColorChoice::Never
        } else {
            ColorChoice::Auto
        };
        let sink = ConsoleMessenger::new(color);
        let mut publisher = StdoutPublisher::new(format);
        let workflow = flow.workflow(configuration);

        let outcome = check_pr(workflow.as_ref(), &metadata, &sink, &mut publisher);

        let exit_code = outcome.exit_code(self.strict);
        if exit_code != 0 {
            std::process::exit(exit_code);
        }

        Ok(())
    }
}
