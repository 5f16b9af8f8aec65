//! Branch-related CLI commands.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;

use crate::config::{ConfigFile, Configuration};
use crate::flow::{Branch, FlowModel, GitFlow, GitHubFlow, WorkingBranch};
use crate::git::GitRepository;

/// Branch operations.
#[derive(Parser)]
pub struct BranchCommand {
    /// Branch subcommand to execute.
    #[command(subcommand)]
    pub command: BranchSubcommands,
}

/// Branch subcommands.
#[derive(Subcommand)]
pub enum BranchSubcommands {
    /// Classifies a branch name and prints the result in YAML format.
    Classify(ClassifyCommand),
}

/// Classify command options.
#[derive(Parser)]
pub struct ClassifyCommand {
    /// Branch name to classify. Defaults to the current branch.
    #[arg(value_name = "BRANCH")]
    pub name: Option<String>,

    /// Branching model (overrides the configuration file).
    #[arg(long, value_enum)]
    pub flow: Option<FlowModel>,

    /// Path to a configuration file.
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl BranchCommand {
    /// Executes the branch command.
    pub fn execute(self) -> Result<()> {
        match self.command {
            BranchSubcommands::Classify(classify_cmd) => classify_cmd.execute(),
        }
    }
}

/// Classification printed by `branch classify`.
#[derive(Debug, Serialize)]
#[serde(untagged)]
enum Classified {
    GitFlow(Branch),
    GitHubFlow(WorkingBranch),
}

#[derive(Debug, Serialize)]
struct ClassificationView {
    name: String,
    flow: FlowModel,
    branch: Classified,
}

impl ClassifyCommand {
    /// Executes the classify command.
    pub fn execute(self) -> Result<()> {
        let file = ConfigFile::discover(self.config.as_deref())?;
        let flow = self.flow.or(file.flow).unwrap_or_default();
        let configuration = file.into_configuration()?;

        let name = match self.name {
            Some(name) => name,
            None => GitRepository::open()
                .context("Failed to open git repository. Pass a branch name or run inside a repository.")?
                .current_branch()?,
        };

        let yaml = classify_to_yaml(&name, flow, configuration)?;
        print!("{yaml}");
        Ok(())
    }
}

/// Classifies `name` under `flow` and renders the result as YAML.
pub fn classify_to_yaml(name: &str, flow: FlowModel, configuration: Configuration) -> Result<String> {
    let branch = match flow {
        FlowModel::GitFlow => Classified::GitFlow(
            GitFlow::new(configuration)
                .classify(name)
                .with_context(|| format!("Branch {name:?} does not match any Git Flow branch pattern"))?,
        ),
        FlowModel::GitHubFlow => {
            Classified::GitHubFlow(GitHubFlow::new(configuration).classify(name))
        }
    };

    crate::data::to_yaml(&ClassificationView {
        name: name.to_string(),
        flow,
        branch,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn git_flow_yaml_includes_reference() {
        let yaml =
            classify_to_yaml("feature/issue/42", FlowModel::GitFlow, Configuration::default())
                .unwrap();
        assert!(yaml.contains("flow: git-flow"));
        assert!(yaml.contains("kind: feature"));
        assert!(yaml.contains("type: issue"));
        assert!(yaml.contains("42"));
    }

    #[test]
    fn git_flow_rejects_unknown_names() {
        let err = classify_to_yaml("wip", FlowModel::GitFlow, Configuration::default())
            .unwrap_err();
        assert!(err.to_string().contains("does not match"));
    }

    #[test]
    fn github_flow_classifies_everything() {
        let yaml =
            classify_to_yaml("wip", FlowModel::GitHubFlow, Configuration::default()).unwrap();
        assert!(yaml.contains("kind: working"));
    }
}
