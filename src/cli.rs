//! CLI interface for flowcheck.

use anyhow::Result;
use clap::{Parser, Subcommand};

pub mod branch;
pub mod config;
pub mod pr;

/// flowcheck: branching-model aware pull request checks.
#[derive(Parser)]
#[command(name = "flowcheck")]
#[command(about = "Branching-model aware pull request checks", long_about = None)]
#[command(version)]
pub struct Cli {
    /// The main command to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Main command categories.
#[derive(Subcommand)]
pub enum Commands {
    /// Branch name operations.
    Branch(branch::BranchCommand),
    /// Pull request operations.
    Pr(pr::PrCommand),
    /// Configuration operations.
    Config(config::ConfigCommand),
}

impl Cli {
    /// Executes the CLI command.
    pub fn execute(self) -> Result<()> {
        match self.command {
            Commands::Branch(branch_cmd) => branch_cmd.execute(),
            Commands::Pr(pr_cmd) => pr_cmd.execute(),
            Commands::Config(config_cmd) => config_cmd.execute(),
        }
    }
}
