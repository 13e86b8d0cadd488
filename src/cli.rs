//! CLI interface for ci-gate.

use anyhow::Result;
use clap::{Parser, Subcommand};

pub mod config;
pub mod help;
pub mod plan;
pub mod targets;
pub mod title;

/// ci-gate: CI gate checks for Terraform provider pull requests.
#[derive(Parser)]
#[command(name = "ci-gate")]
#[command(about = "CI gate checks for Terraform provider pull requests", long_about = None)]
#[command(version)]
pub struct Cli {
    /// The main command to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Main command categories.
#[derive(Subcommand)]
pub enum Commands {
    /// Validates a PR or commit title against conventional-commit prefixes.
    Title(title::TitleCommand),
    /// Extracts changed resource targets from a pull request.
    Targets(targets::TargetsCommand),
    /// Terraform plan checks.
    Plan(plan::PlanCommand),
    /// Gate configuration.
    Config(config::ConfigCommand),
    /// Displays comprehensive help for all commands.
    #[command(name = "help-all")]
    HelpAll(help::HelpCommand),
}

impl Cli {
    /// Executes the CLI command.
    pub async fn execute(self) -> Result<()> {
        match self.command {
            Commands::Title(title_cmd) => title_cmd.execute(),
            Commands::Targets(targets_cmd) => targets_cmd.execute().await,
            Commands::Plan(plan_cmd) => plan_cmd.execute(),
            Commands::Config(config_cmd) => config_cmd.execute(),
            Commands::HelpAll(help_cmd) => help_cmd.execute(),
        }
    }
}
