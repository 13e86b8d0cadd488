//! Configuration-related CLI commands.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::config::{ConfigManager, GateConfig};

/// Configuration operations.
#[derive(Parser)]
pub struct ConfigCommand {
    /// Configuration subcommand to execute.
    #[command(subcommand)]
    pub command: ConfigSubcommands,
}

/// Configuration subcommands.
#[derive(Subcommand)]
pub enum ConfigSubcommands {
    /// Prints the effective configuration as YAML.
    Show(ShowCommand),
    /// Writes the default configuration to .ci-gate/config.yaml.
    Init(InitCommand),
}

/// Show command options.
#[derive(Parser)]
pub struct ShowCommand {
    /// Path to the gate config file (defaults to .ci-gate/config.yaml).
    #[arg(long)]
    pub config: Option<PathBuf>,
}

/// Init command options.
#[derive(Parser)]
pub struct InitCommand {
    /// Destination file (defaults to .ci-gate/config.yaml).
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Overwrites an existing file.
    #[arg(long)]
    pub force: bool,
}

impl ConfigCommand {
    /// Executes the config command.
    pub fn execute(self) -> Result<()> {
        match self.command {
            ConfigSubcommands::Show(show_cmd) => show_cmd.execute(),
            ConfigSubcommands::Init(init_cmd) => init_cmd.execute(),
        }
    }
}

impl ShowCommand {
    /// Executes the show command.
    pub fn execute(self) -> Result<()> {
        let config = ConfigManager::from_option(self.config).load_config()?;
        print!("{}", serde_yaml::to_string(&config)?);
        Ok(())
    }
}

impl InitCommand {
    /// Executes the init command.
    pub fn execute(self) -> Result<()> {
        let manager = ConfigManager::from_option(self.config);
        if manager.path().exists() && !self.force {
            anyhow::bail!(
                "{} already exists. Use --force to overwrite",
                manager.path().display()
            );
        }

        manager.save_config(&GateConfig::default())?;
        println!("✓ Wrote default configuration to {}", manager.path().display());
        Ok(())
    }
}
