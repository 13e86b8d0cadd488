//! Terraform plan commands.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::config::ConfigManager;
use crate::data::{GateReport, OutputFormat};
use crate::plan::{check_duplicate_names, PlanRules, TerraformPlan};

/// Plan operations.
#[derive(Parser)]
pub struct PlanCommand {
    /// Plan subcommand to execute.
    #[command(subcommand)]
    pub command: PlanSubcommands,
}

/// Plan subcommands.
#[derive(Subcommand)]
pub enum PlanSubcommands {
    /// Fails when planned resources of watched types share a name.
    Duplicates(DuplicatesCommand),
}

/// Duplicates command options.
#[derive(Parser)]
pub struct DuplicatesCommand {
    /// Plan in JSON form, as written by `terraform show -json`.
    #[arg(long, value_name = "FILE")]
    pub plan: PathBuf,

    /// Resource type to check; repeat to watch several. Replaces the
    /// configured list.
    #[arg(long = "resource-type", value_name = "TYPE")]
    pub resource_types: Vec<String>,

    /// Path to the gate config file (defaults to .ci-gate/config.yaml).
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Output format: text (default), json, yaml.
    #[arg(long, default_value = "text")]
    pub format: String,
}

impl PlanCommand {
    /// Executes the plan command.
    pub fn execute(self) -> Result<()> {
        match self.command {
            PlanSubcommands::Duplicates(duplicates_cmd) => duplicates_cmd.execute(),
        }
    }
}

impl DuplicatesCommand {
    /// Executes the duplicates command.
    pub fn execute(self) -> Result<()> {
        let output_format: OutputFormat = self.format.parse().unwrap_or(OutputFormat::Text);
        let rules = self.rules()?;

        let plan = TerraformPlan::from_file(&self.plan)?;
        if let Some(version) = &plan.terraform_version {
            tracing::debug!("Plan written by Terraform {version}");
        }

        match check_duplicate_names(&plan, &rules) {
            Ok(inspected) => {
                match GateReport::passed("plan-duplicates", inspected).render(output_format)? {
                    Some(rendered) => println!("{rendered}"),
                    None => println!(
                        "✓ No duplicate resource names among {inspected} watched resources"
                    ),
                }
                Ok(())
            }
            Err(err) => {
                let report: GateReport<usize> =
                    GateReport::failed("plan-duplicates", err.kind(), err.to_string());
                if let Some(rendered) = report.render(output_format)? {
                    println!("{rendered}");
                }
                Err(err.into())
            }
        }
    }

    /// Merges CLI overrides onto the configured rules.
    pub fn rules(&self) -> Result<PlanRules> {
        let mut rules = ConfigManager::from_option(self.config.clone())
            .load_config()?
            .plan;
        if !self.resource_types.is_empty() {
            rules.watched_types = self.resource_types.clone();
        }
        Ok(rules)
    }
}
