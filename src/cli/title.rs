//! Title command — validates a PR title against conventional-commit prefixes.

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;

use crate::config::ConfigManager;
use crate::data::{GateReport, OutputFormat};
use crate::title::{validate_title, TitleCheck, TitleRules};
use crate::utils::get_env_var;

/// Title command options.
#[derive(Parser)]
pub struct TitleCommand {
    /// Title to validate. Read from the environment variable named by
    /// --env-var when omitted.
    #[arg(value_name = "TITLE")]
    pub title: Option<String>,

    /// Environment variable holding the title.
    #[arg(long, default_value = "PR_TITLE")]
    pub env_var: String,

    /// Path to the gate config file (defaults to .ci-gate/config.yaml).
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Overrides the minimum message length after the colon.
    #[arg(long)]
    pub min_body_len: Option<usize>,

    /// Accepts a `!` breaking-change marker before the colon.
    #[arg(long)]
    pub allow_breaking: bool,

    /// Output format: text (default), json, yaml.
    #[arg(long, default_value = "text")]
    pub format: String,

    /// Suppresses the success line in text mode.
    #[arg(long)]
    pub quiet: bool,
}

impl TitleCommand {
    /// Executes the title command.
    pub fn execute(self) -> Result<()> {
        let output_format: OutputFormat = self.format.parse().unwrap_or(OutputFormat::Text);
        let rules = self.rules()?;
        let title = self.resolve_title();

        match validate_title(&title, &rules) {
            Ok(check) => {
                let report = GateReport::passed("title", &check);
                match report.render(output_format)? {
                    Some(rendered) => println!("{rendered}"),
                    None if !self.quiet => println!("{}", success_line(&check)),
                    None => {}
                }
                Ok(())
            }
            Err(err) => {
                let report: GateReport<TitleCheck> =
                    GateReport::failed("title", err.kind(), err.to_string());
                if let Some(rendered) = report.render(output_format)? {
                    println!("{rendered}");
                }
                Err(err.into())
            }
        }
    }

    /// Merges CLI overrides onto the configured rules.
    pub fn rules(&self) -> Result<TitleRules> {
        let mut rules = ConfigManager::from_option(self.config.clone())
            .load_config()?
            .title;

        if let Some(min) = self.min_body_len {
            rules.min_body_len = min;
        }
        if self.allow_breaking {
            rules.allow_breaking_marker = true;
        }
        Ok(rules)
    }

    /// Returns the positional title, else the environment value, else "".
    pub fn resolve_title(&self) -> String {
        if let Some(title) = &self.title {
            return title.clone();
        }

        match get_env_var(&self.env_var) {
            Ok(title) => {
                tracing::debug!("Read title from {}", self.env_var);
                title
            }
            Err(err) => {
                tracing::debug!("No title in {}: {err}", self.env_var);
                String::new()
            }
        }
    }
}

fn success_line(check: &TitleCheck) -> String {
    match &check.scope {
        Some(scope) => format!("✓ Title matches prefix '{}' (scope '{scope}')", check.prefix),
        None => format!("✓ Title matches prefix '{}'", check.prefix),
    }
}
