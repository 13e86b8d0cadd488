//! Targets command — extracts resource targets changed by a pull request.

use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};

use crate::config::ConfigManager;
use crate::github::client::DEFAULT_API_URL;
use crate::github::GitHubClient;
use crate::targets::{
    extract_targets, join_targets, parse_path_list, write_targets, ExtractionRule, TargetRules,
    DEFAULT_OUTPUT_FILE,
};
use crate::utils::get_env_vars;

/// Index used by `--rule positional` when `--index` is not given.
const DEFAULT_POSITIONAL_INDEX: usize = 2;

/// Identifier selection rule on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum RuleArg {
    /// Component right after the last marker.
    AfterMarker,
    /// Component at a fixed index (see --index).
    Positional,
}

/// Targets command options.
#[derive(Parser)]
pub struct TargetsCommand {
    /// Owner of the GitHub repository.
    #[arg(long, required_unless_present = "files_from")]
    pub repo_owner: Option<String>,

    /// Name of the GitHub repository.
    #[arg(long, required_unless_present = "files_from")]
    pub repo_name: Option<String>,

    /// Pull request number to inspect.
    #[arg(long, required_unless_present = "files_from")]
    pub pr_number: Option<u64>,

    /// GitHub access token (defaults to GITHUB_TOKEN or GH_TOKEN).
    #[arg(long)]
    pub github_token: Option<String>,

    /// GitHub API root, for GitHub Enterprise.
    #[arg(long, default_value = DEFAULT_API_URL)]
    pub api_url: String,

    /// Reads changed paths from a file (one per line, `-` for stdin)
    /// instead of the GitHub API.
    #[arg(long, value_name = "FILE")]
    pub files_from: Option<PathBuf>,

    /// Marker segments a path must contain (e.g. internal,services).
    #[arg(long, value_delimiter = ',')]
    pub markers: Option<Vec<String>>,

    /// Prefix added to every target (e.g. jamfpro_).
    #[arg(long)]
    pub namespace: Option<String>,

    /// Identifier selection rule.
    #[arg(long, value_enum)]
    pub rule: Option<RuleArg>,

    /// Component index for the positional rule.
    #[arg(long)]
    pub index: Option<usize>,

    /// File receiving the comma-separated targets.
    #[arg(long, short, default_value = DEFAULT_OUTPUT_FILE)]
    pub output: PathBuf,

    /// Path to the gate config file (defaults to .ci-gate/config.yaml).
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl TargetsCommand {
    /// Executes the targets command.
    pub async fn execute(self) -> Result<()> {
        let rules = self.rules()?;
        let paths = self.collect_paths().await?;
        tracing::debug!("Changed paths: {paths:?}");

        let targets = extract_targets(&paths, &rules)?;
        write_targets(&targets, &self.output)?;

        tracing::info!("Wrote targets to {}", self.output.display());
        println!("{}", join_targets(&targets));
        Ok(())
    }

    /// Merges CLI overrides onto the configured rules.
    pub fn rules(&self) -> Result<TargetRules> {
        let mut rules = ConfigManager::from_option(self.config.clone())
            .load_config()?
            .targets;

        if let Some(markers) = &self.markers {
            rules.markers = markers.clone();
        }
        if let Some(namespace) = &self.namespace {
            rules.namespace = Some(namespace.clone());
        }
        match (self.rule, self.index) {
            (Some(RuleArg::AfterMarker), _) => rules.rule = ExtractionRule::AfterMarker,
            (Some(RuleArg::Positional), index) => {
                rules.rule = ExtractionRule::Positional {
                    index: index.unwrap_or(DEFAULT_POSITIONAL_INDEX),
                }
            }
            (None, Some(index)) => rules.rule = ExtractionRule::Positional { index },
            (None, None) => {}
        }

        if rules.markers.is_empty() {
            anyhow::bail!("At least one marker segment is required");
        }
        Ok(rules)
    }

    async fn collect_paths(&self) -> Result<Vec<String>> {
        if let Some(source) = &self.files_from {
            return read_path_source(source, std::io::stdin().lock());
        }

        let owner = self
            .repo_owner
            .as_deref()
            .context("--repo-owner is required")?;
        let repo = self
            .repo_name
            .as_deref()
            .context("--repo-name is required")?;
        let number = self.pr_number.context("--pr-number is required")?;

        let token = match &self.github_token {
            Some(token) if !token.is_empty() => token.clone(),
            _ => get_env_vars(&["GITHUB_TOKEN", "GH_TOKEN"])
                .context("GitHub token missing. Pass --github-token or set GITHUB_TOKEN")?,
        };

        let client = GitHubClient::with_base_url(&self.api_url, token)?;
        let files = client.list_pull_request_files(owner, repo, number).await?;

        Ok(files
            .into_iter()
            .map(|file| {
                if let Some(status) = &file.status {
                    tracing::debug!("{} ({status})", file.filename);
                }
                file.filename
            })
            .collect())
    }
}

/// Reads changed paths from `source`, or from `stdin` when it is `-`.
fn read_path_source<R: Read>(source: &Path, mut stdin: R) -> Result<Vec<String>> {
    let content = if source.as_os_str() == "-" {
        let mut buf = String::new();
        stdin
            .read_to_string(&mut buf)
            .context("Failed to read paths from stdin")?;
        buf
    } else {
        fs::read_to_string(source)
            .with_context(|| format!("Failed to read paths file: {}", source.display()))?
    };
    Ok(parse_path_list(&content))
}
