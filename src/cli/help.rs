//! `help-all`: every command's help on one page.

use anyhow::Result;
use clap::{Command, CommandFactory, Parser};

use crate::cli::Cli;

/// Prints the help of every command, recursively.
#[derive(Parser)]
pub struct HelpCommand {}

/// Renders help for the whole command tree.
pub struct HelpGenerator {
    app: Command,
}

impl Default for HelpGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl HelpGenerator {
    /// Builds a generator for the `ci-gate` command tree.
    pub fn new() -> Self {
        Self {
            app: Cli::command(),
        }
    }

    /// Renders all sections, separated by a line of `=`.
    pub fn generate_all_help(&self) -> Result<String> {
        let mut sections = vec![self.render_command_help(&self.app, "")];
        self.collect_sections(&self.app, "", &mut sections);
        Ok(sections.join(&format!("\n\n{}\n\n", "=".repeat(80))))
    }

    /// Subcommands are visited in name order so the output is stable.
    fn collect_sections(&self, cmd: &Command, prefix: &str, sections: &mut Vec<String>) {
        let mut subcommands: Vec<&Command> = cmd
            .get_subcommands()
            .filter(|sub| sub.get_name() != "help")
            .collect();
        subcommands.sort_by(|a, b| a.get_name().cmp(b.get_name()));

        for sub in subcommands {
            let path = match prefix {
                "" => sub.get_name().to_string(),
                _ => format!("{prefix} {}", sub.get_name()),
            };
            sections.push(self.render_command_help(sub, &path));
            self.collect_sections(sub, &path, sections);
        }
    }

    fn render_command_help(&self, cmd: &Command, path: &str) -> String {
        let title = match path {
            "" => cmd.get_name().to_string(),
            _ => format!("ci-gate {path}"),
        };
        let about = cmd
            .get_about()
            .map_or_else(|| "No description available".to_string(), ToString::to_string);

        format!("{title} - {about}\n\n{}", cmd.clone().render_help())
    }
}

impl HelpCommand {
    /// Executes the help command.
    pub fn execute(self) -> Result<()> {
        println!("{}", HelpGenerator::new().generate_all_help()?);
        Ok(())
    }
}
