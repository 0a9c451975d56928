//! CLI for the kino project scaffolder.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use kino_core::config;
use std::path::PathBuf;

use commands::{run_check, run_script};

/// Top-level CLI for kino.
#[derive(Debug, Parser)]
#[command(name = "kino", version)]
#[command(about = "kino: generate projects from Rhai template scripts", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Run a template script against a target directory.
    Run {
        /// Target directory; created if absent.
        #[arg(short, long, default_value = ".", value_name = "DIR")]
        target: PathBuf,

        /// Allow replacing files that already exist in the target.
        #[arg(long)]
        overwrite: bool,

        /// Script path, file:// URL or http(s):// URL.
        source: String,

        /// Arguments handed verbatim to the script (see `-H` for its options).
        #[arg(trailing_var_arg = true, allow_hyphen_values = true, value_name = "SCRIPT_ARGS")]
        script_args: Vec<String>,
    },

    /// Load and compile a script and verify it defines `main(k)`. Touches no target.
    Check {
        /// Script path, file:// URL or http(s):// URL.
        source: String,
    },
}

impl CliCommand {
    pub fn run_from_args() -> Result<()> {
        let cli = Cli::parse();
        let cfg = config::load()?;
        tracing::debug!("loaded config: {:?}", cfg);

        match cli.command {
            CliCommand::Run {
                target,
                overwrite,
                source,
                script_args,
            } => run_script(&cfg, source, target, overwrite, script_args)?,
            CliCommand::Check { source } => run_check(&cfg, &source)?,
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests;
