//! CLI for VSPTE.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use vspte_core::{config, logging};

use commands::{run_config_path, run_extract, run_policy};

/// Top-level CLI for VSPTE.
#[derive(Debug, Parser)]
#[command(name = "vspte")]
#[command(about = "VSPTE: read project type GUIDs and configurations through an automated IDE host", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Load a project in the automation host and print its type GUID and configurations.
    Extract {
        /// Path to the project file (.csproj, .vcxproj, ...).
        path: PathBuf,

        /// Host major version to automate (overrides config and environment).
        #[arg(long, value_name = "N")]
        vs_version: Option<u32>,

        /// Drive a scripted host described by this TOML file instead of a live IDE.
        #[arg(long, value_name = "FILE")]
        script: Option<PathBuf>,

        /// Print the result as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Show the effective project load retry policy and its delay schedule.
    Policy,

    /// Print the location of the configuration file.
    ConfigPath,
}

impl CliCommand {
    pub fn run_from_args() -> Result<()> {
        let cli = Cli::parse();
        let mut cfg = config::load_or_init()?;
        if logging::init_logging(&cfg.logging).is_err() {
            logging::init_logging_stderr(&cfg.logging);
        }
        tracing::debug!("loaded config: {:?}", cfg);

        match cli.command {
            CliCommand::Extract {
                path,
                vs_version,
                script,
                json,
            } => {
                if let Some(v) = vs_version {
                    cfg.host.major_version = v;
                }
                run_extract(&cfg, &path, script.as_deref(), json)?;
            }
            CliCommand::Policy => run_policy(&cfg)?,
            CliCommand::ConfigPath => run_config_path()?,
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests;
