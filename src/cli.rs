//! CLI argument parsing and command dispatch

use anyhow::Result;
use clap::{Parser, Subcommand};
use env_logger::{Env, WriteStyle};

use crate::commands;
use fetch_deps::output::OutputConfig;

/// fetch-deps - Resolve and fetch feature-gated git dependencies
#[derive(Parser, Debug)]
#[command(name = "fetch-deps")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,

    /// Colorize output (always, never, auto)
    #[arg(long, global = true, value_name = "WHEN", default_value = "auto")]
    color: String,

    /// Set log level (error, warn, info, debug, trace)
    #[arg(long, global = true, value_name = "LEVEL", default_value = "info")]
    log_level: String,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Resolve the dependency graph and fetch every enabled dependency
    Fetch(commands::fetch::FetchArgs),

    /// Fetch dependencies and display who requested each of them
    Tree(commands::tree::TreeArgs),

    /// Check the root manifest without fetching anything
    Validate(commands::validate::ValidateArgs),

    /// Generate shell completion scripts
    Completions(commands::completions::CompletionsArgs),
}

impl Cli {
    /// Execute the CLI command
    pub fn execute(self) -> Result<()> {
        init_logging(&self.log_level, &self.color);

        match self.command {
            Commands::Fetch(args) => commands::fetch::execute(args, &self.color),
            Commands::Tree(args) => commands::tree::execute(args),
            Commands::Validate(args) => commands::validate::execute(args, &self.color),
            Commands::Completions(args) => commands::completions::execute(args),
        }
    }
}

/// Sets up `env_logger` for the process. `RUST_LOG` takes precedence over
/// `--log-level`.
fn init_logging(level: &str, color_flag: &str) {
    let write_style = if OutputConfig::from_env_and_flag(color_flag).use_color {
        WriteStyle::Auto
    } else {
        WriteStyle::Never
    };

    let _ = env_logger::Builder::from_env(Env::default().default_filter_or(level))
        .format_timestamp(None)
        .format_target(false)
        .write_style(write_style)
        .try_init();
}
