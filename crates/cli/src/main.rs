//! Stitch CLI
//!
//! Main entry point for the stitch command-line tool.
//! Lists, expands and cross-references prompts stored as markdown files.

mod commands;

use anyhow::Context;
use clap::{Parser, Subcommand};
use commands::{ExpandCommand, ListCommand, RefsCommand};
use stitch_core::{config::AppConfig, logging};
use std::path::PathBuf;

/// Stitch - compose reusable prompts from `[[inclusion]]` markers
#[derive(Parser, Debug)]
#[command(name = "stitch")]
#[command(about = "Compose reusable prompts from [[inclusion]] markers", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to workspace directory (default: current directory)
    #[arg(short, long, global = true, env = "STITCH_WORKSPACE")]
    workspace: Option<PathBuf>,

    /// Path to config file
    #[arg(short, long, global = true, env = "STITCH_CONFIG")]
    config: Option<PathBuf>,

    /// Prompt directory (repeatable, replaces configured directories)
    #[arg(short, long = "dir", global = true)]
    dirs: Vec<PathBuf>,

    /// Maximum inclusion depth (0 disables the cap)
    #[arg(long, global = true)]
    max_depth: Option<usize>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true, env = "RUST_LOG")]
    log_level: Option<String>,

    /// Enable verbose output (sets log level to debug)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Disable colored output
    #[arg(long, global = true, env = "NO_COLOR")]
    no_color: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List prompts with their display names
    List(ListCommand),

    /// Expand a prompt's inclusions and print the result
    Expand(ExpandCommand),

    /// Show which prompts include a given prompt
    Refs(RefsCommand),
}

fn main() -> anyhow::Result<()> {
    // Parse command-line arguments first (needed for logging config)
    let cli = Cli::parse();

    let config = AppConfig::load_from(cli.workspace.clone(), cli.config.clone())
        .context("Failed to load configuration")?
        .with_overrides(
            cli.dirs,
            cli.max_depth,
            cli.log_level,
            cli.verbose,
            cli.no_color,
        );

    logging::init_logging(config.log_level.as_deref(), config.no_color)?;

    tracing::debug!("Workspace: {:?}", config.workspace);
    tracing::debug!("Prompt directories: {:?}", config.prompt_directories());

    config.validate().context("Invalid configuration")?;

    let command_name = match &cli.command {
        Commands::List(_) => "list",
        Commands::Expand(_) => "expand",
        Commands::Refs(_) => "refs",
    };
    let _span = tracing::info_span!("command", name = command_name).entered();

    let result = match cli.command {
        Commands::List(cmd) => cmd.execute(&config),
        Commands::Expand(cmd) => cmd.execute(&config),
        Commands::Refs(cmd) => cmd.execute(&config),
    };

    match &result {
        Ok(_) => tracing::debug!("Command completed successfully"),
        Err(e) => tracing::error!("Command failed: {}", e),
    }

    result.with_context(|| format!("stitch {} failed", command_name))
}
