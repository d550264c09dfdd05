//! Command-line interface for repo-diagram
//!
//! Provides `tree`, `snapshot`, `prompt`, `diagram` and `completions`
//! subcommands.

use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;
use tracing::Level;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod diagram;
mod snapshot;
mod tree;
mod utils;

/// Snapshot a repository and synthesize a validated architecture diagram
#[derive(Parser)]
#[command(name = "repo-diagram")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging (sets log level to DEBUG)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Config file (default: discover repo-diagram.toml / .yml in the current directory)
    #[arg(short, long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the ignore-filtered file tree of a snapshot
    Tree(tree::TreeArgs),

    /// Print or write the concatenated snapshot corpus
    Snapshot(snapshot::SnapshotArgs),

    /// Print the initial diagram prompt for a snapshot
    Prompt(snapshot::PromptArgs),

    /// Generate a validated architecture diagram report
    Diagram(Box<diagram::DiagramArgs>),

    /// Generate shell completions
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();

    // Wire verbose flag to the tracing log level.
    // RUST_LOG in the environment always takes precedence; --verbose falls back to DEBUG.
    let filter = if cli.verbose {
        EnvFilter::from_default_env().add_directive(Level::DEBUG.into())
    } else {
        EnvFilter::from_default_env().add_directive(Level::WARN.into())
    };
    let _ = tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .try_init();

    let config = cli.config.as_deref();
    match cli.command {
        Commands::Tree(args) => tree::run(args, config),
        Commands::Snapshot(args) => snapshot::run(args, config),
        Commands::Prompt(args) => snapshot::run_prompt(args, config),
        Commands::Diagram(args) => diagram::run(*args, config),
        Commands::Completions { shell } => {
            let mut command = Cli::command();
            let name = command.get_name().to_string();
            clap_complete::generate(shell, &mut command, name, &mut std::io::stdout());
            Ok(())
        }
    }
}
