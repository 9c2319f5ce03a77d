//! markmod CLI - turn markdown documents into JavaScript modules.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use markmod_transform::Mode;
use tracing_subscriber::{fmt, EnvFilter};

mod commands;

#[derive(Parser)]
#[command(name = "markmod")]
#[command(about = "Turn markdown documents into JavaScript modules")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to markmod.toml config file
    #[arg(short, long, default_value = "markmod.toml")]
    config: PathBuf,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a default markmod.toml
    Init {
        /// Overwrite existing files
        #[arg(short, long)]
        yes: bool,
    },

    /// Build every markdown file in the docs directory
    Build {
        /// Output directory (defaults to config or "dist")
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Exports to add: toc, html, react, vue (defaults to config)
        #[arg(short, long, value_delimiter = ',')]
        mode: Vec<Mode>,
    },

    /// Print the module for one markdown file
    Transform {
        /// Markdown file to transform
        file: PathBuf,

        /// Exports to add: toc, html, react, vue (defaults to config)
        #[arg(short, long, value_delimiter = ',')]
        mode: Vec<Mode>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so `transform` output can be piped
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Init { yes } => {
            commands::init::run(&cli.config, yes)?;
        }
        Commands::Build { output, mode } => {
            commands::build::run(&cli.config, output, mode)?;
        }
        Commands::Transform { file, mode } => {
            commands::transform::run(&cli.config, &file, mode)?;
        }
    }

    Ok(())
}
