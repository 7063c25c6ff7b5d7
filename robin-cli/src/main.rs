//! robin CLI tool

#![forbid(unsafe_code)]
#![deny(clippy::all, clippy::pedantic, clippy::nursery)]
#![warn(clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use console::style;
use robin_cli_lib::{observability, CreateCommand, RobinConfig, ScaffoldError};

#[derive(Parser)]
#[command(name = "robin")]
#[command(version)]
#[command(about = "CLI tool for robin apps", long_about = None)]
struct Cli {
    /// Show debug logs on stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a new robin app
    Create {
        /// Path to your app
        path: PathBuf,
        /// Template directory to use instead of the bundled template
        #[arg(long, value_name = "DIR")]
        template: Option<PathBuf>,
        /// App identifier (defaults to the directory name in kebab-case)
        #[arg(long)]
        id: Option<String>,
        /// App display name (defaults to the directory name in title case)
        #[arg(long)]
        name: Option<String>,
        /// Do not install dependencies after generating the app
        #[arg(long)]
        skip_install: bool,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            match err.downcast_ref::<ScaffoldError>() {
                Some(scaffold_err) => eprintln!(
                    "{} {err:#} (while {})",
                    style("error:").red().bold(),
                    scaffold_err.stage()
                ),
                None => eprintln!("{} {err:#}", style("error:").red().bold()),
            }
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    observability::init(cli.verbose).context("failed to initialize logging")?;
    let config = RobinConfig::load().context("failed to load configuration")?;

    match cli.command {
        Commands::Create {
            path,
            template,
            id,
            name,
            skip_install,
        } => {
            CreateCommand::new(path, &config)
                .template_dir(template)
                .id(id)
                .name(name)
                .skip_install(skip_install)
                .execute()?;
        }
    }

    Ok(())
}
